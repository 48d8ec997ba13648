//! Langroid CLI: 文档分析服务的命令行工具
//!
//! Usage:
//!   langroid-cli ping <x>                                  Health check (prints x squared)
//!   langroid-cli query <text>                              Ask the agent a question
//!   langroid-cli askdoc <doc> <query>                      Ask a question about one document
//!   langroid-cli extract <reqs> <candidate> [--out <path>] Extract requirements as JSONL
//!   langroid-cli eval <reqs.jsonl> <candidate>...          Score candidates against requirements

use anyhow::{anyhow, bail, Context};
use futures::StreamExt;
use langroid_client::protocol::{CallOptions, Params};
use langroid_client::{EvalRecord, LangroidClient, ServiceReply};
use std::io::Write;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        std::process::exit(1);
    };

    let result = match command.as_str() {
        "version" | "--version" | "-V" => {
            println!("langroid-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => run(other, Opts::parse(&args[1..])).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"langroid-cli: Langroid 文档分析服务命令行工具

USAGE:
    langroid-cli <COMMAND> [OPTIONS]

COMMANDS:
    ping <x>                              Health check; prints x squared
    query <text>                          Free-form question to the agent
    askdoc <doc> <query>                  Question answered from one document
    extract <reqs> <candidate>            Extract requirements (JSONL to stdout or --out)
    eval <reqs.jsonl> <candidate>...      Evaluate candidates (JSONL records to stdout)
    version                               Show version information
    help                                  Show this help message

OPTIONS:
    --base-url <url>       Service root (default: $LANGROID_BASE_URL or http://localhost:80)
    --params <json>        Opaque parameter blob (default: {{}})
    --doc-type <tag>       Document type tag, e.g. rfp or resume
    --use-retrieval        Ask the service for its retrieval strategy
    --legacy               Use the legacy /extract and /eval endpoints
    --stream               (eval) print records as they arrive; not with --legacy
    --out <path>           (extract) write the JSONL to a file

ENVIRONMENT:
    LANGROID_BASE_URL            Service root
    LANGROID_HTTP_TIMEOUT_SECS   Whole-request timeout (default 300)
    LANGROID_PROXY_URL           Proxy for all requests
    OPENAI_API_KEY               Default credential forwarded to the service
    RUST_LOG                     Log filter, e.g. langroid_client=debug"#
    );
}

#[derive(Debug, Default)]
struct Opts {
    positional: Vec<String>,
    base_url: Option<String>,
    params: Option<String>,
    doc_type: Option<String>,
    out: Option<String>,
    use_retrieval: bool,
    legacy: bool,
    stream: bool,
}

impl Opts {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let mut opts = Opts::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{flag} requires a value"))
            };
            match arg.as_str() {
                "--base-url" => opts.base_url = Some(value("--base-url")?),
                "--params" => opts.params = Some(value("--params")?),
                "--doc-type" => opts.doc_type = Some(value("--doc-type")?),
                "--out" => opts.out = Some(value("--out")?),
                "--use-retrieval" => opts.use_retrieval = true,
                "--legacy" => opts.legacy = true,
                "--stream" => opts.stream = true,
                flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
                _ => opts.positional.push(arg.clone()),
            }
        }
        if opts.legacy && opts.stream {
            bail!("--stream reads the current /intellilang/eval endpoint only; drop --legacy");
        }
        Ok(opts)
    }

    fn call_options(&self) -> anyhow::Result<CallOptions> {
        let mut options = CallOptions::new();
        if let Some(raw) = &self.params {
            serde_json::from_str::<serde_json::Value>(raw).context("--params is not valid JSON")?;
            options = options.params(Params::raw(raw.clone()));
        }
        if let Some(doc_type) = &self.doc_type {
            options = options.doc_type(doc_type.clone());
        }
        if self.use_retrieval {
            options = options.use_retrieval(true);
        }
        Ok(options)
    }

    fn arg(&self, idx: usize, name: &str) -> anyhow::Result<&str> {
        self.positional
            .get(idx)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing <{name}>"))
    }
}

async fn run(command: &str, opts: anyhow::Result<Opts>) -> anyhow::Result<()> {
    let opts = opts?;
    let mut builder = LangroidClient::builder();
    if let Some(url) = &opts.base_url {
        builder = builder.base_url(url.clone());
    }
    let client = builder.build()?;

    match command {
        "ping" => {
            let x: i64 = opts.arg(0, "x")?.parse().context("<x> must be an integer")?;
            println!("{}", client.ping(x).await?);
        }
        "query" => {
            println!("{}", client.agent_query(opts.arg(0, "text")?, None).await?);
        }
        "askdoc" => {
            let answer = client
                .ask_doc(opts.arg(0, "doc")?, opts.arg(1, "query")?, None)
                .await?;
            println!("{answer}");
        }
        "extract" => cmd_extract(&client, &opts).await?,
        "eval" => cmd_eval(&client, &opts).await?,
        other => {
            print_usage();
            bail!("unknown command: {other}");
        }
    }
    Ok(())
}

async fn cmd_extract(client: &LangroidClient, opts: &Opts) -> anyhow::Result<()> {
    let (reqs, candidate) = (opts.arg(0, "reqs")?, opts.arg(1, "candidate")?);
    let options = opts.call_options()?;
    let extracted = if opts.legacy {
        client.extract_reqs(reqs, candidate, &options).await?
    } else {
        client
            .intellilang_extract_reqs(reqs, candidate, &options)
            .await?
            .into_result()?
    };

    match &opts.out {
        Some(path) => {
            extracted.write_to(path)?;
            eprintln!("{} requirement(s) written to {path}", extracted.len());
        }
        None => std::io::stdout().write_all(extracted.as_bytes())?,
    }
    Ok(())
}

async fn cmd_eval(client: &LangroidClient, opts: &Opts) -> anyhow::Result<()> {
    let reqs = opts.arg(0, "reqs.jsonl")?;
    let candidates: Vec<&str> = opts.positional.iter().skip(1).map(String::as_str).collect();
    let options = opts.call_options()?;

    if opts.stream {
        let mut stream = match client
            .intellilang_eval_stream(reqs, candidates, &options)
            .await?
        {
            ServiceReply::Success(stream) => stream,
            ServiceReply::Failure(failure) => bail!("service rejected the call: {failure}"),
        };
        while let Some(record) = stream.next().await {
            print_record(&record?)?;
        }
        return Ok(());
    }

    let records = if opts.legacy {
        client.eval_from_reqs(reqs, candidates, &options).await?
    } else {
        client
            .intellilang_eval(reqs, candidates, &options)
            .await?
            .into_result()?
    };
    for record in records.scores.iter().chain(&records.evals) {
        println!("{}", serde_json::to_string(record)?);
    }
    eprintln!(
        "{} score(s), {} evaluation(s)",
        records.scores.len(),
        records.evals.len()
    );
    Ok(())
}

fn print_record(record: &EvalRecord) -> anyhow::Result<()> {
    println!(
        "{} {}",
        record.kind().tag(),
        serde_json::to_string(record.record())?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_positionals() {
        let opts = Opts::parse(&args(&["reqs.jsonl", "a.pdf", "--stream", "--params", "{}"])).unwrap();
        assert_eq!(opts.positional, ["reqs.jsonl", "a.pdf"]);
        assert!(opts.stream && !opts.legacy);
        assert_eq!(opts.params.as_deref(), Some("{}"));
    }

    #[test]
    fn legacy_stream_is_rejected() {
        let err = Opts::parse(&args(&["reqs.jsonl", "a.pdf", "--legacy", "--stream"])).unwrap_err();
        assert!(err.to_string().contains("--legacy"));
    }

    #[test]
    fn flag_without_value_is_rejected() {
        assert!(Opts::parse(&args(&["--out"])).is_err());
    }
}
