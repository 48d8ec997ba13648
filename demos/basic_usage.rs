//! Basic usage: health check, requirement extraction, candidate evaluation
//!
//! Expects a running service (default `http://localhost:80`, override with
//! `LANGROID_BASE_URL`) and two documents under `tests/data/`.
//!
//! The credential is read from `OPENAI_API_KEY` when set.
//!
//! Usage:
//!   RUST_LOG=langroid_client=debug cargo run --example basic_usage

use langroid_client::protocol::{CallOptions, ExtractParams, Params};
use langroid_client::LangroidClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = LangroidClient::from_env()?;
    println!("Using service at {}", client.base_url());

    println!("Calling /test endpoint...");
    let x = 5;
    println!("Result from /test: {}", client.ping(x).await?);

    let reqs_path = "tests/data/rfp.pdf";
    let candidate_path = "tests/data/candidate.pdf";
    let options = CallOptions::new().params(Params::try_from(&ExtractParams::num(3))?);

    println!("Calling /intellilang/extract endpoint...");
    let reqs = client
        .intellilang_extract_reqs(reqs_path, candidate_path, &options)
        .await?
        .into_result()?;

    let out = "/tmp/out.jsonl";
    reqs.write_to(out)?;
    for record in reqs.records() {
        println!("{}", serde_json::Value::Object(record?));
    }

    // the same candidate twice, just to exercise the repeated field
    println!("Calling /intellilang/eval endpoint...");
    let records = client
        .intellilang_eval(out, [candidate_path; 2], &CallOptions::new())
        .await?
        .into_result()?;

    println!("Scores:");
    for score in &records.scores {
        println!("{}", serde_json::to_string(score)?);
    }
    println!("Evaluations:");
    for eval in &records.evals {
        println!("{}", serde_json::to_string(eval)?);
    }

    Ok(())
}
