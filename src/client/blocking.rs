//! Blocking client: every call holds the calling thread until the whole reply is read.
//!
//! Same operations and outcomes as the async [`crate::LangroidClient`]. Do not use
//! it from inside a tokio runtime worker.

use crate::client::builder::LangroidClientBuilder;
use crate::client::config::ClientConfig;
use crate::client::wire;
use crate::pipeline::{create_decoder, decode_reader};
use crate::protocol::{CallOptions, DocumentSource, Endpoint, LoadedDocument};
use crate::transport::blocking::read_body;
use crate::transport::BlockingTransport;
use crate::types::{EvaluationRecords, ExtractedRequirements, ServiceFailure, ServiceReply};
use crate::Result;
use std::io::BufReader;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LangroidClient {
    transport: Arc<BlockingTransport>,
    config: Arc<ClientConfig>,
}

impl LangroidClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        LangroidClientBuilder::new().base_url(base_url).build_blocking()
    }

    pub fn from_env() -> Result<Self> {
        LangroidClientBuilder::new().build_blocking()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = BlockingTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        })
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn credential<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.config.api_key.as_deref())
    }

    pub fn ping(&self, x: i64) -> Result<i64> {
        let response = self
            .transport
            .post_json(Endpoint::Test, &serde_json::json!(x))?;
        let status = response.status().as_u16();
        let body = read_body(response)?;
        wire::parse_ping(status, &body)
    }

    pub fn agent_query(&self, text: &str, credential: Option<&str>) -> Result<String> {
        let form = wire::query_form(text, self.credential(credential));
        let response = self.transport.post_form(Endpoint::AgentQuery, form)?;
        let status = response.status().as_u16();
        let body = read_body(response)?;
        wire::text_answer(status, &body)
    }

    pub fn ask_doc(
        &self,
        document: impl Into<DocumentSource>,
        query: &str,
        credential: Option<&str>,
    ) -> Result<String> {
        let document = document.into().load()?;
        let form = wire::ask_doc_form(document, query, self.credential(credential));
        let response = self.transport.post_form(Endpoint::AskDoc, form)?;
        let status = response.status().as_u16();
        let body = read_body(response)?;
        wire::text_answer(status, &body)
    }

    pub fn extract_reqs(
        &self,
        reqs: impl Into<DocumentSource>,
        candidate: impl Into<DocumentSource>,
        options: &CallOptions,
    ) -> Result<ExtractedRequirements> {
        wire::legacy_payload(self.extract_at(
            Endpoint::Extract,
            reqs.into(),
            candidate.into(),
            options,
        )?)
    }

    pub fn intellilang_extract_reqs(
        &self,
        reqs: impl Into<DocumentSource>,
        candidate: impl Into<DocumentSource>,
        options: &CallOptions,
    ) -> Result<ServiceReply<ExtractedRequirements>> {
        self.extract_at(
            Endpoint::IntellilangExtract,
            reqs.into(),
            candidate.into(),
            options,
        )
    }

    fn extract_at(
        &self,
        endpoint: Endpoint,
        reqs: DocumentSource,
        candidate: DocumentSource,
        options: &CallOptions,
    ) -> Result<ServiceReply<ExtractedRequirements>> {
        let form = wire::extraction_form(
            reqs.load()?,
            candidate.load()?,
            options,
            self.config.api_key.as_deref(),
        );
        let response = self.transport.post_form(endpoint, form)?;
        let status = response.status().as_u16();
        let body = read_body(response)?;

        if !wire::is_success(status) {
            let failure = ServiceFailure::from_response(status, &body);
            warn!(endpoint = endpoint.path(), status, detail = %failure.detail, "extraction rejected");
            return Ok(ServiceReply::Failure(failure));
        }
        let reqs = ExtractedRequirements::new(body);
        info!(endpoint = endpoint.path(), status, requirements = reqs.len(), "extraction complete");
        Ok(ServiceReply::Success(reqs))
    }

    pub fn eval_from_reqs<I, D>(
        &self,
        reqs: impl Into<DocumentSource>,
        candidates: I,
        options: &CallOptions,
    ) -> Result<EvaluationRecords>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        wire::legacy_payload(self.eval_at(Endpoint::Eval, reqs.into(), candidates, options)?)
    }

    pub fn intellilang_eval<I, D>(
        &self,
        reqs: impl Into<DocumentSource>,
        candidates: I,
        options: &CallOptions,
    ) -> Result<ServiceReply<EvaluationRecords>>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        self.eval_at(Endpoint::IntellilangEval, reqs.into(), candidates, options)
    }

    fn eval_at<I, D>(
        &self,
        endpoint: Endpoint,
        reqs: DocumentSource,
        candidates: I,
        options: &CallOptions,
    ) -> Result<ServiceReply<EvaluationRecords>>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        let candidates = wire::candidate_sources(candidates)?
            .iter()
            .map(DocumentSource::load)
            .collect::<Result<Vec<LoadedDocument>>>()?;
        let form = wire::evaluation_form(
            reqs.load()?,
            candidates,
            options,
            self.config.api_key.as_deref(),
        );
        let response = self.transport.post_form(endpoint, form)?;
        let status = response.status().as_u16();

        if !wire::is_success(status) {
            let body = read_body(response)?;
            let failure = ServiceFailure::from_response(status, &body);
            warn!(endpoint = endpoint.path(), status, detail = %failure.detail, "evaluation rejected");
            return Ok(ServiceReply::Failure(failure));
        }

        let decoder = create_decoder(endpoint.revision(), self.config.routing_key);
        let records = EvaluationRecords::try_collect(decode_reader(BufReader::new(response), decoder))?;
        info!(
            endpoint = endpoint.path(),
            scores = records.scores.len(),
            evals = records.evals.len(),
            "evaluation complete"
        );
        Ok(ServiceReply::Success(records))
    }
}
