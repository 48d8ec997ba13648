use crate::client::builder::LangroidClientBuilder;
use crate::client::config::ClientConfig;
use crate::client::wire;
use crate::pipeline::{create_decoder, decode_stream};
use crate::protocol::{CallOptions, DocumentSource, Endpoint, ProtocolRevision};
use crate::transport::http::{body_stream, read_body};
use crate::transport::HttpTransport;
use crate::types::{EvalRecord, EvaluationRecords, ExtractedRequirements, ServiceFailure, ServiceReply};
use crate::{BoxStream, Result};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Async client for the document-analysis service.
///
/// Cheap to clone; clones share the connection pool. Every method issues exactly
/// one POST and reports its outcome as-is (no retries, no caching).
#[derive(Debug, Clone)]
pub struct LangroidClient {
    transport: Arc<HttpTransport>,
    config: Arc<ClientConfig>,
}

impl LangroidClient {
    /// Client for `base_url` with every other setting from the environment or defaults.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        LangroidClientBuilder::new().base_url(base_url).build()
    }

    pub fn from_env() -> Result<Self> {
        LangroidClientBuilder::new().build()
    }

    pub fn builder() -> LangroidClientBuilder {
        LangroidClientBuilder::new()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
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

    /// Health check: the service squares `x`.
    pub async fn ping(&self, x: i64) -> Result<i64> {
        let response = self
            .transport
            .post_json(Endpoint::Test, &serde_json::json!(x))
            .await?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;
        wire::parse_ping(status, &body)
    }

    /// Free-form question to the service's agent.
    pub async fn agent_query(&self, text: &str, credential: Option<&str>) -> Result<String> {
        let form = wire::query_form(text, self.credential(credential));
        let response = self.transport.post_form(Endpoint::AgentQuery, form).await?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;
        wire::text_answer(status, &body)
    }

    /// Question answered from a single uploaded document.
    pub async fn ask_doc(
        &self,
        document: impl Into<DocumentSource>,
        query: &str,
        credential: Option<&str>,
    ) -> Result<String> {
        let document = document.into().load_async().await?;
        let form = wire::ask_doc_form(document, query, self.credential(credential));
        let response = self.transport.post_form(Endpoint::AskDoc, form).await?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;
        wire::text_answer(status, &body)
    }

    /// Legacy extraction (`/extract`): the payload only, success implied by HTTP status.
    pub async fn extract_reqs(
        &self,
        reqs: impl Into<DocumentSource>,
        candidate: impl Into<DocumentSource>,
        options: &CallOptions,
    ) -> Result<ExtractedRequirements> {
        wire::legacy_payload(
            self.extract_at(Endpoint::Extract, reqs.into(), candidate.into(), options)
                .await?,
        )
    }

    /// Extract requirements from `reqs`, using `candidate` as context.
    ///
    /// On success the payload is the raw JSONL (one requirement object per line).
    pub async fn intellilang_extract_reqs(
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
        .await
    }

    async fn extract_at(
        &self,
        endpoint: Endpoint,
        reqs: DocumentSource,
        candidate: DocumentSource,
        options: &CallOptions,
    ) -> Result<ServiceReply<ExtractedRequirements>> {
        let (reqs, candidate) = tokio::try_join!(reqs.load_async(), candidate.load_async())?;
        let form = wire::extraction_form(reqs, candidate, options, self.config.api_key.as_deref());
        let response = self.transport.post_form(endpoint, form).await?;
        let status = response.status().as_u16();
        let body = read_body(response).await?;

        if !wire::is_success(status) {
            let failure = ServiceFailure::from_response(status, &body);
            warn!(endpoint = endpoint.path(), status, detail = %failure.detail, "extraction rejected");
            return Ok(ServiceReply::Failure(failure));
        }
        let reqs = ExtractedRequirements::new(body);
        info!(endpoint = endpoint.path(), status, requirements = reqs.len(), "extraction complete");
        Ok(ServiceReply::Success(reqs))
    }

    /// Legacy evaluation (`/eval`): space-tagged lines, success implied by HTTP status.
    pub async fn eval_from_reqs<I, D>(
        &self,
        reqs: impl Into<DocumentSource>,
        candidates: I,
        options: &CallOptions,
    ) -> Result<EvaluationRecords>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        let reply = self
            .eval_stream_at(Endpoint::Eval, reqs.into(), candidates, options)
            .await?;
        match reply {
            ServiceReply::Success(stream) => self.collect(Endpoint::Eval, stream).await,
            ServiceReply::Failure(failure) => Err(wire::legacy_rejection(failure)),
        }
    }

    /// Evaluate each candidate against a requirements JSONL source.
    ///
    /// For N candidates and K requirement lines a successful reply carries N score
    /// records and N×K evaluation records.
    pub async fn intellilang_eval<I, D>(
        &self,
        reqs: impl Into<DocumentSource>,
        candidates: I,
        options: &CallOptions,
    ) -> Result<ServiceReply<EvaluationRecords>>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        let reply = self
            .eval_stream_at(Endpoint::IntellilangEval, reqs.into(), candidates, options)
            .await?;
        Ok(match reply {
            ServiceReply::Success(stream) => {
                ServiceReply::Success(self.collect(Endpoint::IntellilangEval, stream).await?)
            }
            ServiceReply::Failure(failure) => ServiceReply::Failure(failure),
        })
    }

    /// Lazy form of [`LangroidClient::intellilang_eval`]: records are decoded as the
    /// reply body arrives. Single pass; re-issue the call to read it again.
    pub async fn intellilang_eval_stream<I, D>(
        &self,
        reqs: impl Into<DocumentSource>,
        candidates: I,
        options: &CallOptions,
    ) -> Result<ServiceReply<BoxStream<'static, EvalRecord>>>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        self.eval_stream_at(Endpoint::IntellilangEval, reqs.into(), candidates, options)
            .await
    }

    async fn eval_stream_at<I, D>(
        &self,
        endpoint: Endpoint,
        reqs: DocumentSource,
        candidates: I,
        options: &CallOptions,
    ) -> Result<ServiceReply<BoxStream<'static, EvalRecord>>>
    where
        I: IntoIterator<Item = D>,
        D: Into<DocumentSource>,
    {
        let candidates = wire::candidate_sources(candidates)?;
        let (reqs, candidates) = tokio::try_join!(
            reqs.load_async(),
            try_join_all(candidates.iter().map(DocumentSource::load_async))
        )?;
        let form = wire::evaluation_form(reqs, candidates, options, self.config.api_key.as_deref());
        let response = self.transport.post_form(endpoint, form).await?;
        let status = response.status().as_u16();

        if !wire::is_success(status) {
            let body = read_body(response).await?;
            let failure = ServiceFailure::from_response(status, &body);
            warn!(endpoint = endpoint.path(), status, detail = %failure.detail, "evaluation rejected");
            return Ok(ServiceReply::Failure(failure));
        }

        let decoder = create_decoder(endpoint.revision(), self.config.routing_key);
        Ok(ServiceReply::Success(decode_stream(body_stream(response), decoder)))
    }

    async fn collect(
        &self,
        endpoint: Endpoint,
        stream: BoxStream<'static, EvalRecord>,
    ) -> Result<EvaluationRecords> {
        let records = EvaluationRecords::try_collect_stream(stream).await?;
        info!(
            endpoint = endpoint.path(),
            legacy = endpoint.revision() == ProtocolRevision::Legacy,
            scores = records.scores.len(),
            evals = records.evals.len(),
            "evaluation complete"
        );
        Ok(records)
    }
}
