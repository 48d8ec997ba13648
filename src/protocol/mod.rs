//! 协议层：固定的端点路径、表单字段名、参数块以及多部分请求的组装。
//!
//! # Wire Protocol
//!
//! Everything the client sends is described here: which path each operation
//! posts to, which protocol revision that path speaks, the multipart field names,
//! the opaque parameter blob, and the per-call options.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`form`] | Document sources and the transport-neutral multipart payload |
//! | [`params`] | Opaque `params` blob and optional typed serializers |
//!
//! ## Example
//!
//! ```rust
//! use langroid_client::protocol::{CallOptions, Endpoint, Params, ProtocolRevision};
//!
//! assert_eq!(Endpoint::IntellilangEval.path(), "/intellilang/eval");
//! assert_eq!(Endpoint::Eval.revision(), ProtocolRevision::Legacy);
//!
//! let options = CallOptions::new()
//!     .params(Params::raw(r#"{"num": 3}"#))
//!     .doc_type("rfp")
//!     .use_retrieval(true);
//! assert_eq!(options.params.as_str(), r#"{"num": 3}"#);
//! ```

pub mod form;
pub mod params;

pub use form::{DocumentSource, FilePart, FormPayload, LoadedDocument};
pub use params::{EvalParams, ExtractParams, Params};

/// Multipart field names (fixed contract with the service).
pub mod fields {
    /// Requirements document (extraction) or requirements JSONL (evaluation).
    pub const REQS: &str = "reqs";
    /// Candidate document of an extraction call.
    pub const CANDIDATE: &str = "candidate";
    /// Candidate documents of an evaluation call; repeated once per candidate.
    pub const CANDIDATES: &str = "candidates";
    pub const PARAMS: &str = "params";
    pub const DOC_TYPE: &str = "doc_type";
    pub const USE_RETRIEVAL: &str = "use_retrieval";
    pub const CREDENTIAL: &str = "openai_api_key";
    pub const TEXT: &str = "text";
    pub const QUERY: &str = "query";
    pub const DOC: &str = "doc";
}

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Wire generation spoken by an endpoint.
///
/// Legacy endpoints have no success flag and tag evaluation lines with a
/// `SCORE ` / `EVAL ` prefix; current endpoints report success explicitly and
/// tag lines with a `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolRevision {
    Legacy,
    Current,
}

/// Every operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Test,
    AgentQuery,
    AskDoc,
    Extract,
    Eval,
    IntellilangExtract,
    IntellilangEval,
}

impl Endpoint {
    pub const fn path(&self) -> &'static str {
        match self {
            Endpoint::Test => "/test",
            Endpoint::AgentQuery => "/agent/query",
            Endpoint::AskDoc => "/langroid/askdoc",
            Endpoint::Extract => "/extract",
            Endpoint::Eval => "/eval",
            Endpoint::IntellilangExtract => "/intellilang/extract",
            Endpoint::IntellilangEval => "/intellilang/eval",
        }
    }

    pub const fn revision(&self) -> ProtocolRevision {
        match self {
            Endpoint::IntellilangExtract | Endpoint::IntellilangEval => ProtocolRevision::Current,
            _ => ProtocolRevision::Legacy,
        }
    }
}

/// Per-call tunables shared by extraction and evaluation.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub params: Params,
    /// Overrides the client's default credential for this call.
    pub credential: Option<String>,
    /// Free-form document type tag, e.g. `"rfp"` or `"resume"`.
    pub doc_type: Option<String>,
    /// Ask the server for its retrieval-augmented strategy.
    pub use_retrieval: Option<bool>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.params = params.into();
        self
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    pub fn doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn use_retrieval(mut self, enable: bool) -> Self {
        self.use_retrieval = Some(enable);
        self
    }
}
