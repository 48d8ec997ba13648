//! # langroid-client
//!
//! 文档分析服务的 Rust 客户端：需求抽取与候选文档评估。
//!
//! Client library for the Langroid document-analysis service.
//!
//! ## Overview
//!
//! All analysis (text extraction, model reasoning, scoring) runs server-side. This
//! crate builds the multipart requests, transfers the documents, decodes the
//! line-delimited replies, and reports success or failure without guessing.
//!
//! ## Operations
//!
//! | Method | Endpoint | Returns |
//! |--------|----------|---------|
//! | `ping` | `POST /test` | the square of the input |
//! | `agent_query` | `POST /agent/query` | plain-text answer |
//! | `ask_doc` | `POST /langroid/askdoc` | plain-text answer about one document |
//! | `extract_reqs` | `POST /extract` | raw requirements JSONL (legacy shape) |
//! | `eval_from_reqs` | `POST /eval` | scores and evaluations (legacy shape) |
//! | `intellilang_extract_reqs` | `POST /intellilang/extract` | `ServiceReply<ExtractedRequirements>` |
//! | `intellilang_eval` | `POST /intellilang/eval` | `ServiceReply<EvaluationRecords>` |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use langroid_client::protocol::{CallOptions, ExtractParams, Params};
//! use langroid_client::{LangroidClient, ServiceReply};
//!
//! #[tokio::main]
//! async fn main() -> langroid_client::Result<()> {
//!     let client = LangroidClient::new("http://localhost:80")?;
//!     assert_eq!(client.ping(5).await?, 25);
//!
//!     let options = CallOptions::new().params(Params::try_from(&ExtractParams::num(3))?);
//!     let reqs = client
//!         .intellilang_extract_reqs("rfp.pdf", "candidate.pdf", &options)
//!         .await?
//!         .into_result()?;
//!
//!     match client
//!         .intellilang_eval(&reqs, ["candidate.pdf", "other.pdf"], &CallOptions::new())
//!         .await?
//!     {
//!         ServiceReply::Success(records) => {
//!             println!("{} scores, {} evaluations", records.scores.len(), records.evals.len());
//!         }
//!         ServiceReply::Failure(failure) => eprintln!("rejected: {}", failure.detail),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Async and blocking clients, builder, configuration |
//! | [`protocol`] | Endpoints, multipart fields, parameter blob, documents |
//! | [`pipeline`] | Line-delimited decoding of evaluation replies |
//! | [`types`] | Records, evaluation results, the success/failure reply |
//! | [`transport`] | reqwest plumbing |

pub mod client;
pub mod error_code;
pub mod pipeline;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, LangroidClient, LangroidClientBuilder};
pub use protocol::{CallOptions, DocumentSource, Params};
pub use types::{
    EvalRecord, EvaluationRecords, ExtractedRequirements, Record, RecordKind, ServiceFailure,
    ServiceReply,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
