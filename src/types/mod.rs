//! 类型模块：定义记录、评估结果与服务应答等调用级数据类型。
//!
//! # Types Module
//!
//! Call-scoped data types. Everything here is created by one client call and
//! handed to the caller; the client keeps no copy.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Record`] | One decoded JSON object from a line-delimited payload |
//! | [`EvalRecord`] | A record routed to the score or evaluation sequence |
//! | [`EvaluationRecords`] | Scores and evaluations split out of one evaluation reply |
//! | [`ExtractedRequirements`] | Raw JSONL payload returned by requirement extraction |
//! | [`ServiceReply`] | Explicit success/failure wrapper of the current API shape |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`records`] | Record and payload types |
//! | [`reply`] | `(success, payload)` reply contract |

pub mod records;
pub mod reply;

pub use records::{EvalRecord, EvaluationRecords, ExtractedRequirements, Record, RecordKind};
pub use reply::{ServiceFailure, ServiceReply};
