//! 流水线模块：把按行分隔的应答字节流解码、分类为评分与评估记录。
//!
//! # Line-Delimited Decoding Pipeline
//!
//! Evaluation replies interleave two record kinds on one line-delimited stream.
//! This module turns that stream into routed records:
//!
//! ```text
//! Raw Bytes → Line framing → skip blank → LineDecoder → EvalRecord
//!     │             │                          │
//!   HTTP        LinesCodec /            TaggedLineDecoder (legacy "SCORE {..}")
//!   body        BufRead::lines          TypedJsonDecoder  (current {"type":"SCORE",..})
//! ```
//!
//! The transform is lazy and single-pass: lines are decoded as they arrive and the
//! first malformed line fails the sequence, so score and evaluation counts are
//! never silently short.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`decode`] | The two [`LineDecoder`] strategies and [`create_decoder`] |
//! | [`split`] | Async and blocking line transforms, untagged requirement lines |

pub mod decode;
pub mod split;

#[cfg(test)]
mod tests;

pub use decode::{create_decoder, RoutingKey, TaggedLineDecoder, TypedJsonDecoder};
pub use split::{decode_bytes, decode_reader, decode_stream, PlainRecords, RecordLines};

use crate::protocol::ProtocolRevision;
use crate::types::EvalRecord;

/// Decodes one non-blank evaluation line into a routed record.
///
/// One implementation per protocol revision; the client picks it from the
/// endpoint it called, never from the reply's content type.
pub trait LineDecoder: Send + Sync {
    fn revision(&self) -> ProtocolRevision;

    fn decode_line(&self, line: &str) -> Result<EvalRecord, DecodeError>;
}

/// Why a single line could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("missing routing tag{}", .hint.as_ref().map(|h| format!("\n💡 Hint: {}", h)).unwrap_or_default())]
    MissingTag { hint: Option<String> },

    #[error("unknown routing tag `{0}` (expected SCORE or EVAL)")]
    UnknownTag(String),

    #[error("line framing failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Attach an actionable hint to a missing-tag error
    pub fn with_hint(mut self, text: impl Into<String>) -> Self {
        if let DecodeError::MissingTag { ref mut hint } = self {
            *hint = Some(text.into());
        }
        self
    }
}
