//! Record types decoded from line-delimited payloads.

use crate::pipeline::split::{count_lines, PlainRecords};
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// One JSON object decoded from a single payload line.
pub type Record = Map<String, Value>;

/// Routing discriminator of an evaluation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    /// Per-candidate aggregate score.
    Score,
    /// Per-candidate, per-requirement evaluation.
    Eval,
}

impl RecordKind {
    /// Wire tag (`"SCORE"` / `"EVAL"`), identical in both protocol revisions.
    pub const fn tag(&self) -> &'static str {
        match self {
            RecordKind::Score => "SCORE",
            RecordKind::Eval => "EVAL",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SCORE" => Some(RecordKind::Score),
            "EVAL" => Some(RecordKind::Eval),
            _ => None,
        }
    }
}

/// A decoded evaluation line, already routed by its discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalRecord {
    Score(Record),
    Eval(Record),
}

impl EvalRecord {
    pub fn new(kind: RecordKind, record: Record) -> Self {
        match kind {
            RecordKind::Score => EvalRecord::Score(record),
            RecordKind::Eval => EvalRecord::Eval(record),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            EvalRecord::Score(_) => RecordKind::Score,
            EvalRecord::Eval(_) => RecordKind::Eval,
        }
    }

    pub fn record(&self) -> &Record {
        match self {
            EvalRecord::Score(r) | EvalRecord::Eval(r) => r,
        }
    }

    pub fn into_record(self) -> Record {
        match self {
            EvalRecord::Score(r) | EvalRecord::Eval(r) => r,
        }
    }
}

/// Score and evaluation sequences split out of one evaluation reply.
///
/// Each sequence keeps the relative order in which its lines were received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationRecords {
    pub scores: Vec<Record>,
    pub evals: Vec<Record>,
}

impl EvaluationRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EvalRecord) {
        match record {
            EvalRecord::Score(r) => self.scores.push(r),
            EvalRecord::Eval(r) => self.evals.push(r),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.evals.is_empty()
    }

    /// `(scores, evals)`, the shape most callers destructure into.
    pub fn into_parts(self) -> (Vec<Record>, Vec<Record>) {
        (self.scores, self.evals)
    }

    /// Drain a fallible record sequence, failing on the first bad line.
    pub fn try_collect<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<EvalRecord>>,
    {
        let mut out = Self::new();
        for record in records {
            out.push(record?);
        }
        Ok(out)
    }

    /// Async counterpart of [`EvaluationRecords::try_collect`].
    pub async fn try_collect_stream(mut stream: BoxStream<'_, EvalRecord>) -> Result<Self> {
        let mut out = Self::new();
        while let Some(record) = stream.next().await {
            out.push(record?);
        }
        Ok(out)
    }
}

impl Extend<EvalRecord> for EvaluationRecords {
    fn extend<T: IntoIterator<Item = EvalRecord>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<EvalRecord> for EvaluationRecords {
    fn from_iter<T: IntoIterator<Item = EvalRecord>>(iter: T) -> Self {
        let mut out = Self::new();
        out.extend(iter);
        out
    }
}

/// Raw JSONL payload returned by requirement extraction.
///
/// Kept undecoded so it can be saved or sent back verbatim as the requirements
/// source of an evaluation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRequirements {
    bytes: Bytes,
}

impl ExtractedRequirements {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    /// Number of non-blank lines, i.e. the number of requirements.
    pub fn len(&self) -> usize {
        count_lines(&self.bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily decode each non-blank line into a [`Record`].
    pub fn records(&self) -> PlainRecords<'_> {
        PlainRecords::new(&self.bytes)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.bytes).map_err(|source| Error::Document {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<Vec<u8>> for ExtractedRequirements {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for ExtractedRequirements {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
