//! Line decoders (one line -> routed record)
//!
//! Two wire generations share the same `SCORE` / `EVAL` vocabulary but carry it
//! differently:
//! - legacy: `SCORE {"candidate": ...}`, a bare tag token, one space, then the object
//! - current: `{"type": "SCORE", "candidate": ...}`, a plain object with a `type` field

use crate::pipeline::{DecodeError, LineDecoder};
use crate::protocol::ProtocolRevision;
use crate::types::{EvalRecord, Record, RecordKind};
use serde_json::Value;

/// Field carrying the routing tag in current-revision lines.
pub const TYPE_FIELD: &str = "type";

/// Whether current-revision records keep their `type` key once routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingKey {
    #[default]
    Strip,
    Retain,
}

/// Legacy space-tag decoder: `<TAG> <json object>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedLineDecoder;

impl LineDecoder for TaggedLineDecoder {
    fn revision(&self) -> ProtocolRevision {
        ProtocolRevision::Legacy
    }

    fn decode_line(&self, line: &str) -> Result<EvalRecord, DecodeError> {
        let line = line.trim();
        let Some((tag, rest)) = line.split_once(' ') else {
            return Err(missing_legacy_tag(line));
        };
        let kind = match RecordKind::from_tag(tag) {
            Some(kind) => kind,
            None if tag.starts_with('{') => return Err(missing_legacy_tag(line)),
            None => return Err(DecodeError::UnknownTag(tag.to_string())),
        };
        Ok(EvalRecord::new(kind, parse_object(rest)?))
    }
}

fn missing_legacy_tag(line: &str) -> DecodeError {
    let err = DecodeError::MissingTag { hint: None };
    if line.starts_with('{') {
        err.with_hint("line is a bare JSON object; the endpoint may speak the current `type`-field format")
    } else {
        err
    }
}

/// Current decoder: JSON object routed by its `type` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedJsonDecoder {
    routing_key: RoutingKey,
}

impl TypedJsonDecoder {
    pub fn new(routing_key: RoutingKey) -> Self {
        Self { routing_key }
    }

    pub fn routing_key(&self) -> RoutingKey {
        self.routing_key
    }
}

impl LineDecoder for TypedJsonDecoder {
    fn revision(&self) -> ProtocolRevision {
        ProtocolRevision::Current
    }

    fn decode_line(&self, line: &str) -> Result<EvalRecord, DecodeError> {
        let trimmed = line.trim();
        if RecordKind::from_tag(leading_token(trimmed)).is_some() {
            return Err(DecodeError::MissingTag { hint: None }
                .with_hint("line carries a legacy `SCORE `/`EVAL ` prefix; the endpoint may speak the legacy format"));
        }
        let mut record = parse_object(trimmed)?;
        let kind = match record.get(TYPE_FIELD) {
            Some(Value::String(tag)) => {
                RecordKind::from_tag(tag).ok_or_else(|| DecodeError::UnknownTag(tag.clone()))?
            }
            Some(other) => return Err(DecodeError::UnknownTag(other.to_string())),
            None => return Err(DecodeError::MissingTag { hint: None }),
        };
        if self.routing_key == RoutingKey::Strip {
            record.remove(TYPE_FIELD);
        }
        Ok(EvalRecord::new(kind, record))
    }
}

fn leading_token(line: &str) -> &str {
    line.split(' ').next().unwrap_or_default()
}

/// Parse a JSON object, rejecting scalars and arrays.
pub(crate) fn parse_object(raw: &str) -> Result<Record, DecodeError> {
    match serde_json::from_str::<Value>(raw.trim())? {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pick the decoder matching the protocol revision of the endpoint that was called.
pub fn create_decoder(revision: ProtocolRevision, routing_key: RoutingKey) -> Box<dyn LineDecoder> {
    match revision {
        ProtocolRevision::Legacy => Box::new(TaggedLineDecoder),
        ProtocolRevision::Current => Box::new(TypedJsonDecoder::new(routing_key)),
    }
}
