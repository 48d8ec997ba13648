//! `(success, payload)` reply contract of the current API shape.

use crate::error_code::ServiceErrorCode;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Server-reported failure: the payload is a human-readable detail instead of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFailure {
    pub status: u16,
    pub code: ServiceErrorCode,
    /// Never empty.
    pub detail: String,
}

impl ServiceFailure {
    /// Build a failure from a non-success status and the raw reply body.
    ///
    /// Prefers a FastAPI-style `{"detail": ...}` body, then the body text, then the
    /// status reason phrase. A blank or null `detail` goes straight to the reason phrase.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            code: ServiceErrorCode::from_http_status(status),
            detail: extract_detail(status, body),
        }
    }
}

impl fmt::Display for ServiceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} ({}): {}", self.status, self.code, self.detail)
    }
}

fn extract_detail(status: u16, body: &[u8]) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(s)) if !s.trim().is_empty() => return s.clone(),
            Some(Value::String(_)) | Some(Value::Null) => return reason_phrase(status),
            None => {}
            Some(other) => return other.to_string(),
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    reason_phrase(status)
}

fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// Outcome of a call against the current API shape.
///
/// Callers must check [`ServiceReply::success`] (or match) before treating the
/// payload as records.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply<T> {
    Success(T),
    Failure(ServiceFailure),
}

impl<T> ServiceReply<T> {
    pub fn success(&self) -> bool {
        matches!(self, ServiceReply::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ServiceReply::Success(t) => Some(t),
            ServiceReply::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ServiceFailure> {
        match self {
            ServiceReply::Success(_) => None,
            ServiceReply::Failure(f) => Some(f),
        }
    }

    /// The `(success, payload)` pair: records on success, error detail on failure.
    pub fn into_parts(self) -> (bool, std::result::Result<T, ServiceFailure>) {
        match self {
            ServiceReply::Success(t) => (true, Ok(t)),
            ServiceReply::Failure(f) => (false, Err(f)),
        }
    }

    /// Treat a server-reported failure as a hard error.
    pub fn into_result(self) -> Result<T> {
        match self {
            ServiceReply::Success(t) => Ok(t),
            ServiceReply::Failure(f) => Err(Error::Rejected(f)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceReply<U> {
        match self {
            ServiceReply::Success(t) => ServiceReply::Success(f(t)),
            ServiceReply::Failure(e) => ServiceReply::Failure(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_fastapi_body() {
        let f = ServiceFailure::from_response(401, br#"{"detail":"Invalid API key"}"#);
        assert_eq!(f.detail, "Invalid API key");
        assert_eq!(f.code, ServiceErrorCode::Authentication);
    }

    #[test]
    fn structured_detail_is_rendered_as_json() {
        let f = ServiceFailure::from_response(
            422,
            br#"{"detail":[{"loc":["body","reqs"],"msg":"field required"}]}"#,
        );
        assert!(f.detail.contains("field required"));
    }

    #[test]
    fn blank_detail_falls_back_to_reason() {
        assert_eq!(
            ServiceFailure::from_response(400, br#"{"detail":""}"#).detail,
            "Bad Request"
        );
        assert_eq!(
            ServiceFailure::from_response(500, br#"{"detail":null}"#).detail,
            "Internal Server Error"
        );
    }

    #[test]
    fn detail_falls_back_to_text_then_reason() {
        assert_eq!(ServiceFailure::from_response(500, b"  boom \n").detail, "boom");
        assert_eq!(
            ServiceFailure::from_response(503, b"").detail,
            "Service Unavailable"
        );
    }

    #[test]
    fn into_parts_and_result() {
        let ok: ServiceReply<u8> = ServiceReply::Success(7);
        assert!(ok.success());
        assert_eq!(ok.clone().into_parts(), (true, Ok(7)));
        assert_eq!(ok.map(|v| v * 2).into_result().unwrap(), 14);

        let failed: ServiceReply<u8> =
            ServiceReply::Failure(ServiceFailure::from_response(401, b"nope"));
        let (success, payload) = failed.clone().into_parts();
        assert!(!success);
        assert_eq!(payload.unwrap_err().detail, "nope");
        assert!(matches!(failed.into_result(), Err(Error::Rejected(_))));
    }
}
