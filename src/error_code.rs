//! Classification of service-side failures.
//!
//! The document-analysis service reports failures through HTTP status codes and a
//! free-form `detail` string. This module maps the status onto a small, stable set
//! of classes so callers can branch without matching raw numbers.
//!
//! ## Example
//!
//! ```rust
//! use langroid_client::error_code::ServiceErrorCode;
//!
//! let code = ServiceErrorCode::from_http_status(401);
//! assert_eq!(code, ServiceErrorCode::Authentication);
//! assert_eq!(code.name(), "authentication");
//! assert_eq!(code.category(), "client");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure class derived from the HTTP status of a rejected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceErrorCode {
    /// Malformed multipart form, bad parameter blob, or missing required fields
    InvalidRequest,
    /// Credential missing or rejected
    Authentication,
    /// Credential accepted but not allowed to use this operation
    PermissionDenied,
    /// Endpoint does not exist on this deployment (often a protocol-revision mismatch)
    NotFound,
    /// Uploaded documents exceed the server's payload limit
    RequestTooLarge,
    /// Form parsed but failed server-side validation (FastAPI 422)
    Unprocessable,
    /// Upstream model rate limit or budget reached
    RateLimited,
    /// Unhandled exception while extracting or evaluating
    ServerError,
    /// Service temporarily unavailable
    Overloaded,
    /// Gateway gave up waiting for the analysis to finish
    Timeout,
    Unknown,
}

impl ServiceErrorCode {
    /// Returns the standard name (e.g., `"invalid_request"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Authentication => "authentication",
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::RequestTooLarge => "request_too_large",
            Self::Unprocessable => "unprocessable",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::Overloaded => "overloaded",
            Self::Timeout => "timeout",
            Self::Unknown => "unknown",
        }
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"`, or `"unknown"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidRequest
            | Self::Authentication
            | Self::PermissionDenied
            | Self::NotFound
            | Self::RequestTooLarge
            | Self::Unprocessable => "client",
            Self::RateLimited => "rate",
            Self::ServerError | Self::Overloaded | Self::Timeout => "server",
            Self::Unknown => "unknown",
        }
    }

    /// Maps an HTTP status code to the most likely class.
    ///
    /// Statuses without a mapping return `ServiceErrorCode::Unknown`.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 | 405 => Self::NotFound,
            408 | 504 => Self::Timeout,
            413 => Self::RequestTooLarge,
            422 => Self::Unprocessable,
            429 => Self::RateLimited,
            500 | 502 => Self::ServerError,
            503 => Self::Overloaded,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_statuses() {
        assert_eq!(ServiceErrorCode::from_http_status(400), ServiceErrorCode::InvalidRequest);
        assert_eq!(ServiceErrorCode::from_http_status(405), ServiceErrorCode::NotFound);
        assert_eq!(ServiceErrorCode::from_http_status(422), ServiceErrorCode::Unprocessable);
        assert_eq!(ServiceErrorCode::from_http_status(504), ServiceErrorCode::Timeout);
        assert_eq!(ServiceErrorCode::from_http_status(418), ServiceErrorCode::Unknown);
    }

    #[test]
    fn categories() {
        assert_eq!(ServiceErrorCode::Unprocessable.category(), "client");
        assert_eq!(ServiceErrorCode::RateLimited.category(), "rate");
        assert_eq!(ServiceErrorCode::Overloaded.category(), "server");
        assert_eq!(ServiceErrorCode::Unknown.to_string(), "unknown");
    }
}
