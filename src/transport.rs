//! HTTP transport: one POST per call, with correlation headers and failure classification.
//!
//! Nothing here retries, caches, or follows redirects beyond reqwest's defaults.

pub mod http;

#[cfg(feature = "blocking")]
pub mod blocking;

pub use http::HttpTransport;

#[cfg(feature = "blocking")]
pub use blocking::BlockingTransport;

/// The service could not be reached, or the connection broke mid-reply.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(reqwest::Error),

    #[error("request timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e)
        } else if e.is_connect() {
            TransportError::Connect(e)
        } else {
            TransportError::Http(e)
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::from_reqwest(e)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
