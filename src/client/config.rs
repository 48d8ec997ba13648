use crate::pipeline::RoutingKey;
use crate::{Error, ErrorContext, Result};
use std::env;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:80";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_BASE_URL: &str = "LANGROID_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "LANGROID_HTTP_TIMEOUT_SECS";
pub const ENV_PROXY_URL: &str = "LANGROID_PROXY_URL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Resolved client settings. Immutable once a client is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Scheme, host and optional port (and optional path prefix) of the service.
    pub base_url: String,
    /// Whole-call timeout. Extraction and evaluation run model calls server-side,
    /// so this defaults far above a typical API timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub proxy: Option<String>,
    /// Default credential, forwarded verbatim when a call does not supply one.
    pub api_key: Option<String>,
    pub routing_key: RoutingKey,
}

impl ClientConfig {
    /// Defaults only; no environment lookups.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            proxy: None,
            api_key: None,
            routing_key: RoutingKey::default(),
        }
    }

    /// Defaults overridden by `LANGROID_*` / `OPENAI_API_KEY` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::new(
            env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        );
        if let Some(secs) = env_timeout_secs() {
            config.timeout = Duration::from_secs(secs);
        }
        config.proxy = env::var(ENV_PROXY_URL).ok().filter(|s| !s.trim().is_empty());
        config.api_key = env::var(ENV_API_KEY).ok().filter(|s| !s.trim().is_empty());
        config
    }

    /// Check the base URL. Performs no network activity.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("client_config"),
            )
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Error::configuration_with_context(
                "Base URL must be an http(s) URL with a host",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("client_config"),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "Timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("timeout")
                    .with_source("client_config"),
            ));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn env_timeout_secs() -> Option<u64> {
    env::var(ENV_TIMEOUT_SECS)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls_with_port() {
        assert!(ClientConfig::new("http://localhost:80").validate().is_ok());
        assert!(ClientConfig::new("https://langroid.example.com/api/").validate().is_ok());
    }

    #[test]
    fn rejects_unusable_urls() {
        for bad in ["localhost:80", "ftp://host", "not a url", ""] {
            let err = ClientConfig::new(bad).validate().unwrap_err();
            assert_eq!(
                err.context().and_then(|c| c.field_path.as_deref()),
                Some("base_url"),
                "{bad}"
            );
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = ClientConfig::default();
        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
