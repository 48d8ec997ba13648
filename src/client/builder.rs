use crate::client::config::ClientConfig;
use crate::client::core::LangroidClient;
use crate::pipeline::RoutingKey;
use crate::Result;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Unset values fall back to the environment (see [`ClientConfig::from_env`]),
/// then to built-in defaults. Building never touches the network.
pub struct LangroidClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    proxy: Option<String>,
    routing_key: RoutingKey,
}

impl LangroidClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: None,
            connect_timeout: None,
            proxy: None,
            routing_key: RoutingKey::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Default credential for calls that do not pass one.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Keep the `type` key on records decoded from current-revision evaluation replies.
    pub fn retain_routing_key(mut self, retain: bool) -> Self {
        self.routing_key = if retain {
            RoutingKey::Retain
        } else {
            RoutingKey::Strip
        };
        self
    }

    /// Resolve builder values over the environment and defaults, then validate.
    pub fn into_config(self) -> Result<ClientConfig> {
        let env = ClientConfig::from_env();
        let config = ClientConfig {
            base_url: self.base_url.unwrap_or(env.base_url),
            timeout: self.timeout.unwrap_or(env.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(env.connect_timeout),
            proxy: self.proxy.or(env.proxy),
            api_key: self.api_key.or(env.api_key),
            routing_key: self.routing_key,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn build(self) -> Result<LangroidClient> {
        LangroidClient::from_config(self.into_config()?)
    }

    #[cfg(feature = "blocking")]
    pub fn build_blocking(self) -> Result<crate::client::blocking::LangroidClient> {
        crate::client::blocking::LangroidClient::from_config(self.into_config()?)
    }
}

impl Default for LangroidClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::config;

    #[test]
    fn explicit_values_win() {
        let config = LangroidClientBuilder::new()
            .base_url("http://api.internal:8080")
            .api_key("sk-test")
            .timeout(Duration::from_secs(5))
            .retain_routing_key(true)
            .into_config()
            .unwrap();
        assert_eq!(config.base_url, "http://api.internal:8080");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.routing_key, RoutingKey::Retain);
        assert_eq!(
            config.connect_timeout,
            Duration::from_secs(config::DEFAULT_CONNECT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn invalid_base_url_fails_at_build() {
        assert!(LangroidClientBuilder::new().base_url("nope").build().is_err());
    }
}
