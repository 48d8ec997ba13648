use crate::client::ClientConfig;
use crate::protocol::{Endpoint, FormPayload, REQUEST_ID_HEADER};
use crate::transport::{join_url, TransportError};
use crate::{Error, ErrorContext, Result};
use reqwest::Proxy;
use tracing::debug;
use uuid::Uuid;

/// Blocking transport: each call holds the calling thread until the reply headers arrive.
///
/// Must not be constructed or used from inside an async runtime worker.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BlockingTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);

        if let Some(proxy_url) = &config.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid proxy: {}", e),
                    ErrorContext::new()
                        .with_field_path("proxy")
                        .with_source("transport"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, endpoint: Endpoint) -> String {
        join_url(&self.base_url, endpoint.path())
    }

    pub fn post_form(
        &self,
        endpoint: Endpoint,
        form: FormPayload,
    ) -> Result<reqwest::blocking::Response> {
        let attachments = form.attachment_count();
        let request = self
            .client
            .post(self.url_for(endpoint))
            .multipart(form.into_blocking_multipart()?);
        self.send(endpoint, request, attachments)
    }

    pub fn post_json(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response> {
        let request = self.client.post(self.url_for(endpoint)).json(body);
        self.send(endpoint, request, 0)
    }

    fn send(
        &self,
        endpoint: Endpoint,
        request: reqwest::blocking::RequestBuilder,
        attachments: usize,
    ) -> Result<reqwest::blocking::Response> {
        let request_id = Uuid::new_v4().to_string();
        debug!(
            endpoint = endpoint.path(),
            request_id = %request_id,
            attachments,
            "issuing request"
        );
        request
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .send()
            .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))
    }
}

pub fn read_body(response: reqwest::blocking::Response) -> Result<bytes::Bytes> {
    response
        .bytes()
        .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))
}
