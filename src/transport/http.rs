use crate::client::ClientConfig;
use crate::protocol::{Endpoint, FormPayload, REQUEST_ID_HEADER};
use crate::transport::{join_url, TransportError};
use crate::{BoxStream, Error, ErrorContext, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Proxy;
use tracing::debug;
use uuid::Uuid;

/// Async transport over a shared `reqwest::Client`.
///
/// Holds no per-call state, so one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
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

    /// POST a multipart body. Returns the response whatever its status.
    pub async fn post_form(&self, endpoint: Endpoint, form: FormPayload) -> Result<reqwest::Response> {
        let attachments = form.attachment_count();
        let request = self
            .client
            .post(self.url_for(endpoint))
            .multipart(form.into_multipart()?);
        self.send(endpoint, request, attachments).await
    }

    /// POST a JSON body. Returns the response whatever its status.
    pub async fn post_json(
        &self,
        endpoint: Endpoint,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        let request = self.client.post(self.url_for(endpoint)).json(body);
        self.send(endpoint, request, 0).await
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
        attachments: usize,
    ) -> Result<reqwest::Response> {
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
            .await
            .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))
    }
}

/// Read the whole body; a broken connection here is still a transport failure.
pub async fn read_body(response: reqwest::Response) -> Result<Bytes> {
    response
        .bytes()
        .await
        .map_err(|e| Error::Transport(TransportError::from_reqwest(e)))
}

/// Expose the body as a lazily pulled byte stream.
pub fn body_stream(response: reqwest::Response) -> BoxStream<'static, Bytes> {
    Box::pin(
        response
            .bytes_stream()
            .map_err(|e| Error::Transport(TransportError::from_reqwest(e))),
    )
}
