use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

use dataapi_core::{
    error::{DataApiError, DataApiResult},
    transport::{API_KEY_HEADER, ActionRequest, Transport, TransportBuilder},
};

/// [`Transport`] that posts each action as JSON over HTTP.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already configured `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value> {
        let response = self
            .client
            .post(&request.url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &request.api_key)
            .json(&request.body)
            .send()
            .await
            .map_err(DataApiError::transport)?;

        trace!(action = %request.action, status = %response.status(), "data api responded");

        response
            .error_for_status()
            .map_err(DataApiError::transport)?
            .json::<Value>()
            .await
            .map_err(DataApiError::transport)
    }
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Default)]
pub struct HttpTransportBuilder {
    client: Option<Client>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Uses `client` as-is; `timeout` and `user_agent` are then ignored.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Applies a total timeout to every request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

#[async_trait]
impl TransportBuilder for HttpTransportBuilder {
    type Transport = HttpTransport;

    async fn build(self) -> DataApiResult<Self::Transport> {
        if let Some(client) = self.client {
            return Ok(HttpTransport::with_client(client));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        Ok(HttpTransport::with_client(
            builder
                .build()
                .map_err(|e| DataApiError::Configuration(e.to_string()))?,
        ))
    }
}
