//! Transport abstraction for delivering actions to the data API.
//!
//! A [`Transport`] takes one fully assembled [`ActionRequest`] (URL, API key, JSON
//! body) and returns the parsed JSON response. It knows nothing about collections
//! or operations; everything action-specific happens before the request is built.
//!
//! The production implementation lives in the `dataapi-http` crate. Tests can
//! implement the trait with an in-memory recorder.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//! use dataapi::transport::{ActionRequest, Transport};
//! use dataapi::error::DataApiResult;
//! use serde_json::{json, Value};
//!
//! #[derive(Debug)]
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn send(&self, _request: ActionRequest) -> DataApiResult<Value> {
//!         Ok(json!({ "documents": [] }))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::Arc};

use crate::{action::Action, error::DataApiResult};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "Api-Key";

/// A single POST to `{endpoint}/action/{action}`.
#[derive(Clone, PartialEq)]
pub struct ActionRequest {
    /// The action being performed, also the last URL path segment.
    pub action: Action,
    /// Absolute URL the body is posted to.
    pub url: String,
    /// Value of the `Api-Key` header.
    pub api_key: String,
    /// Routing fields (`dataSource`, `database`, `collection`) merged with the action body.
    pub body: Map<String, Value>,
}

impl ActionRequest {
    /// The routing field naming the target collection, if present.
    pub fn collection(&self) -> Option<&str> {
        self.body.get("collection").and_then(Value::as_str)
    }
}

impl Debug for ActionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRequest")
            .field("action", &self.action)
            .field("url", &self.url)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Delivers action requests and returns parsed JSON responses.
///
/// Any failure of the underlying call (connectivity, error status, unparseable body)
/// must be reported as [`DataApiError::Transport`](crate::error::DataApiError::Transport).
/// Implementations should not retry.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends one request and returns the parsed response body.
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value>;
}

#[async_trait]
impl<T> Transport for &T
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value> {
        (**self).send(request).await
    }
}

/// Factory trait for transports that need async setup.
#[async_trait]
pub trait TransportBuilder {
    type Transport: Transport;

    async fn build(self) -> DataApiResult<Self::Transport>;
}
