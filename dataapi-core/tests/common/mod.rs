use async_trait::async_trait;
use mea::rwlock::RwLock;
use serde_json::{Value, json};
use std::{collections::VecDeque, fmt, sync::Arc};

use dataapi_core::{
    config::DataApiConfig,
    error::{DataApiError, DataApiResult},
    transport::{ActionRequest, Transport},
};

/// Transport that records every request and answers from a queue of canned responses.
///
/// Once the queue is empty every request is answered with `{}`.
#[derive(Clone)]
pub struct RecordingTransport {
    requests: Arc<RwLock<Vec<ActionRequest>>>,
    responses: Arc<RwLock<VecDeque<DataApiResult<Value>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub async fn respond_with(&self, response: Value) {
        self.responses.write().await.push_back(Ok(response));
    }

    pub async fn fail_next(&self, message: &str) {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, message.to_string());
        self.responses
            .write()
            .await
            .push_back(Err(DataApiError::transport(err)));
    }

    pub async fn requests(&self) -> Vec<ActionRequest> {
        self.requests.read().await.clone()
    }

    pub async fn last_request(&self) -> ActionRequest {
        self.requests
            .read()
            .await
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl fmt::Debug for RecordingTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ActionRequest) -> DataApiResult<Value> {
        self.requests.write().await.push(request);

        self.responses
            .write()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

pub fn config() -> DataApiConfig {
    DataApiConfig::builder()
        .endpoint("https://data.example.com/v1")
        .api_key("test-key")
        .data_source("Cluster0")
        .database("shop")
        .build()
        .expect("valid config")
}

/// The routing fields every request body starts with, merged with `body`.
pub fn routed(collection: &str, body: Value) -> Value {
    let mut routed = json!({
        "dataSource": "Cluster0",
        "database": "shop",
        "collection": collection,
    });

    if let (Some(target), Value::Object(fields)) = (routed.as_object_mut(), body) {
        target.extend(fields);
    }

    routed
}
