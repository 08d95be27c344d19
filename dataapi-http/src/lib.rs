//! HTTP transport for dataapi.
//!
//! This crate provides the production [`Transport`](dataapi_core::transport::Transport)
//! implementation: every action is a single JSON `POST` to
//! `{endpoint}/action/{action}` with `Content-Type: application/json` and
//! `Api-Key` headers, sent through a shared `reqwest` client.
//!
//! Connection errors, non-success statuses, and bodies that are not JSON are all
//! reported as [`DataApiError::Transport`](dataapi_core::error::DataApiError::Transport).
//! Nothing is retried.
//!
//! To use this transport through the facade crate, keep the default `http` feature:
//!
//! ```toml
//! [dependencies]
//! dataapi = { version = "x.y.z" }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dataapi::{prelude::*, http::HttpTransport};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::builder()
//!         .timeout(Duration::from_secs(10))
//!         .build()
//!         .await?;
//!     let client = DataApiClient::new(DataApiConfig::from_env()?, transport);
//!
//!     let orders = client.collection("orders").find(serde_json::json!({})).await?;
//!     println!("{} orders", orders.len());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as dataapi_http;

pub mod transport;

pub use transport::{HttpTransport, HttpTransportBuilder};
