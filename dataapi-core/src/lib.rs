//! A chainable document collection interface over a remote JSON data API.
//!
//! Calling code writes familiar find/insert/update/delete chains against a
//! collection; every execution becomes a single HTTP POST to
//! `{endpoint}/action/{action}` carrying `{dataSource, database, collection, ...}`,
//! and the response envelope (`document` / `documents`) is stripped before the
//! result reaches the caller.
//!
//! This crate provides:
//!
//! - **Configuration** ([`config`]) - Endpoint, API key, cluster, and database settings
//! - **Actions** ([`action`]) - The closed set of data API actions
//! - **Pending operations** ([`operation`]) - Request body assembly and response normalization
//! - **Transport abstraction** ([`transport`]) - The seam the HTTP client plugs into
//! - **Collections** ([`collection`]) - The chainable find/insert/update/delete surface
//! - **Documents** ([`document`]) - Document traits, identities, and saveable results
//! - **Client** ([`client`]) - Hands out collections sharing one configuration and transport
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use dataapi::prelude::*;
//! use serde_json::json;
//!
//! let client = DataApiClient::new(DataApiConfig::from_env()?, HttpTransport::new());
//! let orders = client.collection("orders");
//!
//! orders.insert_one(json!({ "status": "open", "total": 12.5 })).await?;
//! let open = orders.find(json!({ "status": "open" })).limit(20).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as dataapi_core;

pub mod action;
pub mod client;
pub mod collection;
pub mod config;
pub mod document;
pub mod error;
pub mod operation;
pub mod transport;
