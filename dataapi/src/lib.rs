//! Main dataapi crate: a document-driver-like collection interface over a remote JSON data API.
//!
//! This crate is the primary entry point. It re-exports the core types from
//! `dataapi-core` and, with the default `http` feature, the `reqwest`-based transport.
//!
//! # Features
//!
//! - **Chainable reads** - `find(..).sort(..).limit(..).select(..)`, executed with `.exec()` or `.await`
//! - **Immediate mutations** - `insert_one`, `update_one`, `update_many`, `delete_one`, `delete_many`
//! - **Saveable documents** - documents returned by `find_one` write themselves back with `save()`
//! - **Typed collections** - encode and decode your own serde types
//! - **Pluggable transport** - swap the HTTP transport for anything implementing `Transport`
//!
//! # Quick Start
//!
//! ```ignore
//! use dataapi::{prelude::*, http::HttpTransport};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DataApiClient::new(DataApiConfig::from_env()?, HttpTransport::new());
//!     let tasks = client.collection("tasks");
//!
//!     // Mutations execute as soon as they are awaited
//!     tasks.insert_one(json!({ "title": "write docs", "status": "open" })).await?;
//!
//!     // Reads are staged, then executed
//!     let open = tasks
//!         .find(json!({ "status": "open" }))
//!         .sort_by("createdAt", SortDirection::Desc)
//!         .limit(10)
//!         .select("title status")
//!         .exec()
//!         .await?;
//!     println!("{} open tasks", open.len());
//!
//!     // Found documents can be modified and saved back
//!     if let Some(mut task) = tasks.find_one(json!({ "title": "write docs" })).await? {
//!         task.insert("status".into(), json!("done"));
//!         task.save().await?;
//!     }
//!
//!     // Unfiltered updates and deletes are refused before anything is sent
//!     assert!(tasks.delete_many(json!({})).await.is_err());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Transports
//!
//! - [`http`] - `reqwest`-based HTTP transport (requires the default `http` feature)

pub mod prelude;

pub use dataapi_core::{action, client, collection, config, document, error, operation, transport};

// Re-export JSON and BSON crates for convenience
pub use bson;
pub use serde_json;

/// HTTP transport implementations.
///
/// This module is only available when the `http` feature is enabled.
#[cfg(feature = "http")]
pub mod http {
    pub use dataapi_http::{HttpTransport, HttpTransportBuilder};
}
