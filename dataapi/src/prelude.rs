//! Convenient re-exports of commonly used types from dataapi.
//!
//! ```ignore
//! use dataapi::prelude::*;
//! ```

pub use dataapi_core::{
    action::Action,
    client::DataApiClient,
    collection::{Collection, Find, FindOne, TypedCollection, TypedFind},
    config::{DataApiConfig, DataApiConfigBuilder},
    document::{Document, DocumentExt, FoundDocument, Identity},
    error::{DataApiError, DataApiResult},
    operation::{ActionOutput, PendingOperation, Projection, SortDirection},
    transport::{ActionRequest, Transport, TransportBuilder},
};
