//! Error types and result types for data API operations.
//!
//! Every fallible operation in this crate returns [`DataApiResult<T>`]. Failures are
//! surfaced to the immediate caller unchanged: there is no retry, backoff, or
//! recovery layer.

use serde_json::Error as SerdeJsonError;
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed source error carried by [`DataApiError::Transport`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Represents all possible errors that can occur when talking to a data API collection.
#[derive(Error, Debug)]
pub enum DataApiError {
    /// The staged operation cannot be sent, e.g. an update or delete with an empty filter.
    /// Raised before any network call.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// The value handed in as a document is not a JSON object.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// The underlying network call failed (connectivity, server error, non-JSON body).
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),
    /// Serialization/deserialization error when converting between documents and JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The client configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DataApiError {
    /// Wraps any error as a transport failure, keeping it as the source.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        DataApiError::Transport(err.into())
    }

    /// Returns `true` when the error was raised before anything was sent.
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, DataApiError::InvalidOperation(_))
    }
}

/// A specialized `Result` type for data API operations.
pub type DataApiResult<T> = Result<T, DataApiError>;

impl From<SerdeJsonError> for DataApiError {
    fn from(err: SerdeJsonError) -> Self {
        DataApiError::Serialization(err.to_string())
    }
}
