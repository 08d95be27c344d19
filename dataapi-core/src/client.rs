//! Entry point tying a configuration to a transport.
//!
//! # Example
//!
//! ```ignore
//! use dataapi::{client::DataApiClient, config::DataApiConfig, http::HttpTransport};
//!
//! let client = DataApiClient::new(DataApiConfig::from_env()?, HttpTransport::new());
//! let orders = client.collection("orders");
//! let order = client.typed_collection::<Order>();
//! ```

use crate::{
    collection::{Collection, TypedCollection},
    config::DataApiConfig,
    document::Document,
    transport::Transport,
};

/// A data API client bound to one configuration and one transport.
///
/// Collections borrow both, so any number of them can be handed out cheaply.
#[derive(Debug)]
pub struct DataApiClient<T: Transport> {
    config: DataApiConfig,
    transport: T,
}

impl<T: Transport> DataApiClient<T> {
    /// Creates a new client with the given configuration and transport.
    pub fn new(config: DataApiConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Gets a collection handle with the given name.
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, T> {
        Collection::new(name, &self.config, &self.transport)
    }

    /// Gets a collection handle that authenticates with `api_key` instead of the default.
    pub fn collection_with_api_key<'a>(&'a self, name: &str, api_key: &str) -> Collection<'a, T> {
        self.collection(name).with_api_key(api_key)
    }

    /// Gets a typed collection for the specified document type.
    ///
    /// The collection name is determined by the document type's `collection_name()` method.
    pub fn typed_collection<'a, D: Document>(&'a self) -> TypedCollection<'a, T, D> {
        TypedCollection::new(self.collection(D::collection_name()))
    }

    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Splits the client back into its parts.
    pub fn into_parts(self) -> (DataApiConfig, T) {
        (self.config, self.transport)
    }
}
