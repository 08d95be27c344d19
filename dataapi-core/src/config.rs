//! Connection settings for a remote data API.
//!
//! A [`DataApiConfig`] is assembled once, either explicitly through
//! [`DataApiConfig::builder`], from any serde source, or from the process
//! environment with [`DataApiConfig::from_env`], and then handed to the client.
//! Collections never consult the environment themselves.
//!
//! # Example
//!
//! ```ignore
//! use dataapi::config::DataApiConfig;
//!
//! let config = DataApiConfig::builder()
//!     .endpoint("https://data.example.com/app/data-abc/endpoint/data/v1")
//!     .api_key("secret")
//!     .data_source("Cluster0")
//!     .database("shop")
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};
use std::{env, fmt};

use crate::{
    action::Action,
    error::{DataApiError, DataApiResult},
};

/// Environment variable holding the endpoint base URL.
pub const ENV_ENDPOINT: &str = "DATA_API_URL";
/// Environment variable holding the default API key.
pub const ENV_API_KEY: &str = "DATA_API_KEY";
/// Environment variable holding the cluster (data source) identifier.
pub const ENV_DATA_SOURCE: &str = "DATA_API_CLUSTER";
/// Environment variable holding the database name.
pub const ENV_DATABASE: &str = "DATA_API_DATABASE";

/// Immutable routing and credential settings shared by every collection of a client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataApiConfig {
    /// Base URL of the data API; actions are posted to `{endpoint}/action/{action}`.
    pub endpoint: String,
    /// API key sent in the `Api-Key` header.
    pub api_key: String,
    /// Cluster identifier, sent as `dataSource`.
    pub data_source: String,
    /// Database name, sent as `database`.
    pub database: String,
}

impl DataApiConfig {
    /// Creates a builder for assembling a configuration field by field.
    pub fn builder() -> DataApiConfigBuilder {
        DataApiConfigBuilder::default()
    }

    /// Loads the configuration from the `DATA_API_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::Configuration`] naming the first variable that is unset or blank.
    pub fn from_env() -> DataApiResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> DataApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .ok_or_else(|| DataApiError::Configuration(format!("{key} is not set")))
        };

        DataApiConfigBuilder {
            endpoint: Some(read(ENV_ENDPOINT)?),
            api_key: Some(read(ENV_API_KEY)?),
            data_source: Some(read(ENV_DATA_SOURCE)?),
            database: Some(read(ENV_DATABASE)?),
        }
        .build()
    }

    /// Returns a copy of this configuration using a different API key.
    pub fn with_api_key(&self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..self.clone()
        }
    }

    /// Renders the URL an action is posted to.
    pub fn action_url(&self, action: Action) -> String {
        format!("{}/action/{}", self.endpoint.trim_end_matches('/'), action)
    }
}

// The API key stays out of debug output.
impl fmt::Debug for DataApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataApiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("data_source", &self.data_source)
            .field("database", &self.database)
            .finish()
    }
}

/// Builder for [`DataApiConfig`].
#[derive(Debug, Clone, Default)]
pub struct DataApiConfigBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    data_source: Option<String>,
    database: Option<String>,
}

impl DataApiConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Validates that every field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`DataApiError::Configuration`] for the first missing field.
    pub fn build(self) -> DataApiResult<DataApiConfig> {
        fn required(value: Option<String>, field: &str) -> DataApiResult<String> {
            match value {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(DataApiError::Configuration(format!("{field} is required"))),
            }
        }

        Ok(DataApiConfig {
            endpoint: required(self.endpoint, "endpoint")?,
            api_key: required(self.api_key, "api_key")?,
            data_source: required(self.data_source, "data_source")?,
            database: required(self.database, "database")?,
        })
    }
}
