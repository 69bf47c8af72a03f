//! Environment-based configuration
//!
//! | Variable | Default | |
//! |----------|---------|-|
//! | `PANTRY_STORE_URL` | (required) | Base URL of the document store |
//! | `PANTRY_COLLECTION` | `ingredients` | Collection holding the ingredients |
//! | `PANTRY_REQUEST_TIMEOUT_SECS` | `10` | Per-request timeout, > 0 |
//! | `PANTRY_BROADCAST_CAPACITY` | `16` | Buffered actions per observer, > 0 |
//!
//! # Example
//!
//! ```no_run
//! use pantry_ingredients::config::PantryConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PantryConfig::from_env()?;
//! println!("Store: {}/{}.json", config.store_url, config.collection);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Base URL of the document store
pub const STORE_URL_VAR: &str = "PANTRY_STORE_URL";
/// Collection name
pub const COLLECTION_VAR: &str = "PANTRY_COLLECTION";
/// Request timeout in seconds
pub const REQUEST_TIMEOUT_VAR: &str = "PANTRY_REQUEST_TIMEOUT_SECS";
/// Action broadcast capacity
pub const BROADCAST_CAPACITY_VAR: &str = "PANTRY_BROADCAST_CAPACITY";

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// A variable holds a value that cannot be used
    #[error("Invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable or field name
        key: String,
        /// Offending value
        value: String,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryConfig {
    /// Base URL of the document store, without trailing slash
    pub store_url: String,
    /// Collection holding the ingredients
    pub collection: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Buffered actions per observer
    pub broadcast_capacity: usize,
}

impl PantryConfig {
    /// Default collection name
    pub const DEFAULT_COLLECTION: &'static str = "ingredients";
    /// Default request timeout
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default broadcast capacity
    pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

    /// Configuration for `store_url` with defaults for everything else
    #[must_use]
    pub fn new(store_url: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into().trim_end_matches('/').to_string(),
            collection: Self::DEFAULT_COLLECTION.to_string(),
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            broadcast_capacity: Self::DEFAULT_BROADCAST_CAPACITY,
        }
    }

    /// Set the collection name
    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the broadcast capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PANTRY_STORE_URL` is missing or any value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store URL is missing or any value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_url =
            lookup(STORE_URL_VAR).ok_or_else(|| ConfigError::EnvVarNotSet(STORE_URL_VAR.to_string()))?;
        let mut config = Self::new(store_url);

        if let Some(collection) = lookup(COLLECTION_VAR) {
            config.collection = collection;
        }
        if let Some(secs) = lookup(REQUEST_TIMEOUT_VAR) {
            config.request_timeout = Duration::from_secs(parse_number(REQUEST_TIMEOUT_VAR, &secs)?);
        }
        if let Some(capacity) = lookup(BROADCAST_CAPACITY_VAR) {
            config.broadcast_capacity = parse_number(BROADCAST_CAPACITY_VAR, &capacity)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty or non-HTTP store URL,
    /// an empty or path-like collection, a zero timeout, or a zero capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        };

        if !(self.store_url.starts_with("http://") || self.store_url.starts_with("https://")) {
            return Err(invalid(STORE_URL_VAR, self.store_url.clone()));
        }
        if self.collection.is_empty() || self.collection.contains('/') {
            return Err(invalid(COLLECTION_VAR, self.collection.clone()));
        }
        if self.request_timeout.is_zero() {
            return Err(invalid(REQUEST_TIMEOUT_VAR, "0".to_string()));
        }
        if self.broadcast_capacity == 0 {
            return Err(invalid(BROADCAST_CAPACITY_VAR, "0".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
