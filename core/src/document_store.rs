//! Remote document store abstraction.
//!
//! A document store is a keyed collection of JSON documents reached over the
//! network. The store assigns keys on insert; clients append, remove by key,
//! and run simple ordered/equality queries. Persistence is entirely the
//! store's concern. This crate only describes the seam so reducers can issue
//! calls through an injected `Arc<dyn DocumentStore>`.
//!
//! # Implementations
//!
//! - **`RestDocumentStore`** (production, `pantry-rest-store`): JSON over HTTP
//! - **`InMemoryDocumentStore`** (testing, `pantry-testing`): ordered map with
//!   failure injection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`DocumentStore`] operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DocumentStoreError>> + Send + 'a>>;

/// Server-assigned identifier of a document within a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentKey(String);

impl DocumentKey {
    /// Wrap a key returned by the store
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Query over a collection
///
/// An empty query returns every document. `order_by` names a child field to
/// sort on; `equal_to` restricts results to documents whose `order_by` field
/// equals the given string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Child field to order by
    pub order_by: Option<String>,
    /// Required value of the `order_by` field
    pub equal_to: Option<String>,
}

impl Query {
    /// Query that returns every document in key order
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Order results by a child field
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Restrict results to an exact match on the `order_by` field
    #[must_use]
    pub fn equal_to(mut self, value: impl Into<String>) -> Self {
        self.equal_to = Some(value.into());
        self
    }

    /// Check a document against this query's equality filter
    #[must_use]
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        match (&self.order_by, &self.equal_to) {
            (Some(field), Some(expected)) => document
                .get(field)
                .and_then(serde_json::Value::as_str)
                .is_some_and(|value| value == expected),
            _ => true,
        }
    }
}

/// Errors that can occur while talking to a document store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentStoreError {
    /// The request never produced a response (connection refused, timeout, DNS)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The store answered with a non-success status
    #[error("Store returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// The response body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),

    /// The key cannot address a single document
    #[error("Invalid document key: {0:?}")]
    InvalidKey(String),

    /// The document could not be encoded for sending
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// JSON document collection reachable over the network.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures instead of using `async fn` so the store can
/// be held as `Arc<dyn DocumentStore>` and moved into effects.
pub trait DocumentStore: Send + Sync {
    /// Append a document to `collection`, returning the key the store assigned.
    ///
    /// Not idempotent: appending the same document twice creates two entries.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success status, or an undecodable response.
    fn append(&self, collection: String, document: serde_json::Value) -> StoreFuture<'_, DocumentKey>;

    /// Remove the document stored under `key`.
    ///
    /// Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Transport failures or non-success status.
    fn remove(&self, collection: String, key: DocumentKey) -> StoreFuture<'_, ()>;

    /// Fetch the documents of `collection` matching `query`, in key order.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success status, or an undecodable response.
    fn query(
        &self,
        collection: String,
        query: Query,
    ) -> StoreFuture<'_, Vec<(DocumentKey, serde_json::Value)>>;
}
