//! In-memory document store for fast, deterministic tests
//!
//! [`InMemoryDocumentStore`] stands in for the remote JSON store:
//! - keys are generated in ascending order, so key order is insertion order
//! - failures can be injected for the next call or for every call
//! - an optional latency keeps calls in flight long enough to race them
//! - every call is recorded for assertions

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use pantry_core::document_store::{DocumentKey, DocumentStore, DocumentStoreError, Query, StoreFuture};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A call observed by [`InMemoryDocumentStore`]
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    /// `append(collection, document)`
    Append {
        /// Target collection
        collection: String,
        /// Document body
        document: serde_json::Value,
    },
    /// `remove(collection, key)`
    Remove {
        /// Target collection
        collection: String,
        /// Removed key
        key: DocumentKey,
    },
    /// `query(collection, query)`
    Query {
        /// Target collection
        collection: String,
        /// Equality filter, if any
        equal_to: Option<String>,
    },
}

#[derive(Debug, Default)]
struct Inner {
    collections: BTreeMap<String, BTreeMap<DocumentKey, serde_json::Value>>,
    next_key: u64,
    fail_next: Option<DocumentStoreError>,
    fail_always: Option<DocumentStoreError>,
    calls: Vec<RecordedCall>,
}

impl Inner {
    fn take_failure(&mut self) -> Option<DocumentStoreError> {
        self.fail_next.take().or_else(|| self.fail_always.clone())
    }
}

/// In-memory document store for tests.
///
/// # Example
///
/// ```
/// use pantry_core::document_store::{DocumentStore, Query};
/// use pantry_testing::InMemoryDocumentStore;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryDocumentStore::new();
/// let key = store.append("ingredients".into(), json!({"title": "Salt", "amount": 1})).await?;
///
/// let docs = store.query("ingredients".into(), Query::all()).await?;
/// assert_eq!(docs[0].0, key);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
    latency: Option<Duration>,
}

impl InMemoryDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before it touches the data
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert a document under a chosen key, bypassing failure injection
    pub fn seed(&self, collection: &str, key: impl Into<DocumentKey>, document: serde_json::Value) {
        self.inner
            .lock()
            .unwrap()
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.into(), document);
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: DocumentStoreError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }

    /// Make every call fail with `error` until [`Self::recover`]
    pub fn fail_always(&self, error: DocumentStoreError) {
        self.inner.lock().unwrap().fail_always = Some(error);
    }

    /// Clear injected failures
    pub fn recover(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = None;
        inner.fail_always = None;
    }

    /// Documents currently stored in `collection`, in key order
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<(DocumentKey, serde_json::Value)> {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of documents in `collection`
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Every call received so far
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn append(&self, collection: String, document: serde_json::Value) -> StoreFuture<'_, DocumentKey> {
        Box::pin(async move {
            self.pause().await;
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(RecordedCall::Append {
                collection: collection.clone(),
                document: document.clone(),
            });
            if let Some(error) = inner.take_failure() {
                return Err(error);
            }

            inner.next_key += 1;
            let key = DocumentKey::new(format!("-K{:012}", inner.next_key));
            inner
                .collections
                .entry(collection)
                .or_default()
                .insert(key.clone(), document);
            Ok(key)
        })
    }

    fn remove(&self, collection: String, key: DocumentKey) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            self.pause().await;
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(RecordedCall::Remove {
                collection: collection.clone(),
                key: key.clone(),
            });
            if let Some(error) = inner.take_failure() {
                return Err(error);
            }

            if key.as_str().is_empty() {
                return Err(DocumentStoreError::InvalidKey(String::new()));
            }
            if let Some(docs) = inner.collections.get_mut(&collection) {
                docs.remove(&key);
            }
            Ok(())
        })
    }

    fn query(
        &self,
        collection: String,
        query: Query,
    ) -> StoreFuture<'_, Vec<(DocumentKey, serde_json::Value)>> {
        Box::pin(async move {
            self.pause().await;
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(RecordedCall::Query {
                collection: collection.clone(),
                equal_to: query.equal_to.clone(),
            });
            if let Some(error) = inner.take_failure() {
                return Err(error);
            }

            Ok(inner
                .collections
                .get(&collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|(_, doc)| query.matches(doc))
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_assigns_ascending_keys() {
        let store = InMemoryDocumentStore::new();

        let first = store.append("c".into(), json!({"title": "a"})).await.unwrap();
        let second = store.append("c".into(), json!({"title": "b"})).await.unwrap();

        assert!(first < second);
        assert_eq!(store.len("c"), 2);
    }

    #[tokio::test]
    async fn test_fail_next_only_fails_once() {
        let store = InMemoryDocumentStore::new();
        store.fail_next(DocumentStoreError::RequestFailed("offline".to_string()));

        assert!(store.append("c".into(), json!({})).await.is_err());
        assert!(store.append("c".into(), json!({})).await.is_ok());
        assert_eq!(store.len("c"), 1);
        assert_eq!(store.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_always_until_recover() {
        let store = InMemoryDocumentStore::new();
        store.fail_always(DocumentStoreError::Status {
            status: 503,
            body: String::new(),
        });

        assert!(store.query("c".into(), Query::all()).await.is_err());
        assert!(store.remove("c".into(), "x".into()).await.is_err());

        store.recover();
        assert!(store.remove("c".into(), "x".into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_query_filters_on_field() {
        let store = InMemoryDocumentStore::new();
        store.seed("c", "k1", json!({"title": "Salt", "amount": 1}));
        store.seed("c", "k2", json!({"title": "Sugar", "amount": 2}));

        let docs = store
            .query("c".into(), Query::all().order_by("title").equal_to("Sugar"))
            .await
            .unwrap();

        assert_eq!(docs, vec![(DocumentKey::new("k2"), json!({"title": "Sugar", "amount": 2}))]);
    }

    #[tokio::test]
    async fn test_remove_rejects_empty_key() {
        let store = InMemoryDocumentStore::new();
        store.seed("c", "k1", json!({"title": "Salt"}));

        let err = store.remove("c".into(), "".into()).await.unwrap_err();

        assert_eq!(err, DocumentStoreError::InvalidKey(String::new()));
        assert_eq!(store.len("c"), 1);
    }
}
