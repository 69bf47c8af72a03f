//! HTTP client for the remote document store

use pantry_core::document_store::{DocumentKey, DocumentStore, DocumentStoreError, Query, StoreFuture};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Body returned by a successful append
#[derive(Debug, Deserialize)]
struct AppendResponse {
    name: String,
}

/// Document store reached over HTTP/JSON
#[derive(Clone, Debug)]
pub struct RestDocumentStore {
    client: Client,
    base_url: String,
}

impl RestDocumentStore {
    /// Create a store client for `base_url` with reqwest's default settings
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a store client whose requests give up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns `DocumentStoreError::RequestFailed` if the HTTP client cannot
    /// be built (for example, no TLS backend available).
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DocumentStoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocumentStoreError::RequestFailed(e.to_string()))?;

        Ok(Self::with_client(client, base_url))
    }

    /// Create a store client around an existing `reqwest::Client`
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Base URL requests are issued against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded
    fn url(&self, segments: &[&str]) -> Result<Url, DocumentStoreError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DocumentStoreError::RequestFailed(format!("invalid base URL {}: {e}", self.base_url)))?;

        url.path_segments_mut()
            .map_err(|()| DocumentStoreError::RequestFailed(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn collection_url(&self, collection: &str) -> Result<Url, DocumentStoreError> {
        self.url(&[&format!("{collection}.json")])
    }

    fn document_url(&self, collection: &str, key: &DocumentKey) -> Result<Url, DocumentStoreError> {
        // An empty key would address the whole collection node
        if key.as_str().is_empty() {
            return Err(DocumentStoreError::InvalidKey(key.to_string()));
        }
        self.url(&[collection, &format!("{key}.json")])
    }

    #[tracing::instrument(skip(self, document))]
    async fn append_document(&self, collection: String, document: Value) -> Result<DocumentKey, DocumentStoreError> {
        let response = self
            .client
            .post(self.collection_url(&collection)?)
            .json(&document)
            .send()
            .await
            .map_err(|e| DocumentStoreError::RequestFailed(e.to_string()))?;

        let response = check_status(response).await?;
        let body = response
            .json::<AppendResponse>()
            .await
            .map_err(|e| DocumentStoreError::ResponseParseFailed(e.to_string()))?;

        tracing::debug!(key = %body.name, "Document appended");
        Ok(DocumentKey::new(body.name))
    }

    #[tracing::instrument(skip(self))]
    async fn remove_document(&self, collection: String, key: DocumentKey) -> Result<(), DocumentStoreError> {
        let response = self
            .client
            .delete(self.document_url(&collection, &key)?)
            .send()
            .await
            .map_err(|e| DocumentStoreError::RequestFailed(e.to_string()))?;

        check_status(response).await?;
        tracing::debug!("Document removed");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn query_documents(
        &self,
        collection: String,
        query: Query,
    ) -> Result<Vec<(DocumentKey, Value)>, DocumentStoreError> {
        let mut request = self.client.get(self.collection_url(&collection)?);
        if let (Some(field), Some(value)) = (&query.order_by, &query.equal_to) {
            // The store expects JSON string literals as parameter values
            request = request.query(&[
                ("orderBy", Value::from(field.as_str()).to_string()),
                ("equalTo", Value::from(value.as_str()).to_string()),
            ]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DocumentStoreError::RequestFailed(e.to_string()))?;

        let response = check_status(response).await?;

        // An empty collection comes back as `null`
        let documents = response
            .json::<Option<BTreeMap<String, Value>>>()
            .await
            .map_err(|e| DocumentStoreError::ResponseParseFailed(e.to_string()))?
            .unwrap_or_default();

        tracing::debug!(count = documents.len(), "Documents fetched");
        Ok(documents
            .into_iter()
            .map(|(key, doc)| (DocumentKey::new(key), doc))
            .collect())
    }
}

/// Pass successful responses through, turn anything else into an error
async fn check_status(response: Response) -> Result<Response, DocumentStoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %body, "Document store rejected request");
    Err(DocumentStoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl DocumentStore for RestDocumentStore {
    fn append(&self, collection: String, document: Value) -> StoreFuture<'_, DocumentKey> {
        Box::pin(self.append_document(collection, document))
    }

    fn remove(&self, collection: String, key: DocumentKey) -> StoreFuture<'_, ()> {
        Box::pin(self.remove_document(collection, key))
    }

    fn query(&self, collection: String, query: Query) -> StoreFuture<'_, Vec<(DocumentKey, Value)>> {
        Box::pin(self.query_documents(collection, query))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests can unwrap
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let store = RestDocumentStore::new("https://pantry.example.com/");
        assert_eq!(store.base_url(), "https://pantry.example.com");
    }

    #[test]
    fn test_urls() {
        let store = RestDocumentStore::new("https://pantry.example.com");
        assert_eq!(
            store.collection_url("ingredients").unwrap().as_str(),
            "https://pantry.example.com/ingredients.json"
        );
        assert_eq!(
            store.document_url("ingredients", &DocumentKey::new("-Kabc")).unwrap().as_str(),
            "https://pantry.example.com/ingredients/-Kabc.json"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let store = RestDocumentStore::new("https://pantry.example.com/db/");
        assert_eq!(
            store.collection_url("ingredients").unwrap().as_str(),
            "https://pantry.example.com/db/ingredients.json"
        );
    }

    #[test]
    fn test_key_is_one_escaped_segment() {
        let store = RestDocumentStore::new("https://pantry.example.com");
        assert_eq!(
            store.document_url("ingredients", &DocumentKey::new("a/b?c#d")).unwrap().as_str(),
            "https://pantry.example.com/ingredients/a%2Fb%3Fc%23d.json"
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let store = RestDocumentStore::new("https://pantry.example.com");
        assert_eq!(
            store.document_url("ingredients", &DocumentKey::new("")),
            Err(DocumentStoreError::InvalidKey(String::new()))
        );
    }

    #[test]
    fn test_unparseable_base_url_fails_the_request() {
        let store = RestDocumentStore::new("not a url");
        assert!(matches!(
            store.collection_url("ingredients"),
            Err(DocumentStoreError::RequestFailed(_))
        ));
    }
}
