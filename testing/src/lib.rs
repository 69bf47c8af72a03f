//! # Pantry Testing
//!
//! Testing utilities and helpers for the Pantry reducer architecture.
//!
//! This crate provides:
//! - [`InMemoryDocumentStore`]: a `DocumentStore` double with failure injection
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - Effect assertion helpers
//! - [`test_tracing`]: opt-in log output for failing tests
//!
//! ## Example
//!
//! ```ignore
//! use pantry_testing::InMemoryDocumentStore;
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_add_flow() {
//!     let remote = InMemoryDocumentStore::new();
//!     let app = IngredientsApp::new(Arc::new(remote.clone()), "ingredients");
//!
//!     app.add_ingredient(NewIngredient::new("Salt", 1.0)).await?;
//!     assert_eq!(remote.len("ingredients"), 1);
//! }
//! ```

/// In-memory document store
pub mod document_mocks;


// Re-export commonly used items
pub use document_mocks::{InMemoryDocumentStore, RecordedCall};
pub use reducer_test::{assertions, ReducerTest};

/// Install a test-friendly tracing subscriber
///
/// Honors `RUST_LOG`; output is captured by the test harness. Safe to call
/// from every test, only the first call installs the subscriber.
pub fn test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
