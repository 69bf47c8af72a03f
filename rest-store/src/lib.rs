//! # Pantry REST Store
//!
//! [`DocumentStore`](pantry_core::DocumentStore) implementation for JSON
//! document stores addressed Firebase-style: each collection lives at
//! `{base}/{collection}.json` and each document at
//! `{base}/{collection}/{key}.json`.
//!
//! ## Example
//!
//! ```no_run
//! use pantry_core::document_store::{DocumentStore, Query};
//! use pantry_rest_store::RestDocumentStore;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = RestDocumentStore::with_timeout(
//!         "https://pantry-demo.firebaseio.com",
//!         Duration::from_secs(10),
//!     )?;
//!
//!     let salt = store
//!         .query("ingredients".into(), Query::all().order_by("title").equal_to("Salt"))
//!         .await?;
//!
//!     println!("{} matching documents", salt.len());
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::RestDocumentStore;
