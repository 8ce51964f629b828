//! The store client seam.
//!
//! Everything that talks to a document database goes through [`StoreClient`].
//! Callers receive the client as an injected `Arc<dyn StoreClient>` rather than
//! reaching for a process-wide handle, which is what lets the purge and reset
//! logic run unchanged against the filesystem store, the in-memory store or a
//! fault-injecting test double.

use std::sync::Arc;

use serde_json::Value;

use crate::{Document, PageRequest, Result, WriteBatch};

/// Operations consumed from a paginated, batch-capable document store.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Names of the top-level collections that currently hold at least one
    /// document. Empty collections are not reported.
    async fn list_collections(&self) -> Result<Vec<String>>;

    /// One page of documents from `collection`, ordered by id.
    async fn list_documents(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>>;

    /// Fetch a single document.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Create or replace the document `id`.
    async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Create a document under a store-assigned id and return that id.
    async fn add_document(&self, collection: &str, data: Value) -> Result<String>;

    /// Apply every operation of `batch` or none of them.
    async fn commit_batch(&self, batch: WriteBatch) -> Result<()>;
}

/// Shared handle to a store client.
pub type SharedStore = Arc<dyn StoreClient>;

/// Generates a collision-resistant document id.
pub fn generate_document_id() -> String { cuid2::create_id() }
