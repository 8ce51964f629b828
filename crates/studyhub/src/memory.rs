use std::collections::BTreeMap;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::{
    client::generate_document_id,
    validation::{validate_collection_name, validate_document_id},
    BatchOp,
    Document,
    PageRequest,
    Result,
    StoreClient,
    WriteBatch,
};

/// Collections keyed by name, documents keyed by id. `BTreeMap` gives the
/// id ordering that listing calls promise.
type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// An in-process document store.
///
/// Used for tests, benches and dry runs. It behaves like the remote store as
/// far as the [`StoreClient`] contract goes: collections only exist while they
/// hold documents, pages come back in id order and batches are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self { Self::default() }

    /// Inserts `count` documents named `{prefix}-{n:05}` into `collection`.
    pub async fn fill(&self, collection: &str, prefix: &str, count: usize) -> Result<()> {
        validate_collection_name(collection)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();
        for n in 0 .. count {
            docs.insert(
                format!("{}-{:05}", prefix, n),
                serde_json::json!({ "seq": n }),
            );
        }
        debug!("Filled collection '{}' with {} documents", collection, count);
        Ok(())
    }

    /// Number of documents currently held by `collection`.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait::async_trait]
impl StoreClient for MemoryStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        trace!("Listing in-memory collections");
        Ok(self
            .collections
            .read()
            .await
            .iter()
            .filter(|&(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list_documents(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>> {
        validate_collection_name(collection)?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection)
        else {
            return Ok(Vec::new());
        };
        let iter: Box<dyn Iterator<Item = (&String, &Value)> + Send> = match page.start_after {
            Some(ref after) => {
                Box::new(
                    docs.range::<String, _>((
                        std::ops::Bound::Excluded(after),
                        std::ops::Bound::Unbounded,
                    )),
                )
            },
            None => Box::new(docs.iter()),
        };
        Ok(iter
            .take(page.limit)
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect())
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        validate_document_id(id)?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        validate_collection_name(collection)?;
        validate_document_id(id)?;
        self.collections
            .write()
            .await
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
        Ok(())
    }

    async fn add_document(&self, collection: &str, data: Value) -> Result<String> {
        let id = generate_document_id();
        self.set_document(collection, &id, data).await?;
        Ok(id)
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<()> {
        validate_collection_name(batch.collection())?;
        for op in batch.ops() {
            validate_document_id(op.id())?;
        }
        let collection = batch.collection().to_owned();
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.clone()).or_default();
        for op in batch.into_ops() {
            match op {
                BatchOp::Set {
                    id,
                    data,
                } => {
                    docs.insert(id, data);
                },
                BatchOp::Delete {
                    id,
                } => {
                    docs.remove(&id);
                },
            }
        }
        if docs.is_empty() {
            collections.remove(&collection);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_empty_collections_are_not_listed() {
        let store = MemoryStore::new();
        store.fill("users", "u", 2).await.unwrap();

        let mut batch = WriteBatch::new("users");
        batch.delete("u-00000").delete("u-00001");
        store.commit_batch(batch).await.unwrap();

        assert!(store.list_collections().await.unwrap().is_empty());
        assert_eq!(store.document_count("users").await, 0);
    }

    #[tokio::test]
    async fn test_pages_follow_id_order() {
        let store = MemoryStore::new();
        store.fill("tests", "t", 5).await.unwrap();

        let first = store
            .list_documents("tests", PageRequest::first(2))
            .await
            .unwrap();
        let ids: Vec<_> = first.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["t-00000", "t-00001"]);

        let next = store
            .list_documents("tests", PageRequest::after(10, "t-00001"))
            .await
            .unwrap();
        let ids: Vec<_> = next.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["t-00002", "t-00003", "t-00004"]);
    }

    #[tokio::test]
    async fn test_invalid_batch_applies_nothing() {
        let store = MemoryStore::new();
        store.fill("users", "u", 2).await.unwrap();

        let mut batch = WriteBatch::new("users");
        batch.delete("u-00000").delete("bad.id");
        assert!(store.commit_batch(batch).await.is_err());
        assert_eq!(store.document_count("users").await, 2);
    }

    #[tokio::test]
    async fn test_set_get_and_add() {
        let store = MemoryStore::new();
        store
            .set_document("textbooks", "algebra", json!({"title": "Algebra I"}))
            .await
            .unwrap();
        let doc = store
            .get_document("textbooks", "algebra")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.data()["title"], "Algebra I");

        let id = store
            .add_document("textbooks", json!({"title": "Geometry"}))
            .await
            .unwrap();
        assert!(store.get_document("textbooks", &id).await.unwrap().is_some());
        assert!(store.get_document("textbooks", "missing").await.unwrap().is_none());
    }
}
