//! Test doubles shared by the unit tests of several modules.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use serde_json::Value;

use crate::{Document, MemoryStore, PageRequest, Result, StoreClient, StoreError, WriteBatch};

/// Failure plan for [`FaultyStore`].
#[derive(Debug, Default)]
struct Faults {
    /// Commits on a collection that fail permanently, keyed by collection,
    /// valued by the 1-based commit number that fails.
    fail_commit_number:   HashMap<String, usize>,
    /// Commits seen so far per collection.
    commits_seen:         HashMap<String, usize>,
    /// Number of upcoming commits that fail with a transient error.
    transient_commits:    usize,
    /// Collections whose `set_document` always fails.
    fail_sets:            Vec<String>,
    /// Whether `list_collections` fails.
    fail_listing:         bool,
    /// Sizes of every committed batch, in order.
    committed_batch_sizes: Vec<usize>,
}

/// Wraps a [`MemoryStore`], counts calls and injects failures on demand.
#[derive(Debug)]
pub struct FaultyStore {
    inner:           Arc<MemoryStore>,
    faults:          Mutex<Faults>,
    page_fetches:    AtomicUsize,
    commit_attempts: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            page_fetches: AtomicUsize::new(0),
            commit_attempts: AtomicUsize::new(0),
        }
    }

    /// Makes the `number`-th commit (1-based) on `collection` fail permanently.
    pub fn fail_commit(&self, collection: &str, number: usize) {
        self.faults
            .lock()
            .unwrap()
            .fail_commit_number
            .insert(collection.to_owned(), number);
    }

    /// Makes the next `count` commits fail with a network error.
    pub fn fail_commits_transiently(&self, count: usize) { self.faults.lock().unwrap().transient_commits = count; }

    /// Makes every placeholder write to `collection` fail.
    pub fn fail_sets(&self, collection: &str) { self.faults.lock().unwrap().fail_sets.push(collection.to_owned()); }

    /// Makes collection discovery fail.
    pub fn fail_listing(&self) { self.faults.lock().unwrap().fail_listing = true; }

    pub fn page_fetches(&self) -> usize { self.page_fetches.load(Ordering::SeqCst) }

    pub fn commit_attempts(&self) -> usize { self.commit_attempts.load(Ordering::SeqCst) }

    pub fn committed_batch_sizes(&self) -> Vec<usize> { self.faults.lock().unwrap().committed_batch_sizes.clone() }

    /// Decides whether the commit about to run on `collection` should fail.
    fn commit_fault(&self, collection: &str) -> Option<StoreError> {
        let mut faults = self.faults.lock().unwrap();
        if faults.transient_commits > 0 {
            faults.transient_commits -= 1;
            return Some(StoreError::Network {
                reason: "connection reset".to_owned(),
            });
        }
        let seen = faults.commits_seen.entry(collection.to_owned()).or_insert(0);
        *seen += 1;
        let seen = *seen;
        if faults.fail_commit_number.get(collection) == Some(&seen) {
            return Some(StoreError::PermissionDenied {
                reason: format!("commit {} on {} rejected", seen, collection),
            });
        }
        None
    }
}

#[async_trait::async_trait]
impl StoreClient for FaultyStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        if self.faults.lock().unwrap().fail_listing {
            return Err(StoreError::Network {
                reason: "listing unavailable".to_owned(),
            });
        }
        self.inner.list_collections().await
    }

    async fn list_documents(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.list_documents(collection, page).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get_document(collection, id).await
    }

    async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        if self.faults.lock().unwrap().fail_sets.iter().any(|c| c == collection) {
            return Err(StoreError::QuotaExceeded {
                reason: format!("writes to {} exhausted", collection),
            });
        }
        self.inner.set_document(collection, id, data).await
    }

    async fn add_document(&self, collection: &str, data: Value) -> Result<String> {
        self.inner.add_document(collection, data).await
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<()> {
        self.commit_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.commit_fault(batch.collection()) {
            return Err(err);
        }
        let size = batch.len();
        self.inner.commit_batch(batch).await?;
        self.faults.lock().unwrap().committed_batch_sizes.push(size);
        Ok(())
    }
}
