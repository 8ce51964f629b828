//! Paged, batch-sized deletion of every document in a collection.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::{
    validation::{validate_collection_name, validate_page_size},
    PageRequest,
    Result,
    SharedStore,
    WriteBatch,
};

/// Counters describing one completed purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeStats {
    /// Listing calls issued, the final empty or short page included
    pub pages_fetched:     usize,
    /// Batches committed
    pub batches_committed: usize,
    /// Documents deleted across all batches
    pub documents_deleted: u64,
}

/// Empties collections one page at a time.
///
/// Each sweep lists up to `page_size` documents and deletes all of them in a
/// single atomic batch, so no request ever exceeds the store's batch limit.
///
/// # Termination
///
/// - An empty page ends the purge.
/// - A page shorter than `page_size` was the remainder of the collection; the
///   purge ends after deleting it, without another fetch.
/// - A full page proves nothing, so one more fetch always follows it.
///
/// Pages are processed strictly in sequence: page N+1 is only requested once
/// the deletions of page N have committed, because listings are not isolated
/// from the purge's own deletes.
///
/// Writers inserting into the collection while it is being purged can leave
/// documents behind. Nothing guards against that.
#[derive(Clone)]
pub struct CollectionPurger {
    store: SharedStore,
}

impl CollectionPurger {
    /// Creates a purger working against `store`.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
        }
    }

    /// Deletes every document in `collection`, `page_size` documents per batch.
    ///
    /// Fails fast with [`crate::StoreError::InvalidPageSize`] when `page_size`
    /// is zero or above [`crate::MAX_BATCH_SIZE`]. A failed listing or batch
    /// commit aborts the purge and is returned unchanged: the pages committed
    /// before it stay deleted, the failing page and everything after it remain.
    /// Running the purge again simply continues with what is left.
    pub async fn purge(&self, collection: &str, page_size: usize) -> Result<PurgeStats> {
        let mut stats = PurgeStats::default();
        self.purge_into(collection, page_size, &mut stats).await?;
        Ok(stats)
    }

    /// Same as [`Self::purge`], but counts into `stats` as it goes, so the
    /// work done before a failure is still visible to the caller.
    pub async fn purge_into(&self, collection: &str, page_size: usize, stats: &mut PurgeStats) -> Result<()> {
        validate_page_size(page_size)?;
        validate_collection_name(collection)?;
        debug!(
            "Purging collection '{}' with page size {}",
            collection, page_size
        );

        loop {
            let page = self
                .store
                .list_documents(collection, PageRequest::first(page_size))
                .await
                .map_err(|e| {
                    error!("Failed to fetch page from collection '{}': {}", collection, e);
                    e
                })?;
            stats.pages_fetched = stats.pages_fetched.saturating_add(1);
            let fetched = page.len();
            if fetched == 0 {
                trace!("Collection '{}' is empty", collection);
                break;
            }

            let mut batch = WriteBatch::new(collection);
            for doc in page {
                batch.delete(doc.id);
            }
            self.store.commit_batch(batch).await.map_err(|e| {
                error!(
                    "Failed to commit delete batch {} on collection '{}': {}",
                    stats.batches_committed.saturating_add(1),
                    collection,
                    e
                );
                e
            })?;
            stats.batches_committed = stats.batches_committed.saturating_add(1);
            stats.documents_deleted = stats.documents_deleted.saturating_add(fetched as u64);
            trace!(
                "Deleted {} documents from '{}' ({} so far)",
                fetched,
                collection,
                stats.documents_deleted
            );

            if fetched < page_size {
                break;
            }
        }

        info!(
            "Purged collection '{}': {} documents in {} batches",
            collection, stats.documents_deleted, stats.batches_committed
        );
        Ok(())
    }
}

impl std::fmt::Debug for CollectionPurger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("CollectionPurger").finish_non_exhaustive() }
}
