use futures::{stream, StreamExt as _};
use tracing::{debug, error, info, warn};

use crate::{
    reset::{ResetReport, ResetStage},
    CollectionPurger,
    PlaceholderSeed,
    PurgeStats,
    ResetConfig,
    Result,
    SharedStore,
};

/// Wipes every collection of a store and writes the placeholder documents back.
///
/// # Steps
///
/// 1. Discovery: list the collections that currently hold documents. Empty
///    collections are invisible to discovery and therefore skipped.
/// 2. Purge every discovered collection with a [`CollectionPurger`].
/// 3. Reseed: write each seed of the known table, whether or not its collection
///    was discovered.
///
/// A failure while purging or reseeding one collection is recorded in the
/// [`ResetReport`] and the remaining collections carry on. Only a failed
/// discovery aborts the reset.
///
/// Collections are purged one after another unless the configured concurrency
/// is above one, in which case up to that many collections are purged at the
/// same time. Pages within a collection are always sequential.
#[derive(Clone)]
pub struct DatabaseReset {
    store:       SharedStore,
    purger:      CollectionPurger,
    page_size:   usize,
    concurrency: usize,
}

impl DatabaseReset {
    /// Creates an orchestrator for `store` using the page size and concurrency
    /// of `config`. Retries are the caller's concern: wrap the store in a
    /// [`crate::RetryingStore`] before handing it over.
    pub fn new(store: SharedStore, config: &ResetConfig) -> Self {
        Self {
            purger: CollectionPurger::new(store.clone()),
            store,
            page_size: config.page_size,
            concurrency: config.concurrency.max(1),
        }
    }

    /// Runs discovery, purge and reseed, returning what happened.
    pub async fn reset_all(&self, known: &[PlaceholderSeed]) -> Result<ResetReport> {
        let mut report = ResetReport::begin();

        let discovered = self.store.list_collections().await.map_err(|e| {
            error!("Collection discovery failed, nothing was reset: {}", e);
            e
        })?;
        info!("Discovered {} collections to purge", discovered.len());
        report.collections_discovered = discovered.clone();

        for (collection, stats, outcome) in self.purge_all(discovered).await {
            report.documents_deleted = report.documents_deleted.saturating_add(stats.documents_deleted);
            match outcome {
                Ok(()) => {
                    report.collections_purged.push(collection);
                },
                Err(e) => {
                    warn!("Purge of collection '{}' failed: {}", collection, e);
                    report.record_failure(&collection, ResetStage::Purge, e.to_string());
                },
            }
        }

        for seed in known {
            match self
                .store
                .set_document(&seed.collection, &seed.id, seed.data.clone())
                .await
            {
                Ok(()) => {
                    debug!(
                        "Placeholder '{}' written to '{}'",
                        seed.id, seed.collection
                    );
                    report.collections_reseeded.push(seed.collection.clone());
                },
                Err(e) => {
                    warn!("Reseed of collection '{}' failed: {}", seed.collection, e);
                    report.record_failure(&seed.collection, ResetStage::Reseed, e.to_string());
                },
            }
        }

        report.finish();
        info!(
            "Reset finished: {} collections purged, {} documents deleted, {} reseeded, {} failures",
            report.collections_purged.len(),
            report.documents_deleted,
            report.collections_reseeded.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Purges `collections`, at most `concurrency` at a time, returning the
    /// outcomes in input order. The stats of a failed purge count the pages it
    /// deleted before failing.
    async fn purge_all(&self, collections: Vec<String>) -> Vec<(String, PurgeStats, Result<()>)> {
        let page_size = self.page_size;
        stream::iter(collections)
            .map(|collection| {
                let purger = self.purger.clone();
                async move {
                    info!("Purging collection '{}'", collection);
                    let mut stats = PurgeStats::default();
                    let outcome = purger.purge_into(&collection, page_size, &mut stats).await;
                    (collection, stats, outcome)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

impl std::fmt::Debug for DatabaseReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseReset")
            .field("page_size", &self.page_size)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}
