use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of a reset in which a collection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetStage {
    /// Deleting the collection's documents
    Purge,
    /// Writing the collection's placeholder document
    Reseed,
}

/// One recorded failure. Failures never stop the remaining collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFailure {
    pub collection: String,
    pub stage:      ResetStage,
    pub message:    String,
}

/// Outcome of a full database reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub started_at:             DateTime<Utc>,
    pub finished_at:            DateTime<Utc>,
    /// Collections returned by discovery, in processing order
    pub collections_discovered: Vec<String>,
    /// Collections whose purge completed
    pub collections_purged:     Vec<String>,
    /// Documents deleted across all purges, including the pages a failed
    /// purge deleted before it stopped
    pub documents_deleted:      u64,
    /// Collections whose placeholder was written
    pub collections_reseeded:   Vec<String>,
    pub failures:               Vec<CollectionFailure>,
}

impl ResetReport {
    /// An empty report stamped with the current time.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at:             now,
            finished_at:            now,
            collections_discovered: Vec::new(),
            collections_purged:     Vec::new(),
            documents_deleted:      0,
            collections_reseeded:   Vec::new(),
            failures:               Vec::new(),
        }
    }

    /// Records a failure for `collection`.
    pub fn record_failure(&mut self, collection: &str, stage: ResetStage, message: impl Into<String>) {
        self.failures.push(CollectionFailure {
            collection: collection.to_owned(),
            stage,
            message: message.into(),
        });
    }

    /// Stamps the finish time.
    pub fn finish(&mut self) { self.finished_at = Utc::now(); }

    /// `true` when nothing failed.
    pub const fn is_success(&self) -> bool { self.failures.is_empty() }

    /// Failures recorded for `collection`.
    pub fn failures_for<'a>(&'a self, collection: &'a str) -> impl Iterator<Item = &'a CollectionFailure> + 'a {
        self.failures
            .iter()
            .filter(move |failure| failure.collection == collection)
    }
}
