//! Maintenance toolkit for the StudyHub document store.
//!
//! The crate talks to a document database exclusively through the
//! [`StoreClient`] trait and builds the maintenance operations on top of it:
//!
//! - [`CollectionPurger`] empties a collection in batch-sized pages.
//! - [`DatabaseReset`] purges every discovered collection and writes the
//!   [`PlaceholderSeed`] documents back.
//! - [`SampleDataSeeder`] loads development datasets.
//! - [`RetryingStore`] adds bounded exponential backoff to any client.
//!
//! Two clients ship with the crate: [`FsStore`], a directory-backed store, and
//! [`MemoryStore`], an in-process store for tests and dry runs.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use studyhub_store::{default_placeholders, DatabaseReset, FsStore, ResetConfig, RetryingStore};
//!
//! # async fn example() -> studyhub_store::Result<()> {
//! let config = ResetConfig::default();
//! let store = FsStore::new("/var/lib/studyhub").await?;
//! let store = Arc::new(RetryingStore::new(store, config.retry.clone()));
//!
//! let report = DatabaseReset::new(store, &config)
//!     .reset_all(&default_placeholders())
//!     .await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod filesystem;
pub mod memory;
pub mod placeholders;
pub mod purge;
pub mod reset;
pub mod retry;
pub mod seed;
pub mod streaming;
pub mod validation;

#[cfg(test)]
mod testing;

pub use batch::{BatchOp, WriteBatch};
pub use client::{SharedStore, StoreClient};
pub use config::ResetConfig;
pub use constants::*;
pub use document::{Document, PageRequest};
pub use error::{Result, StoreError};
pub use filesystem::FsStore;
pub use memory::MemoryStore;
pub use placeholders::{default_placeholders, PlaceholderSeed};
pub use purge::{CollectionPurger, PurgeStats};
pub use reset::{CollectionFailure, DatabaseReset, ResetReport, ResetStage};
pub use retry::{RetryPolicy, RetryingStore};
pub use seed::{SampleDataSeeder, SeedData, SeedReport};
