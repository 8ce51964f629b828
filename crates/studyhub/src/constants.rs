//! Constants for special names and limits used throughout the store toolkit.
//!
//! This module centralizes all special names to prevent typos and ensure consistency.

/// Directory name for storing collection data within a filesystem store.
pub const DATA_DIR: &str = "data";

/// File extension for document files.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Directory used to stage deletions while a batch is being committed.
pub const BATCH_STAGING_DIR: &str = ".batch";

/// Largest number of operations a single atomic batch may carry.
pub const MAX_BATCH_SIZE: usize = 500;

/// Default number of documents fetched and deleted per purge sweep.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Identifier shared by every placeholder document.
pub const PLACEHOLDER_ID: &str = "placeholder";

/// Collection holding user records (push tokens live here).
pub const USERS_COLLECTION: &str = "users";
