use thiserror::Error;

/// Error type for every operation against a StudyHub document store.
///
/// Variants mirror the failure classes a managed document database reports:
/// local I/O and serialization problems, validation failures raised before any
/// round-trip, and remote failures (network, throttling, permissions, quota).
/// Only the remote failures listed by [`StoreError::is_transient`] are worth
/// retrying.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operations failed (file system backed stores)
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Invalid collection name format
    #[error("Invalid collection name: {name}")]
    InvalidCollectionName {
        name: String,
    },

    /// Invalid document ID format
    #[error("Invalid document ID: {id}")]
    InvalidDocumentId {
        id: String,
    },

    /// Page size outside the accepted range
    #[error("Invalid page size {page_size}: must be between 1 and {max}")]
    InvalidPageSize {
        page_size: usize,
        max:       usize,
    },

    /// Document not found in collection
    #[error("Document '{id}' not found in collection '{collection}'")]
    DocumentNotFound {
        id:         String,
        collection: String,
    },

    /// An atomic batch could not be applied; none of its operations took effect
    #[error("Batch commit on collection '{collection}' failed: {reason}")]
    BatchCommitFailed {
        collection: String,
        reason:     String,
    },

    /// The store could not be reached or the connection dropped
    #[error("Network error: {reason}")]
    Network {
        reason: String,
    },

    /// The store asked the client to slow down
    #[error("Request throttled: {reason}")]
    Throttled {
        reason: String,
    },

    /// The caller is not allowed to perform the operation
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        reason: String,
    },

    /// The project ran out of quota
    #[error("Quota exceeded: {reason}")]
    QuotaExceeded {
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Generic error for unexpected conditions
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl StoreError {
    /// Returns `true` for failures that may succeed when the same call is
    /// issued again after a pause.
    pub const fn is_transient(&self) -> bool { matches!(self, Self::Network { .. } | Self::Throttled { .. }) }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
