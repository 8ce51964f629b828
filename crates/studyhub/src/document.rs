use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single record held by a collection.
///
/// The identifier is unique within its collection; the payload is free-form
/// JSON with no schema enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The identifier of the document within its collection.
    pub id:   String,
    /// The JSON payload of the document.
    pub data: Value,
}

impl Document {
    /// Creates a document from an id and payload.
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Returns the document identifier.
    pub fn id(&self) -> &str { &self.id }

    /// Returns the document payload.
    pub const fn data(&self) -> &Value { &self.data }
}

/// Bounds for a single listing call.
///
/// Documents are always returned in ascending id order. `start_after` skips
/// every document whose id is less than or equal to the given id, which lets
/// callers walk a collection page by page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of documents to return.
    pub limit:       usize,
    /// Exclusive lower bound on document ids.
    pub start_after: Option<String>,
}

impl PageRequest {
    /// First page of at most `limit` documents.
    pub const fn first(limit: usize) -> Self {
        Self {
            limit,
            start_after: None,
        }
    }

    /// Page of at most `limit` documents following `id`.
    pub fn after(limit: usize, id: impl Into<String>) -> Self {
        Self {
            limit,
            start_after: Some(id.into()),
        }
    }
}
