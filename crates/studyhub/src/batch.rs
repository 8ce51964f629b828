use serde_json::Value;

/// A single operation within a write batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Create or replace the document with the given id.
    Set {
        id:   String,
        data: Value,
    },
    /// Remove the document with the given id. Missing documents are ignored.
    Delete {
        id: String,
    },
}

impl BatchOp {
    /// The document id this operation targets.
    pub fn id(&self) -> &str {
        match *self {
            Self::Set {
                ref id, ..
            } |
            Self::Delete {
                ref id,
            } => id,
        }
    }
}

/// Collects write operations against one collection so they can be committed
/// atomically: either every operation takes effect or none does.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    collection: String,
    ops:        Vec<BatchOp>,
}

impl WriteBatch {
    /// Starts an empty batch for `collection`.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ops:        Vec::new(),
        }
    }

    /// Queue a set operation.
    pub fn set(&mut self, id: impl Into<String>, data: Value) -> &mut Self {
        self.ops.push(BatchOp::Set {
            id: id.into(),
            data,
        });
        self
    }

    /// Queue a delete operation.
    pub fn delete(&mut self, id: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Delete {
            id: id.into(),
        });
        self
    }

    /// The collection every operation applies to.
    pub fn collection(&self) -> &str { &self.collection }

    /// The queued operations in insertion order.
    pub fn ops(&self) -> &[BatchOp] { &self.ops }

    /// Number of queued operations.
    pub const fn len(&self) -> usize { self.ops.len() }

    /// Returns `true` when nothing has been queued.
    pub const fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Number of queued deletions.
    pub fn delete_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BatchOp::Delete { .. }))
            .count()
    }

    /// Consumes the batch, returning its operations.
    pub fn into_ops(self) -> Vec<BatchOp> { self.ops }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_batch_keeps_insertion_order() {
        let mut batch = WriteBatch::new("users");
        batch.delete("a").set("b", json!({"x": 1})).delete("c");

        assert_eq!(batch.collection(), "users");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.delete_count(), 2);
        let ids: Vec<_> = batch.ops().iter().map(BatchOp::id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new("tests");
        assert!(batch.is_empty());
        assert_eq!(batch.delete_count(), 0);
        assert!(batch.into_ops().is_empty());
    }
}
