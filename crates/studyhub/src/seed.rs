//! Sample data for development stores.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::fs as tokio_fs;
use tracing::{debug, error, info};

use crate::{
    client::generate_document_id,
    validation::validate_page_size,
    Result,
    SharedStore,
    StoreError,
    WriteBatch,
};

/// A dataset keyed by collection name.
///
/// Each entry is a JSON object. An `id` string field, when present, becomes
/// the document id and is removed from the payload; entries without one get
/// a generated id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedData {
    pub collections: BTreeMap<String, Vec<Value>>,
}

impl SeedData {
    /// Loads a dataset from a JSON file.
    pub async fn from_file<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = tokio_fs::read_to_string(path).await.map_err(|e| {
            error!("Failed to read seed file {:?}: {}", path, e);
            e
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// A small dataset covering the main StudyHub collections.
    pub fn builtin() -> Self {
        let mut collections = BTreeMap::new();
        collections.insert(
            "users".to_owned(),
            vec![
                json!({"id": "admin", "name": "Ada Admin", "email": "admin@studyhub.app", "role": "admin", "isAdmin": true}),
                json!({"id": "tutor-1", "name": "Theo Tutor", "email": "theo@studyhub.app", "role": "tutor", "isAdmin": false}),
                json!({"id": "student-1", "name": "Sam Student", "email": "sam@studyhub.app", "role": "student", "isAdmin": false}),
            ],
        );
        collections.insert(
            "tests".to_owned(),
            vec![
                json!({"id": "algebra-quiz", "title": "Algebra Quiz", "subject": "Mathematics", "durationMinutes": 20,
                       "questions": [{"prompt": "2x = 8, x = ?", "answer": "4"}]}),
                json!({"id": "cell-biology", "title": "Cell Biology", "subject": "Biology", "durationMinutes": 30,
                       "questions": [{"prompt": "Powerhouse of the cell?", "answer": "Mitochondria"}]}),
            ],
        );
        collections.insert(
            "textbooks".to_owned(),
            vec![
                json!({"id": "algebra-1", "title": "Algebra I", "author": "StudyHub", "subject": "Mathematics", "chapters": ["Equations", "Functions"]}),
                json!({"id": "biology-basics", "title": "Biology Basics", "author": "StudyHub", "subject": "Biology", "chapters": ["Cells"]}),
            ],
        );
        collections.insert(
            "activities".to_owned(),
            vec![
                json!({"type": "breathing", "userId": "student-1", "durationSeconds": 120}),
                json!({"type": "grounding", "userId": "student-1", "stepsCompleted": 5}),
                json!({"type": "test-attempt", "userId": "student-1", "testId": "algebra-quiz", "score": 1}),
            ],
        );
        Self {
            collections,
        }
    }

    /// Total number of entries across collections.
    pub fn len(&self) -> usize { self.collections.values().map(Vec::len).sum() }

    /// `true` when the dataset holds no entries.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Counters from one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Documents written per collection
    pub documents_written: BTreeMap<String, usize>,
    /// Batches committed
    pub batches_committed: usize,
}

/// Writes a [`SeedData`] set into a store using bounded batches.
#[derive(Clone)]
pub struct SampleDataSeeder {
    store: SharedStore,
}

impl SampleDataSeeder {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
        }
    }

    /// Writes every entry of `data`, at most `page_size` documents per batch.
    /// Stops at the first failed batch.
    pub async fn seed(&self, data: &SeedData, page_size: usize) -> Result<SeedReport> {
        validate_page_size(page_size)?;
        let mut report = SeedReport::default();

        for (collection, entries) in &data.collections {
            debug!("Seeding {} documents into '{}'", entries.len(), collection);
            for chunk in entries.chunks(page_size) {
                let mut batch = WriteBatch::new(collection.as_str());
                for entry in chunk {
                    let (id, payload) = split_id(collection, entry)?;
                    batch.set(id, payload);
                }
                self.store.commit_batch(batch).await?;
                report.batches_committed = report.batches_committed.saturating_add(1);
                let written = report.documents_written.entry(collection.clone()).or_insert(0);
                *written = written.saturating_add(chunk.len());
            }
        }

        info!(
            "Seeded {} documents in {} batches",
            report.documents_written.values().sum::<usize>(),
            report.batches_committed
        );
        Ok(report)
    }
}

impl std::fmt::Debug for SampleDataSeeder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.debug_struct("SampleDataSeeder").finish_non_exhaustive() }
}

/// Separates the document id from an entry's payload.
fn split_id(collection: &str, entry: &Value) -> Result<(String, Value)> {
    let Some(object) = entry.as_object()
    else {
        return Err(StoreError::ConfigError {
            message: format!("seed entry in '{}' is not a JSON object", collection),
        });
    };
    let mut payload: Map<String, Value> = object.clone();
    let id = match payload.remove("id") {
        Some(Value::String(id)) => id,
        Some(other) => {
            return Err(StoreError::ConfigError {
                message: format!("seed entry id in '{}' must be a string, got {}", collection, other),
            });
        },
        None => generate_document_id(),
    };
    Ok((id, Value::Object(payload)))
}
