use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::TryStreamExt as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs as tokio_fs;
use tracing::{debug, error, trace, warn};

use crate::{
    client::generate_document_id,
    streaming::{has_documents, stream_document_ids},
    validation::{validate_collection_name, validate_document_id},
    Document,
    PageRequest,
    Result,
    StoreClient,
    StoreError,
    WriteBatch,
    DATA_DIR,
    DOCUMENT_EXTENSION,
};

/// On-disk envelope of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredDocument {
    pub id:         String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data:       Value,
}

/// A document store kept in a directory tree.
///
/// # Layout
///
/// - Root directory (specified at creation)
///   - `data/` subdirectory
///     - one directory per collection (e.g. `users/`, `tests/`)
///       - one pretty-printed `{id}.json` file per document
///
/// A collection directory with no document files is treated as absent, the same
/// way a hosted document database stops listing a collection once its last
/// document is gone.
#[derive(Debug, Clone)]
pub struct FsStore {
    /// The root path of the store.
    root_path: PathBuf,
}

impl FsStore {
    /// Opens the store at `root_path`, creating the directory tree if needed.
    pub async fn new<P>(root_path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        trace!("Opening filesystem store at {:?}", root_path.as_ref());
        let root_path = root_path.as_ref().to_path_buf();
        let data_path = root_path.join(DATA_DIR);
        tokio_fs::create_dir_all(&data_path).await.map_err(|e| {
            error!("Failed to create store data directory {:?}: {}", data_path, e);
            e
        })?;
        debug!("Filesystem store ready at {:?}", root_path);
        Ok(Self {
            root_path,
        })
    }

    /// The root path of the store.
    pub fn root(&self) -> &Path { &self.root_path }

    /// Directory of `collection`.
    pub(crate) fn collection_path(&self, collection: &str) -> PathBuf { self.root_path.join(DATA_DIR).join(collection) }

    /// File of document `id` within `collection`.
    pub(crate) fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_path(collection)
            .join(format!("{}.{}", id, DOCUMENT_EXTENSION))
    }

    /// Reads and decodes a document file, `None` when it does not exist.
    async fn read_document(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>> {
        let path = self.document_path(collection, id);
        match tokio_fs::read_to_string(&path).await {
            Ok(content) => {
                let stored = decode_document(id, &content).map_err(|e| {
                    error!("Document file {:?} is not valid JSON: {}", path, e);
                    e
                })?;
                Ok(Some(stored))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read document file {:?}: {}", path, e);
                Err(e.into())
            },
        }
    }

    /// Serializes the envelope for `id`, keeping the original creation time
    /// when the document is being replaced.
    pub(crate) async fn encode_document(&self, collection: &str, id: &str, data: Value) -> Result<String> {
        let now = Utc::now();
        let created_at = self
            .read_document(collection, id)
            .await?
            .map_or(now, |existing| existing.created_at);
        let stored = StoredDocument {
            id: id.to_owned(),
            created_at,
            updated_at: now,
            data,
        };
        Ok(serde_json::to_string_pretty(&stored)?)
    }
}

/// Decodes a document file.
///
/// Files dropped into a collection by other tools hold the bare payload rather
/// than the envelope; such a payload is taken as the document data as-is.
fn decode_document(id: &str, content: &str) -> serde_json::Result<StoredDocument> {
    let value: Value = serde_json::from_str(content)?;
    if let Ok(stored) = serde_json::from_value::<StoredDocument>(value.clone()) {
        return Ok(stored);
    }
    trace!("Document '{}' has no envelope, reading it as a bare payload", id);
    let now = Utc::now();
    Ok(StoredDocument {
        id:         id.to_owned(),
        created_at: now,
        updated_at: now,
        data:       value,
    })
}

#[async_trait::async_trait]
impl StoreClient for FsStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        trace!("Listing collections");
        let data_path = self.root_path.join(DATA_DIR);
        let mut entries = tokio_fs::read_dir(&data_path).await.map_err(|e| {
            error!("Failed to read data directory {:?}: {}", data_path, e);
            e
        })?;

        let mut collections = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() &&
                let Some(name) = entry.file_name().to_str() &&
                validate_collection_name(name).is_ok() &&
                has_documents(entry.path()).await?
            {
                collections.push(name.to_owned());
            }
        }
        collections.sort();
        debug!("Found {} non-empty collections", collections.len());
        Ok(collections)
    }

    async fn list_documents(&self, collection: &str, page: PageRequest) -> Result<Vec<Document>> {
        validate_collection_name(collection)?;
        let mut ids: Vec<String> = stream_document_ids(self.collection_path(collection))
            .try_collect()
            .await?;
        ids.sort();
        if let Some(ref after) = page.start_after {
            ids.retain(|id| id > after);
        }
        ids.truncate(page.limit);

        let mut documents = Vec::with_capacity(ids.len());
        for id in ids {
            match self.read_document(collection, &id).await {
                Ok(Some(stored)) => documents.push(Document::new(id, stored.data)),
                // A concurrent delete between the listing and the read simply drops the id.
                Ok(None) => {},
                // Unreadable content must not hide the id, or it could never be purged.
                Err(StoreError::Json {
                    source,
                }) => {
                    warn!(
                        "Listing document '{}' of '{}' without data: {}",
                        id, collection, source
                    );
                    documents.push(Document::new(id, Value::Null));
                },
                Err(e) => return Err(e),
            }
        }
        trace!(
            "Listed {} documents from collection '{}'",
            documents.len(),
            collection
        );
        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        validate_collection_name(collection)?;
        validate_document_id(id)?;
        Ok(self
            .read_document(collection, id)
            .await?
            .map(|stored| Document::new(id, stored.data)))
    }

    async fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        validate_collection_name(collection)?;
        validate_document_id(id)?;
        let dir = self.collection_path(collection);
        tokio_fs::create_dir_all(&dir).await?;

        let json = self.encode_document(collection, id, data).await?;
        let tmp_path = dir.join(format!(".{}.{}.tmp", id, DOCUMENT_EXTENSION));
        tokio_fs::write(&tmp_path, &json).await.map_err(|e| {
            error!("Failed to write document {} to {:?}: {}", id, tmp_path, e);
            e
        })?;
        tokio_fs::rename(&tmp_path, self.document_path(collection, id))
            .await
            .map_err(|e| {
                error!("Failed to move document {} into place: {}", id, e);
                e
            })?;
        debug!("Document '{}' written to collection '{}'", id, collection);
        Ok(())
    }

    async fn add_document(&self, collection: &str, data: Value) -> Result<String> {
        let id = generate_document_id();
        self.set_document(collection, &id, data).await?;
        Ok(id)
    }

    async fn commit_batch(&self, batch: WriteBatch) -> Result<()> { super::batch::commit(self, batch).await }
}
