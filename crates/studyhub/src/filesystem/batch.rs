//! Atomic batch commits on top of plain file renames.
//!
//! Every change is applied through the per-batch staging directory and
//! recorded in an undo log. If any step fails the log is replayed backwards,
//! so the collection ends up exactly as it was before the commit started.

use std::path::{Path, PathBuf};

use tokio::fs as tokio_fs;
use tracing::{debug, error, warn};

use crate::{
    validation::{validate_collection_name, validate_document_id},
    BatchOp,
    Result,
    StoreError,
    WriteBatch,
    BATCH_STAGING_DIR,
};
use super::store::FsStore;

/// How to revert one applied step.
enum Undo {
    /// A file was moved aside; move it back.
    Restore {
        backup: PathBuf,
        target: PathBuf,
    },
    /// A file was created where none existed; remove it.
    Remove {
        target: PathBuf,
    },
}

/// Commits `batch` against `store`.
pub(super) async fn commit(store: &FsStore, batch: WriteBatch) -> Result<()> {
    let collection = batch.collection().to_owned();
    validate_collection_name(&collection)?;
    for op in batch.ops() {
        validate_document_id(op.id())?;
    }
    if batch.is_empty() {
        return Ok(());
    }

    let size = batch.len();
    let staging = store
        .collection_path(&collection)
        .join(BATCH_STAGING_DIR)
        .join(crate::client::generate_document_id());
    tokio_fs::create_dir_all(&staging).await.map_err(|e| {
        error!("Failed to prepare batch staging area {:?}: {}", staging, e);
        StoreError::BatchCommitFailed {
            collection: collection.clone(),
            reason:     e.to_string(),
        }
    })?;

    let mut undo = Vec::with_capacity(size);
    let outcome = apply(store, &collection, &staging, batch, &mut undo).await;

    if let Err(ref e) = outcome {
        warn!(
            "Batch on collection '{}' failed after {} of {} steps, rolling back: {}",
            collection,
            undo.len(),
            size,
            e
        );
        rollback(undo).await;
    }
    if let Err(e) = tokio_fs::remove_dir_all(&staging).await {
        warn!("Failed to clean batch staging area {:?}: {}", staging, e);
    }

    outcome.map_err(|e| {
        StoreError::BatchCommitFailed {
            collection: collection.clone(),
            reason:     e.to_string(),
        }
    })?;
    debug!("Committed batch of {} operations on '{}'", size, collection);
    Ok(())
}

/// Applies each operation in order, recording how to undo it.
async fn apply(
    store: &FsStore,
    collection: &str,
    staging: &Path,
    batch: WriteBatch,
    undo: &mut Vec<Undo>,
) -> std::io::Result<()> {
    for (index, op) in batch.into_ops().into_iter().enumerate() {
        let target = store.document_path(collection, op.id());
        // Encode before moving the old file aside so replacements keep their creation time.
        let fresh = match op {
            BatchOp::Set {
                id,
                data,
            } => {
                let json = store
                    .encode_document(collection, &id, data)
                    .await
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                let fresh = staging.join(format!("{}.new", index));
                tokio_fs::write(&fresh, json).await?;
                Some(fresh)
            },
            BatchOp::Delete {
                ..
            } => None,
        };

        let backup = staging.join(format!("{}.bak", index));
        let existed = move_aside(&target, &backup).await?;
        if existed {
            undo.push(Undo::Restore {
                backup,
                target: target.clone(),
            });
        }

        if let Some(fresh) = fresh {
            tokio_fs::rename(&fresh, &target).await?;
            if !existed {
                undo.push(Undo::Remove {
                    target,
                });
            }
        }
    }
    Ok(())
}

/// Moves `target` to `backup`. Returns `false` when there was nothing to move.
async fn move_aside(target: &Path, backup: &Path) -> std::io::Result<bool> {
    match tokio_fs::rename(target, backup).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reverts applied steps, newest first.
async fn rollback(undo: Vec<Undo>) {
    for step in undo.into_iter().rev() {
        let result = match step {
            Undo::Restore {
                ref backup,
                ref target,
            } => tokio_fs::rename(backup, target).await,
            Undo::Remove {
                ref target,
            } => tokio_fs::remove_file(target).await,
        };
        if let Err(e) = result {
            error!("Batch rollback step failed: {}", e);
        }
    }
}
