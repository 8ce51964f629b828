use clap::Args;
use studyhub_store::CollectionPurger;
use tracing::{error, info};

use super::{open_store, StoreOptions};

/// Arguments for the purge command.
#[derive(Args, Clone)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub store:      StoreOptions,
    /// Collection name
    #[arg(long)]
    pub collection: String,
}

/// Delete every document of a single collection.
///
/// Documents are removed one page at a time, each page in one batch. A failed
/// batch stops the purge; running the command again picks up where it left
/// off.
///
/// # Returns
/// Returns `Ok(())` on success, or a `StoreError` on failure.
pub async fn run(args: PurgeArgs) -> studyhub_store::Result<()> {
    let config = args.store.load_config().await?;
    info!(
        "Purging collection '{}' in store {} with page size {}",
        args.collection, args.store.store_path, config.page_size
    );

    let store = open_store(&args.store.store_path, config.retry.clone()).await?;
    let stats = CollectionPurger::new(store)
        .purge(&args.collection, config.page_size)
        .await
        .map_err(|e| {
            error!(
                "Failed to purge collection '{}' in store {}: {}",
                args.collection, args.store.store_path, e
            );
            e
        })?;

    info!(
        "Collection '{}' purged: {} documents deleted in {} batches ({} pages fetched)",
        args.collection, stats.documents_deleted, stats.batches_committed, stats.pages_fetched
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use studyhub_store::{FsStore, StoreClient as _};
    use tempfile::TempDir;

    use super::*;

    /// Test purging a populated collection leaves the others untouched.
    #[tokio::test]
    async fn test_purge_success() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("test_store");

        let store = FsStore::new(&store_path).await.unwrap();
        for n in 0 .. 7 {
            store
                .set_document("activities", &format!("act-{}", n), json!({"n": n}))
                .await
                .unwrap();
        }
        store
            .set_document("users", "alice", json!({"name": "Alice"}))
            .await
            .unwrap();

        let args = PurgeArgs {
            store:      StoreOptions {
                store_path: store_path.to_string_lossy().to_string(),
                config:     None,
                page_size:  Some(3),
            },
            collection: "activities".to_string(),
        };
        run(args).await.unwrap();

        assert_eq!(
            store.list_collections().await.unwrap(),
            vec!["users".to_string()]
        );
    }

    /// Test purging with an invalid collection name.
    #[tokio::test]
    async fn test_purge_invalid_collection() {
        let temp_dir = TempDir::new().unwrap();
        let args = PurgeArgs {
            store:      StoreOptions {
                store_path: temp_dir.path().to_string_lossy().to_string(),
                config:     None,
                page_size:  None,
            },
            collection: "bad/name".to_string(),
        };
        assert!(run(args).await.is_err());
    }
}
