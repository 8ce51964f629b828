use clap::Args;
use studyhub_store::{PageRequest, StoreClient};
use tracing::{error, info};

use super::{open_store, StoreOptions};

/// Arguments for the list command.
#[derive(Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub store:      StoreOptions,
    /// List the document ids of this collection instead of the collections
    #[arg(short, long)]
    pub collection: Option<String>,
}

/// List the collections of a StudyHub store, or the documents of one of them.
///
/// Without `--collection` the names of the collections that currently hold
/// documents are printed one per line. With it, every document id of that
/// collection is printed, walking the collection page by page.
///
/// # Returns
/// Returns `Ok(())` on success, or a `StoreError` on failure.
pub async fn run(args: ListArgs) -> studyhub_store::Result<()> {
    let config = args.store.load_config().await?;
    let store = open_store(&args.store.store_path, config.retry.clone()).await?;

    let lines = list_entries(&*store, args.collection.as_deref(), config.page_size)
        .await
        .map_err(|e| {
            error!("Failed to list store {}: {}", args.store.store_path, e);
            e
        })?;

    info!("Found {} entries", lines.len());
    for line in lines {
        #[allow(clippy::print_stdout, reason = "CLI output")]
        {
            println!("{}", line);
        }
    }
    Ok(())
}

/// The collection names, or the document ids of `collection` when given.
async fn list_entries(
    store: &dyn StoreClient,
    collection: Option<&str>,
    page_size: usize,
) -> studyhub_store::Result<Vec<String>> {
    match collection {
        Some(collection) => {
            info!("Listing documents in collection '{}'", collection);
            document_ids(store, collection, page_size).await
        },
        None => {
            info!("Listing collections");
            store.list_collections().await
        },
    }
}

/// Every document id of `collection` in id order, fetched `page_size` at a time.
async fn document_ids(store: &dyn StoreClient, collection: &str, page_size: usize) -> studyhub_store::Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut request = PageRequest::first(page_size);
    loop {
        let page = store.list_documents(collection, request).await?;
        let Some(last) = page.last()
        else {
            break;
        };
        request = PageRequest::after(page_size, last.id());
        let full = page.len() == page_size;
        ids.extend(page.into_iter().map(|doc| doc.id));
        if !full {
            break;
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use studyhub_store::{FsStore, WriteBatch, DEFAULT_PAGE_SIZE};
    use tempfile::TempDir;

    use super::*;

    async fn store_with(collection: &str, count: usize) -> (FsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path().join("test_store")).await.unwrap();
        let mut batch = WriteBatch::new(collection);
        for n in 0 .. count {
            batch.set(format!("act-{:04}", n), json!({"n": n}));
        }
        store.commit_batch(batch).await.unwrap();
        (store, temp_dir)
    }

    /// Test listing collections of a populated store.
    #[tokio::test]
    async fn test_list_collections() {
        let (store, _temp_dir) = store_with("users", 1).await;
        store
            .set_document("tests", "quiz", json!({"title": "Quiz"}))
            .await
            .unwrap();

        let names = list_entries(&store, None, DEFAULT_PAGE_SIZE).await.unwrap();
        assert_eq!(names, vec!["tests", "users"]);
    }

    /// Test walking a collection larger than one page.
    #[tokio::test]
    async fn test_list_documents_across_pages() {
        let (store, _temp_dir) = store_with("activities", 250).await;

        let ids = list_entries(&store, Some("activities"), 100).await.unwrap();

        assert_eq!(ids.len(), 250);
        assert_eq!(ids.first().map(String::as_str), Some("act-0000"));
        assert_eq!(ids.last().map(String::as_str), Some("act-0249"));
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids should be unique and ordered");
    }

    /// Test a collection whose size is an exact multiple of the page size.
    #[tokio::test]
    async fn test_list_documents_exact_pages() {
        let (store, _temp_dir) = store_with("activities", 200).await;

        let ids = document_ids(&store, "activities", 100).await.unwrap();
        assert_eq!(ids.len(), 200);
    }

    /// Test the command end to end, including a configuration file.
    #[tokio::test]
    async fn test_list_command() {
        let (_store, temp_dir) = store_with("users", 3).await;
        let config_path = temp_dir.path().join("list.json");
        tokio::fs::write(&config_path, r#"{"page_size": 2}"#).await.unwrap();

        let args = ListArgs {
            store:      StoreOptions {
                store_path: temp_dir.path().join("test_store").to_string_lossy().to_string(),
                config:     Some(config_path.to_string_lossy().to_string()),
                page_size:  None,
            },
            collection: Some("users".to_string()),
        };
        assert!(run(args).await.is_ok());
    }

    /// Test listing a collection that does not exist, or has an invalid name.
    #[tokio::test]
    async fn test_list_missing_collection() {
        let (store, _temp_dir) = store_with("users", 1).await;

        let ids = list_entries(&store, Some("nonexistent"), DEFAULT_PAGE_SIZE).await.unwrap();
        assert!(ids.is_empty());

        assert!(list_entries(&store, Some("../escape"), DEFAULT_PAGE_SIZE).await.is_err());
    }
}
