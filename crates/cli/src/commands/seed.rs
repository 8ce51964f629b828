use clap::Args;
use studyhub_store::{SampleDataSeeder, SeedData};
use tracing::{error, info};

use super::{open_store, StoreOptions};

/// Arguments for the seed command.
#[derive(Args, Clone)]
pub struct SeedArgs {
    #[command(flatten)]
    pub store: StoreOptions,
    /// JSON dataset to load instead of the built-in sample data
    #[arg(short, long)]
    pub file:  Option<String>,
}

/// Load sample data into a store.
pub async fn run(args: SeedArgs) -> studyhub_store::Result<()> {
    let config = args.store.load_config().await?;
    let data = match args.file {
        Some(ref path) => {
            info!("Loading seed data from {}", path);
            SeedData::from_file(path).await?
        },
        None => SeedData::builtin(),
    };

    let store = open_store(&args.store.store_path, config.retry.clone()).await?;
    let report = SampleDataSeeder::new(store)
        .seed(&data, config.page_size)
        .await
        .map_err(|e| {
            error!("Failed to seed store {}: {}", args.store.store_path, e);
            e
        })?;

    for (collection, count) in &report.documents_written {
        info!("Seeded {} documents into '{}'", count, collection);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use studyhub_store::{FsStore, StoreClient as _};
    use tempfile::TempDir;

    use super::*;

    fn options(store_path: &std::path::Path) -> StoreOptions {
        StoreOptions {
            store_path: store_path.to_string_lossy().to_string(),
            config:     None,
            page_size:  None,
        }
    }

    /// Test seeding the built-in dataset.
    #[tokio::test]
    async fn test_seed_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("test_store");

        let args = SeedArgs {
            store: options(&store_path),
            file:  None,
        };
        run(args).await.unwrap();

        let store = FsStore::new(&store_path).await.unwrap();
        let admin = store.get_document("users", "admin").await.unwrap();
        assert!(admin.is_some());
    }

    /// Test seeding from a dataset file.
    #[tokio::test]
    async fn test_seed_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join("test_store");
        let file_path = temp_dir.path().join("seed.json");
        tokio::fs::write(
            &file_path,
            r#"{"moodEntries": [{"id": "mood-1", "mood": "calm", "intensity": 3}]}"#,
        )
        .await
        .unwrap();

        let args = SeedArgs {
            store: options(&store_path),
            file:  Some(file_path.to_string_lossy().to_string()),
        };
        run(args).await.unwrap();

        let store = FsStore::new(&store_path).await.unwrap();
        let mood = store
            .get_document("moodEntries", "mood-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(mood.data()["mood"], "calm");
    }

    /// Test a missing dataset file.
    #[tokio::test]
    async fn test_seed_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let args = SeedArgs {
            store: options(temp_dir.path()),
            file:  Some(temp_dir.path().join("missing.json").to_string_lossy().to_string()),
        };
        assert!(run(args).await.is_err());
    }
}
