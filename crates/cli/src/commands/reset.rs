use clap::Args;
use studyhub_store::{default_placeholders, DatabaseReset, StoreError};
use tracing::{error, info, warn};

use super::{open_store, StoreOptions};

/// Arguments for the reset command.
#[derive(Args, Clone)]
pub struct ResetArgs {
    #[command(flatten)]
    pub store: StoreOptions,
}

/// Purge every collection of a store and write the placeholders back.
///
/// The reset report is printed to stdout as pretty JSON whatever the outcome,
/// so an operator can see which collections failed. A report with failures is
/// turned into an error so that the process exits non-zero.
///
/// # Arguments
/// * `args` - The parsed command-line arguments for reset.
///
/// # Returns
/// Returns `Ok(())` when every collection was purged and reseeded.
pub async fn run(args: ResetArgs) -> studyhub_store::Result<()> {
    let config = args.store.load_config().await?;
    info!(
        "Resetting store {} (page size {}, concurrency {})",
        args.store.store_path, config.page_size, config.concurrency
    );

    let store = open_store(&args.store.store_path, config.retry.clone()).await?;
    let report = DatabaseReset::new(store, &config)
        .reset_all(&default_placeholders())
        .await
        .map_err(|e| {
            error!("Reset of store {} aborted: {}", args.store.store_path, e);
            e
        })?;

    let rendered = serde_json::to_string_pretty(&report)?;
    #[allow(clippy::print_stdout, reason = "CLI output")]
    {
        println!("{}", rendered);
    }

    if report.is_success() {
        info!("Store {} reset", args.store.store_path);
        Ok(())
    }
    else {
        for failure in &report.failures {
            warn!(
                "Collection '{}' failed during {:?}: {}",
                failure.collection, failure.stage, failure.message
            );
        }
        Err(StoreError::Internal {
            message: format!("reset finished with {} failures", report.failures.len()),
        })
    }
}
