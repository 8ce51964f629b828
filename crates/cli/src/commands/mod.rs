use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use studyhub_store::{FsStore, ResetConfig, RetryPolicy, RetryingStore, SharedStore};
use tracing::debug;

/// Command handlers for the StudyHub CLI.
///
/// Each submodule implements one subcommand on top of the `studyhub_store`
/// library.
/// List command module.
mod list;
/// Notify command module.
mod notify;
/// Purge command module.
mod purge;
/// Reset command module.
mod reset;
/// Seed command module.
mod seed;

/// The CLI for maintaining a StudyHub document store.
#[derive(Parser)]
#[command(name = "studyhub")]
#[command(about = "Maintenance tool for the StudyHub document store")]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute.
    pub command: Commands,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase verbosity (can be used multiple times: -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Enumeration of all available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Purge every collection and write the placeholder documents back.
    ///
    /// The report is printed to stdout as JSON. The exit code is non-zero when
    /// any collection failed.
    Reset(reset::ResetArgs),
    /// Delete every document of a single collection.
    Purge(purge::PurgeArgs),
    /// Load sample data, either the built-in dataset or a JSON file.
    Seed(seed::SeedArgs),
    /// List the collections that currently hold documents.
    List(list::ListArgs),
    /// Send a push notification to every user with a push token.
    Notify(notify::NotifyArgs),
}

/// Store and tuning options shared by the commands that write.
#[derive(Args, Clone, Default)]
pub struct StoreOptions {
    /// Store path
    #[arg(short, long)]
    pub store_path: String,
    /// JSON configuration file (page size, concurrency, retry policy)
    #[arg(long)]
    pub config:     Option<String>,
    /// Documents per page and batch, overrides the configuration file
    #[arg(long)]
    pub page_size:  Option<usize>,
}

impl StoreOptions {
    /// Loads the configuration file (or defaults) and applies flag overrides.
    pub async fn load_config(&self) -> studyhub_store::Result<ResetConfig> {
        let mut config = match self.config {
            Some(ref path) => ResetConfig::from_file(path).await?,
            None => ResetConfig::default(),
        };
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }
}

/// Opens the filesystem store at `path` behind the retry decorator.
pub async fn open_store(path: &str, retry: RetryPolicy) -> studyhub_store::Result<SharedStore> {
    let store: SharedStore = Arc::new(RetryingStore::new(FsStore::new(path).await?, retry));
    Ok(store)
}

/// Execute the specified CLI command.
///
/// This function dispatches to the appropriate command handler based on the
/// provided command variant.
///
/// # Returns
/// Returns `Ok(())` on success, or a `StoreError` on failure.
pub async fn run_command(cli: Cli) -> studyhub_store::Result<()> {
    match cli.command {
        Commands::Reset(args) => reset::run(args).await,
        Commands::Purge(args) => purge::run(args).await,
        Commands::Seed(args) => seed::run(args).await,
        Commands::List(args) => list::run(args).await,
        Commands::Notify(args) => notify::run(args).await,
    }
}
