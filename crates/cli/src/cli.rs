use clap::Parser;

use crate::{
    commands::{run_command, Cli},
    logging::init_tracing,
};

/// Run the StudyHub maintenance CLI.
///
/// Parses command-line arguments, initializes tracing, and executes the
/// requested command.
pub async fn run() -> studyhub_store::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.json, cli.verbose);

    run_command(cli).await
}
