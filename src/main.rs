//! ipgate - Address-rule access gate with geo fallback.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ipgate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Check {
            addr,
            locale,
            rules_only,
        } => ipgate::commands::check::run(&addr, &locale, rules_only, &cli.config).await,
        Commands::Lint => ipgate::commands::lint::run(&cli.config),
        Commands::Version => {
            println!("ipgate {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
