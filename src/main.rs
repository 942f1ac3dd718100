//! QueuePilot - housing queue point checker
//!
//! Main entry point for the QueuePilot CLI.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use queuepilot::cli::{Cli, Commands};
use queuepilot::commands;
use queuepilot::store::FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load the site/credential store
    let store = FileStore::load(&cli.config)?;

    // Execute command
    match cli.command {
        Commands::Run { site, customer } => {
            let site = site.to_lowercase();
            tracing::info!(site = %site, customer, "starting queue point run");
            commands::run::run_sites(store, &site, customer).await?;
            Ok(())
        }
        Commands::Sites => {
            commands::sites::list_sites(&store)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "queuepilot=debug"
    } else {
        "queuepilot=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
