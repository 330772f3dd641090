//! ragchat - grounded chat over Gemini File Search stores
//!
#![doc = "Main entry point for the ragchat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragchat::cli::{Cli, Commands};
use ragchat::commands;
use ragchat::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration before any interactive state exists
    config.validate()?;
    config.ensure_directories()?;

    // Execute command
    match cli.command.unwrap_or(Commands::Chat { store: None }) {
        Commands::Chat { store } => {
            if let Some(s) = &store {
                tracing::debug!("Selecting store on startup: {}", s);
            }
            commands::chat::run_chat(config, store).await?;
        }
        Commands::Stores { command } => {
            tracing::info!("Starting store command");
            commands::run_stores(config, command).await?;
        }
        Commands::Upload { store, path } => {
            tracing::info!("Starting upload to {}", store);
            commands::run_upload(config, store, path).await?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with the transcript on stdout.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "ragchat=debug"
    } else {
        "ragchat=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
