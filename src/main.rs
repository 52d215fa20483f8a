//! sitesync - incremental static site deploys
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use sitesync::cli::{Cli, Commands};
use sitesync::config::{Config, ConfigManager};
use sitesync::error::{SiteSyncError, SiteSyncResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> SiteSyncResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| SiteSyncError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    init_logging(cli.verbose, &config);
    if let Some(ref path) = local_config_path {
        debug!("Merged local config: {}", path.display());
    }

    ConfigManager::ensure_state_dirs().await?;
    sitesync::ui::init_theme();

    match cli.command {
        Commands::Deploy(args) => sitesync::cli::commands::deploy(args, &config).await,
        Commands::Invalidate(args) => sitesync::cli::commands::invalidate(args, &config).await,
        Commands::Cache(args) => sitesync::cli::commands::cache(args, &config).await,
        Commands::Config(args) => {
            sitesync::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug; `RUST_LOG` wins when set.
fn init_logging(verbose: u8, config: &Config) {
    let level = match verbose {
        0 => "sitesync=warn",
        1 => "sitesync=info",
        _ => "sitesync=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
