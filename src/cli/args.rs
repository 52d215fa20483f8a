//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// sitesync - incremental static site deploys to S3 and CloudFront
///
/// Uploads only what changed since the last deploy, publishes redirect
/// rules, and invalidates the CDN paths that went stale.
#[derive(Parser, Debug)]
#[command(name = "sitesync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SITESYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local sitesync.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a site directory
    Deploy(DeployArgs),

    /// Invalidate every CDN path of the configured distribution
    Invalidate(InvalidateArgs),

    /// Inspect or reset the deploy cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Site root to deploy
    pub path: PathBuf,

    /// Deploy cache namespace (overrides deploy.namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Redirect rules file (overrides deploy.redirects_file)
    #[arg(short, long)]
    pub redirects: Option<PathBuf>,
}

/// Arguments for the invalidate command
#[derive(Parser, Debug)]
pub struct InvalidateArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show the number of deployed records in a namespace
    Info {
        /// Namespace (defaults to deploy.namespace)
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Forget every deployed record so the next deploy uploads everything
    Clear {
        /// Namespace (defaults to deploy.namespace)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., s3.bucket)
        key: String,
        /// Value to set
        value: String,
    },
}
