//! Configuration management for sitesync

pub mod schema;

pub use schema::{Config, DEFAULT_NAMESPACE};

use crate::error::{SiteSyncError, SiteSyncResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = "sitesync.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesync")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sitesync")
    }

    /// Get the deploy cache ledger directory path
    pub fn deploy_cache_dir() -> PathBuf {
        Self::state_dir().join("deploy-cache")
    }

    /// Get the deploy history log path
    pub fn history_log_path() -> PathBuf {
        Self::state_dir().join("history.log")
    }

    /// Find a project-local `sitesync.toml`, walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> SiteSyncResult<Config> {
        self.load_merged(None).await
    }

    /// Load the global configuration with an optional local file merged over it
    pub async fn load_merged(&self, local: Option<&Path>) -> SiteSyncResult<Config> {
        let mut merged = if self.config_path.exists() {
            Self::read_table(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            toml::Value::Table(toml::map::Map::new())
        };

        if let Some(local_path) = local {
            debug!("Merging local config {}", local_path.display());
            let overlay = Self::read_table(local_path).await?;
            merge_tables(&mut merged, overlay);
        }

        let source = local.unwrap_or(&self.config_path);
        merged.try_into().map_err(|e: toml::de::Error| SiteSyncError::ConfigInvalid {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn read_table(path: &Path) -> SiteSyncResult<toml::Value> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SiteSyncError::io(format!("reading config from {}", path.display()), e))?;

        content
            .parse::<toml::Value>()
            .map_err(|e| SiteSyncError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SiteSyncResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SiteSyncError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SiteSyncResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SiteSyncError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure all state directories exist
    pub async fn ensure_state_dirs() -> SiteSyncResult<()> {
        for dir in [Self::state_dir(), Self::deploy_cache_dir()] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                SiteSyncError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`; overlay scalars win.
fn merge_tables(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_tables(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
