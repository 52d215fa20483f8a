//! Configuration schema for sitesync
//!
//! Configuration is stored at `~/.config/sitesync/config.toml`, optionally
//! overlaid by a project-local `sitesync.toml`.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Namespace used for deploy cache records when none is configured
pub const DEFAULT_NAMESPACE: &str = "sitesync/default";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Deploy run settings
    pub deploy: DeployConfig,

    /// Object store (S3) settings
    pub s3: S3Config,

    /// CDN (CloudFront) settings
    pub cloudfront: CloudFrontConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append a JSON line per deploy to the history log
    pub history_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            history_log: true,
        }
    }
}

/// Deploy run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Deploy cache namespace, one per deploy target
    pub namespace: String,

    /// Maximum number of file uploads in flight
    pub concurrency: usize,

    /// Abort the run after N seconds (0 = no deadline)
    pub timeout_secs: u64,

    /// TOML or JSON file listing redirect rules
    #[serde(deserialize_with = "empty_as_none")]
    pub redirects_file: Option<PathBuf>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            concurrency: 4,
            timeout_secs: 0,
            redirects_file: None,
        }
    }
}

/// S3 bucket settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Target bucket
    #[serde(deserialize_with = "empty_as_none")]
    pub bucket: Option<String>,

    /// Bucket region
    #[serde(deserialize_with = "empty_as_none")]
    pub region: Option<String>,

    /// Explicit access key id
    #[serde(deserialize_with = "empty_as_none")]
    pub access_key_id: Option<String>,

    /// Explicit secret access key (stored form)
    #[serde(deserialize_with = "empty_as_none")]
    pub secret_access_key: Option<String>,

    /// Named AWS profile
    #[serde(deserialize_with = "empty_as_none")]
    pub profile: Option<String>,

    /// Key prefix inside the bucket
    #[serde(deserialize_with = "empty_as_none")]
    pub remote_path: Option<String>,

    /// Cache-Control header applied to every object
    #[serde(deserialize_with = "empty_as_none")]
    pub cache_control: Option<String>,
}

/// CloudFront distribution settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudFrontConfig {
    /// Distribution to invalidate after a deploy
    #[serde(deserialize_with = "empty_as_none")]
    pub distribution_id: Option<String>,

    /// Region for the CloudFront client
    #[serde(deserialize_with = "empty_as_none")]
    pub region: Option<String>,

    /// Explicit access key id
    #[serde(deserialize_with = "empty_as_none")]
    pub access_key_id: Option<String>,

    /// Explicit secret access key (stored form)
    #[serde(deserialize_with = "empty_as_none")]
    pub secret_access_key: Option<String>,

    /// Named AWS profile
    #[serde(deserialize_with = "empty_as_none")]
    pub profile: Option<String>,

    /// Above this many changed paths, invalidate `/*` instead (0 = always `/*`)
    pub max_paths_to_invalidate: usize,
}

/// Treat `key = ""` the same as an absent key.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()).map(T::from))
}
