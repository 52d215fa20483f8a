//! Error types for sitesync
//!
//! All modules use `SiteSyncResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sitesync operations
pub type SiteSyncResult<T> = Result<T, SiteSyncError>;

/// All errors that can occur in sitesync
#[derive(Error, Debug)]
pub enum SiteSyncError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Missing required setting: {0}")]
    ConfigMissing(&'static str),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Credential / client errors
    #[error("Failed to decrypt stored secret for {client}: {reason}")]
    SecretDecrypt { client: String, reason: String },

    #[error("Secret {reference} is unavailable: {reason}")]
    SecretUnavailable { reference: String, reason: String },

    #[error("Failed to build {client} client: {reason}")]
    ClientBuild { client: String, reason: String },

    // Remote errors
    #[error("Object store transport error for {key}: {reason}")]
    Transport { key: String, reason: String },

    #[error("CDN invalidation failed for distribution {distribution}: {reason}")]
    Invalidation {
        distribution: String,
        reason: String,
    },

    // Deploy cache errors
    #[error("Deploy cache error in namespace {namespace}: {reason}")]
    Cache { namespace: String, reason: String },

    // Redirect source errors
    #[error("Invalid redirects file {path}: {reason}")]
    RedirectsInvalid { path: PathBuf, reason: String },

    // Run control
    #[error("Deploy cancelled")]
    Cancelled,

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SiteSyncError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a deploy cache error
    pub fn cache(namespace: impl Into<String>, reason: impl ToString) -> Self {
        Self::Cache {
            namespace: namespace.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a transport error for a remote key
    pub fn transport(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalidation error
    pub fn invalidation(distribution: impl Into<String>, reason: impl ToString) -> Self {
        Self::Invalidation {
            distribution: distribution.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable by simply running the deploy again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Invalidation { .. } | Self::Cancelled
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing("s3.bucket") => Some("Run: sitesync config set s3.bucket <name>"),
            Self::ConfigMissing(_) => Some("Run: sitesync config show"),
            Self::ClientBuild { .. } => {
                Some("Check s3/cloudfront credentials, profile, or AWS_* environment variables")
            }
            Self::Cache { .. } => Some("Run: sitesync cache clear to rebuild the deploy ledger"),
            Self::Cancelled => Some("Re-run the deploy; only unfinished entries are uploaded"),
            _ => None,
        }
    }
}
