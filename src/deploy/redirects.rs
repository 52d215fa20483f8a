//! Redirect rules deployed as empty objects with a redirect location

use crate::error::{SiteSyncError, SiteSyncResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// A permanent redirect from `url` to `redirect_to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub url: String,
    pub redirect_to: String,
}

impl RedirectRule {
    pub fn new(url: impl Into<String>, redirect_to: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            redirect_to: redirect_to.into(),
        }
    }

    /// Fingerprint of what gets deployed for this rule, so a changed target
    /// is redeployed under the same CacheKey.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"301");
        hasher.update(self.redirect_to.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Supplies the ordered redirect rules for a run
#[async_trait]
pub trait RedirectSource: Send + Sync {
    async fn redirects(&self) -> SiteSyncResult<Vec<RedirectRule>>;
}

/// A fixed list of rules
#[derive(Debug, Clone, Default)]
pub struct StaticRedirects(pub Vec<RedirectRule>);

#[async_trait]
impl RedirectSource for StaticRedirects {
    async fn redirects(&self) -> SiteSyncResult<Vec<RedirectRule>> {
        Ok(self.0.clone())
    }
}

/// Rules read from a file.
///
/// `.json` files hold an array of `{url, redirect_to}` objects; anything
/// else is read as TOML with one `[[redirect]]` table per rule.
#[derive(Debug, Clone)]
pub struct RedirectsFile {
    path: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct TomlRedirects {
    #[serde(default)]
    redirect: Vec<RedirectRule>,
}

impl RedirectsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> SiteSyncResult<Vec<RedirectRule>> {
        let is_json = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str::<Vec<RedirectRule>>(content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<TomlRedirects>(content)
                .map(|file| file.redirect)
                .map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| SiteSyncError::RedirectsInvalid {
            path: self.path.clone(),
            reason,
        })
    }
}

#[async_trait]
impl RedirectSource for RedirectsFile {
    async fn redirects(&self) -> SiteSyncResult<Vec<RedirectRule>> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            SiteSyncError::io(format!("reading redirects from {}", self.path.display()), e)
        })?;

        let rules = self.parse(&content)?;
        debug!("Loaded {} redirects from {}", rules.len(), self.path.display());
        Ok(rules)
    }
}
