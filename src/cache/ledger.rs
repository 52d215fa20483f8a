//! File-backed deploy cache
//!
//! Each namespace is an append-only JSON-lines file under the state
//! directory. A line is written only after the object store confirmed the
//! upload, and replayed in order on the next run (later lines win).

use super::{DeployCache, Ledger};
use crate::config::ConfigManager;
use crate::error::{SiteSyncError, SiteSyncResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One ledger line
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRecord {
    key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

/// Durable deploy cache stored as JSON lines per namespace
pub struct FileDeployCache {
    dir: PathBuf,
    namespaces: Mutex<HashMap<String, Ledger>>,
}

impl FileDeployCache {
    /// Open the cache in the default state directory
    pub async fn open_default() -> SiteSyncResult<Self> {
        Self::open(ConfigManager::deploy_cache_dir()).await
    }

    /// Open the cache rooted at `dir`, creating it if needed
    pub async fn open(dir: PathBuf) -> SiteSyncResult<Self> {
        fs::create_dir_all(&dir).await.map_err(|e| {
            SiteSyncError::io(format!("creating deploy cache dir {}", dir.display()), e)
        })?;

        Ok(Self {
            dir,
            namespaces: Mutex::new(HashMap::new()),
        })
    }

    /// Ledger file for a namespace.
    ///
    /// Namespaces are free-form (`site/prod`), so the readable part is
    /// sanitized and a short hash keeps sanitized collisions apart.
    pub fn ledger_path(&self, namespace: &str) -> PathBuf {
        let readable: String = namespace
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let digest = Sha256::digest(namespace.as_bytes());
        self.dir
            .join(format!("{}-{}.jsonl", readable, hex::encode(&digest[..4])))
    }

    async fn load(&self, namespace: &str) -> SiteSyncResult<Ledger> {
        let path = self.ledger_path(namespace);
        let mut ledger = Ledger::default();

        if !path.exists() {
            debug!("No deploy ledger for namespace {}", namespace);
            return Ok(ledger);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| SiteSyncError::cache(namespace, format!("reading {}: {}", path.display(), e)))?;

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LedgerRecord>(line) {
                Ok(record) => ledger.insert(&record.key, record.fingerprint.as_deref()),
                // A crash mid-append leaves a torn last line; that entry is simply redeployed.
                Err(e) => warn!(
                    "Ignoring unreadable line {} in {}: {}",
                    number + 1,
                    path.display(),
                    e
                ),
            }
        }

        debug!(
            "Loaded {} deploy records for namespace {}",
            ledger.len(),
            namespace
        );
        Ok(ledger)
    }

    async fn append(&self, namespace: &str, record: &LedgerRecord) -> SiteSyncResult<()> {
        let path = self.ledger_path(namespace);
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SiteSyncError::cache(namespace, format!("opening {}: {}", path.display(), e)))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| SiteSyncError::cache(namespace, format!("writing {}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| SiteSyncError::cache(namespace, format!("flushing {}: {}", path.display(), e)))?;
        file.sync_data()
            .await
            .map_err(|e| SiteSyncError::cache(namespace, format!("syncing {}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl DeployCache for FileDeployCache {
    async fn is_cached(
        &self,
        key: &str,
        namespace: &str,
        fingerprint: Option<&str>,
    ) -> SiteSyncResult<bool> {
        let mut namespaces = self.namespaces.lock().await;
        if !namespaces.contains_key(namespace) {
            let ledger = self.load(namespace).await?;
            namespaces.insert(namespace.to_string(), ledger);
        }
        Ok(namespaces
            .get(namespace)
            .is_some_and(|ledger| ledger.contains(key, fingerprint)))
    }

    async fn mark_cached(
        &self,
        key: &str,
        namespace: &str,
        fingerprint: Option<&str>,
    ) -> SiteSyncResult<()> {
        let mut namespaces = self.namespaces.lock().await;
        if !namespaces.contains_key(namespace) {
            let ledger = self.load(namespace).await?;
            namespaces.insert(namespace.to_string(), ledger);
        }

        // Disk first: the in-memory view must never claim more than is durable.
        let record = LedgerRecord {
            key: key.to_string(),
            fingerprint: fingerprint.map(str::to_string),
        };
        self.append(namespace, &record).await?;

        if let Some(ledger) = namespaces.get_mut(namespace) {
            ledger.insert(key, fingerprint);
        }
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> SiteSyncResult<()> {
        let mut namespaces = self.namespaces.lock().await;
        let path = self.ledger_path(namespace);
        if path.exists() {
            fs::remove_file(&path)
                .await
                .map_err(|e| SiteSyncError::cache(namespace, format!("removing {}: {}", path.display(), e)))?;
        }
        namespaces.remove(namespace);
        debug!("Cleared deploy cache namespace {}", namespace);
        Ok(())
    }

    async fn count(&self, namespace: &str) -> SiteSyncResult<usize> {
        let mut namespaces = self.namespaces.lock().await;
        if !namespaces.contains_key(namespace) {
            let ledger = self.load(namespace).await?;
            namespaces.insert(namespace.to_string(), ledger);
        }
        Ok(namespaces.get(namespace).map_or(0, Ledger::len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_cache() -> (FileDeployCache, TempDir) {
        let temp = TempDir::new().unwrap();
        let cache = FileDeployCache::open(temp.path().join("ledger")).await.unwrap();
        (cache, temp)
    }

    #[tokio::test]
    async fn mark_and_lookup() {
        let (cache, _temp) = test_cache().await;

        cache.mark_cached("/index.html", "prod", None).await.unwrap();

        assert!(cache.is_cached("/index.html", "prod", None).await.unwrap());
        assert!(!cache.is_cached("/about.html", "prod", None).await.unwrap());
    }

    #[tokio::test]
    async fn mark_is_on_disk_when_it_returns() {
        let (cache, _temp) = test_cache().await;

        cache.mark_cached("/index.html", "prod", Some("fp")).await.unwrap();

        let content = std::fs::read_to_string(cache.ledger_path("prod")).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("/index.html"));
        assert!(content.ends_with('\n'));
    }

    #[tokio::test]
    async fn survives_reopen() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ledger");

        {
            let cache = FileDeployCache::open(dir.clone()).await.unwrap();
            cache.mark_cached("/a.html", "prod", None).await.unwrap();
            cache
                .mark_cached("/old/index.html", "prod", Some("fp1"))
                .await
                .unwrap();
        }

        let reopened = FileDeployCache::open(dir).await.unwrap();
        assert!(reopened.is_cached("/a.html", "prod", None).await.unwrap());
        assert!(reopened
            .is_cached("/old/index.html", "prod", Some("fp1"))
            .await
            .unwrap());
        assert!(!reopened
            .is_cached("/old/index.html", "prod", Some("fp2"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn namespaces_use_separate_files() {
        let (cache, _temp) = test_cache().await;

        cache.mark_cached("/a.html", "site/prod", None).await.unwrap();

        assert!(!cache.is_cached("/a.html", "site_prod", None).await.unwrap());
        assert_ne!(cache.ledger_path("site/prod"), cache.ledger_path("site_prod"));
    }

    #[tokio::test]
    async fn torn_line_is_ignored() {
        let (cache, _temp) = test_cache().await;
        let path = cache.ledger_path("prod");
        std::fs::write(&path, "{\"key\":\"/a.html\"}\n{\"key\":\"/b.ht").unwrap();

        assert!(cache.is_cached("/a.html", "prod", None).await.unwrap());
        assert!(!cache.is_cached("/b.html", "prod", None).await.unwrap());
        assert_eq!(cache.count("prod").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_removes_ledger() {
        let (cache, _temp) = test_cache().await;
        cache.mark_cached("/a.html", "prod", None).await.unwrap();

        cache.clear("prod").await.unwrap();

        assert!(!cache.ledger_path("prod").exists());
        assert!(!cache.is_cached("/a.html", "prod", None).await.unwrap());
    }
}
