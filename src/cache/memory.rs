//! Non-durable deploy cache, used by tests and throwaway runs

use super::{DeployCache, Ledger};
use crate::error::SiteSyncResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Deploy cache that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryDeployCache {
    namespaces: Mutex<HashMap<String, Ledger>>,
}

impl MemoryDeployCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeployCache for MemoryDeployCache {
    async fn is_cached(
        &self,
        key: &str,
        namespace: &str,
        fingerprint: Option<&str>,
    ) -> SiteSyncResult<bool> {
        let namespaces = self.namespaces.lock().await;
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
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key, fingerprint);
        Ok(())
    }

    async fn clear(&self, namespace: &str) -> SiteSyncResult<()> {
        self.namespaces.lock().await.remove(namespace);
        Ok(())
    }

    async fn count(&self, namespace: &str) -> SiteSyncResult<usize> {
        let namespaces = self.namespaces.lock().await;
        Ok(namespaces.get(namespace).map_or(0, Ledger::len))
    }
}
