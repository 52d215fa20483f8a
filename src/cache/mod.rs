//! Deploy cache: which paths have already been deployed
//!
//! A durable ledger, namespaced per deploy target, recording every
//! CacheKey whose upload was confirmed by the object store. Redirect
//! entries additionally carry a fingerprint of what was deployed so a
//! changed target is detected under an unchanged key.
//!
//! # Lookup Rules
//!
//! | Query | Hit when |
//! |-------|----------|
//! | `(key, ns, None)` | any record for `key` exists in `ns` |
//! | `(key, ns, Some(fp))` | the record for `key` in `ns` has fingerprint `fp` |
//!
//! Records are only ever added after a successful put. There is no
//! cross-process locking: two concurrent runs against the same namespace
//! are unsupported.

pub mod ledger;
pub mod memory;

pub use ledger::FileDeployCache;
pub use memory::MemoryDeployCache;

use crate::error::SiteSyncResult;
use async_trait::async_trait;
use std::collections::HashMap;

/// Namespaced record of deployed CacheKeys
#[async_trait]
pub trait DeployCache: Send + Sync {
    /// Check whether `key` was deployed in `namespace` (matching `fingerprint` if given)
    async fn is_cached(
        &self,
        key: &str,
        namespace: &str,
        fingerprint: Option<&str>,
    ) -> SiteSyncResult<bool>;

    /// Record a confirmed deploy of `key`
    async fn mark_cached(
        &self,
        key: &str,
        namespace: &str,
        fingerprint: Option<&str>,
    ) -> SiteSyncResult<()>;

    /// Forget every record in `namespace`
    async fn clear(&self, namespace: &str) -> SiteSyncResult<()>;

    /// Number of records in `namespace`
    async fn count(&self, namespace: &str) -> SiteSyncResult<usize>;
}

/// In-memory view of one namespace
#[derive(Debug, Default, Clone)]
pub(crate) struct Ledger {
    entries: HashMap<String, Option<String>>,
}

impl Ledger {
    pub(crate) fn contains(&self, key: &str, fingerprint: Option<&str>) -> bool {
        match (self.entries.get(key), fingerprint) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(stored), Some(fp)) => stored.as_deref() == Some(fp),
        }
    }

    pub(crate) fn insert(&mut self, key: &str, fingerprint: Option<&str>) {
        self.entries
            .insert(key.to_string(), fingerprint.map(str::to_string));
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lookup_ignores_fingerprint() {
        let mut ledger = Ledger::default();
        ledger.insert("/a", Some("abc"));
        assert!(ledger.contains("/a", None));
        assert!(!ledger.contains("/b", None));
    }

    #[test]
    fn fingerprint_lookup_requires_match() {
        let mut ledger = Ledger::default();
        ledger.insert("/a", Some("abc"));
        assert!(ledger.contains("/a", Some("abc")));
        assert!(!ledger.contains("/a", Some("def")));

        ledger.insert("/plain", None);
        assert!(!ledger.contains("/plain", Some("abc")));
    }

    #[test]
    fn later_mark_replaces_fingerprint() {
        let mut ledger = Ledger::default();
        ledger.insert("/a", Some("old"));
        ledger.insert("/a", Some("new"));
        assert!(ledger.contains("/a", Some("new")));
        assert!(!ledger.contains("/a", Some("old")));
        assert_eq!(ledger.len(), 1);
    }
}
