//! Bounded set of CDN paths changed during one run

use super::paths::invalidation_path;
use std::collections::HashSet;

/// What to invalidate once both deploy phases are done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationPlan {
    /// Nothing changed
    Nothing,
    /// Invalidate exactly these paths
    Paths(Vec<String>),
    /// Too many changes for an explicit list
    All,
}

/// Distinct changed paths, tracked individually up to `cap`.
///
/// A file and a redirect sharing a CacheKey count once. Only the first
/// `cap` paths are stored: once the count exceeds `cap` the run falls back
/// to a full invalidation, so later changes are counted without being
/// remembered.
#[derive(Debug, Clone)]
pub struct StalePathSet {
    cap: usize,
    paths: Vec<String>,
    seen: HashSet<String>,
    changed: usize,
}

impl StalePathSet {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            paths: Vec::new(),
            seen: HashSet::new(),
            changed: 0,
        }
    }

    /// Record a deployed CacheKey
    pub fn record(&mut self, cache_key: &str) {
        if self.changed > self.cap {
            self.changed += 1;
            return;
        }

        let path = invalidation_path(cache_key);
        if !self.seen.insert(path.clone()) {
            return;
        }

        self.changed += 1;
        if self.paths.len() < self.cap {
            self.paths.push(path);
        }
    }

    /// Changes recorded: distinct paths until the cap is exceeded
    pub fn changed(&self) -> usize {
        self.changed
    }

    /// Paths tracked individually (never more than `cap`)
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Decide between a targeted and a full invalidation
    pub fn into_plan(self) -> InvalidationPlan {
        if self.changed == 0 {
            InvalidationPlan::Nothing
        } else if self.changed > self.cap {
            InvalidationPlan::All
        } else {
            InvalidationPlan::Paths(self.paths)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_files(set: &mut StalePathSet, n: usize) {
        for i in 0..n {
            set.record(&format!("/page-{}.html", i));
        }
    }

    #[test]
    fn empty_set_plans_nothing() {
        assert_eq!(StalePathSet::new(10).into_plan(), InvalidationPlan::Nothing);
    }

    #[test]
    fn over_cap_falls_back_to_all() {
        let mut set = StalePathSet::new(2);
        record_files(&mut set, 5);

        assert_eq!(set.changed(), 5);
        assert!(set.paths().len() <= 2);
        assert_eq!(set.into_plan(), InvalidationPlan::All);
    }

    #[test]
    fn exactly_cap_lists_paths() {
        let mut set = StalePathSet::new(3);
        set.record("/a.html");
        set.record("/blog/index.html");
        set.record("/c.css");

        assert_eq!(
            set.into_plan(),
            InvalidationPlan::Paths(vec![
                "/a.html".to_string(),
                "/blog/".to_string(),
                "/c.css".to_string(),
            ])
        );
    }

    #[test]
    fn one_over_cap_falls_back() {
        let mut set = StalePathSet::new(3);
        record_files(&mut set, 4);
        assert_eq!(set.into_plan(), InvalidationPlan::All);
    }

    #[test]
    fn shared_key_counts_once() {
        let mut set = StalePathSet::new(1);
        set.record("/blog/index.html");
        set.record("/blog/index.html");

        assert_eq!(set.changed(), 1);
        assert_eq!(
            set.into_plan(),
            InvalidationPlan::Paths(vec!["/blog/".to_string()])
        );
    }

    #[test]
    fn zero_cap_always_invalidates_all() {
        let mut set = StalePathSet::new(0);
        set.record("/a.html");

        assert!(set.paths().is_empty());
        assert_eq!(set.into_plan(), InvalidationPlan::All);
    }
}
