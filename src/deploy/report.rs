//! Outcome of a deploy run

use serde::Serialize;

/// What happened to the CDN cache at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InvalidationOutcome {
    /// No distribution configured
    #[default]
    NotConfigured,
    /// Nothing was deployed, so nothing to invalidate
    NothingChanged,
    /// Targeted invalidation of the changed paths
    Paths { count: usize, id: String },
    /// Full `/*` invalidation
    All { id: String },
    /// The CDN rejected or never received the request
    Failed { reason: String },
}

/// Counters for a single deploy run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployReport {
    /// Files uploaded and recorded
    pub uploaded: usize,
    /// Files skipped because they were already deployed
    pub cached: usize,
    /// Files whose upload did not succeed (retried next run)
    pub failed: usize,
    /// Entries that could not be resolved to a real file
    pub unresolvable: usize,
    /// Redirects uploaded and recorded
    pub redirects_deployed: usize,
    /// Redirects whose current target was already deployed
    pub redirects_cached: usize,
    /// Redirects whose upload did not succeed
    pub redirects_failed: usize,
    pub invalidation: InvalidationOutcome,
}

impl DeployReport {
    /// Objects written during the run
    pub fn changed(&self) -> usize {
        self.uploaded + self.redirects_deployed
    }

    /// Whether a re-run has anything left to do
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.redirects_failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_outcome_tag() {
        let report = DeployReport {
            uploaded: 3,
            invalidation: InvalidationOutcome::Paths {
                count: 3,
                id: "I1".to_string(),
            },
            ..Default::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["uploaded"], 3);
        assert_eq!(json["invalidation"]["status"], "paths");
        assert_eq!(json["invalidation"]["id"], "I1");
    }

    #[test]
    fn completeness() {
        let mut report = DeployReport::default();
        assert!(report.is_complete());
        report.redirects_failed = 1;
        assert!(!report.is_complete());
    }
}
