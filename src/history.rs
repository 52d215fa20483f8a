//! Deploy history
//!
//! Writes JSON lines to `~/.local/state/sitesync/history.log`, one per
//! deploy or manual invalidation. Enabled by default; `general.history_log`
//! turns it off.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Event recorded after a deploy run finishes
pub const DEPLOY_COMPLETED: &str = "deploy.completed";

/// Event recorded after `sitesync invalidate`
pub const CDN_INVALIDATED: &str = "cdn.invalidated";

/// Append-only JSON lines log of deploys
pub struct DeployHistory {
    enabled: bool,
    path: PathBuf,
}

impl DeployHistory {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.history_log,
            path: ConfigManager::history_log_path(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Record an event.
    ///
    /// Write failures are logged and dropped: a deploy that already reached
    /// the object store is not failed over its history entry.
    pub async fn record(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize history entry: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write deploy history: {}", e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::DeployReport;
    use tempfile::TempDir;

    fn history_in(dir: &TempDir, enabled: bool) -> DeployHistory {
        DeployHistory {
            enabled,
            path: dir.path().join("nested").join("history.log"),
        }
    }

    #[tokio::test]
    async fn records_deploy_report() {
        let dir = TempDir::new().unwrap();
        let history = history_in(&dir, true);
        let report = DeployReport {
            uploaded: 2,
            cached: 7,
            ..Default::default()
        };

        history
            .record(
                DEPLOY_COMPLETED,
                &serde_json::json!({"namespace": "prod", "report": report}),
            )
            .await;

        let content = tokio::fs::read_to_string(history.path()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();

        assert_eq!(parsed["event"], "deploy.completed");
        assert_eq!(parsed["data"]["report"]["uploaded"], 2);
        assert_eq!(parsed["data"]["report"]["invalidation"]["status"], "not_configured");
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn appends() {
        let dir = TempDir::new().unwrap();
        let history = history_in(&dir, true);

        history.record(DEPLOY_COMPLETED, &serde_json::json!({})).await;
        history.record(CDN_INVALIDATED, &serde_json::json!({})).await;

        let content = tokio::fs::read_to_string(history.path()).await.unwrap();
        assert_eq!(content.trim().lines().count(), 2);
    }

    #[tokio::test]
    async fn disabled_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let history = history_in(&dir, false);

        history.record(DEPLOY_COMPLETED, &serde_json::json!({})).await;

        assert!(!history.path().exists());
    }
}
