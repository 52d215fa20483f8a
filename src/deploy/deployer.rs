//! Deploy orchestration: files, then redirects, then CDN invalidation

use super::paths::{file_cache_key, normalize_prefix, redirect_cache_key, remote_key};
use super::progress::DeployProgress;
use super::redirects::{RedirectRule, RedirectSource, StaticRedirects};
use super::report::{DeployReport, InvalidationOutcome};
use super::stale::{InvalidationPlan, StalePathSet};
use crate::cache::DeployCache;
use crate::cdn::{EdgeInvalidator, INVALIDATE_ALL};
use crate::config::Config;
use crate::content_type::{self, ContentTyper, ExtensionTyper};
use crate::error::{SiteSyncError, SiteSyncResult};
use crate::store::{ObjectStore, PutBase, PutPayload, STATUS_OK};
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Everything a run needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub namespace: String,
    pub bucket: String,
    /// Normalized key prefix (no leading or trailing slash)
    pub remote_path: Option<String>,
    pub cache_control: Option<String>,
    pub distribution_id: Option<String>,
    pub max_paths_to_invalidate: usize,
    /// Maximum file uploads in flight (at least 1)
    pub concurrency: usize,
}

impl DeploySettings {
    /// Build settings from loaded configuration
    pub fn from_config(config: &Config) -> SiteSyncResult<Self> {
        let bucket = config
            .s3
            .bucket
            .clone()
            .ok_or(SiteSyncError::ConfigMissing("s3.bucket"))?;

        Ok(Self {
            namespace: config.deploy.namespace.clone(),
            bucket,
            remote_path: normalize_prefix(config.s3.remote_path.as_deref()),
            cache_control: config.s3.cache_control.clone(),
            distribution_id: config.cloudfront.distribution_id.clone(),
            max_paths_to_invalidate: config.cloudfront.max_paths_to_invalidate,
            concurrency: config.deploy.concurrency.max(1),
        })
    }

    fn put_base(&self) -> PutBase {
        PutBase {
            bucket: self.bucket.clone(),
            cache_control: self.cache_control.clone(),
        }
    }
}

/// One walked entry of the site tree
#[derive(Debug)]
enum SiteEntry {
    File { path: PathBuf, relative: PathBuf },
    Unresolvable { path: PathBuf, reason: String },
}

/// Result of handling one file entry
#[derive(Debug)]
enum FileOutcome {
    Cached(String),
    Uploaded(String),
    Failed(String),
    Unresolvable(String),
}

/// Incremental deployer for one target
pub struct Deployer {
    settings: DeploySettings,
    store: Arc<dyn ObjectStore>,
    cache: Arc<dyn DeployCache>,
    invalidator: Option<Arc<dyn EdgeInvalidator>>,
    typer: Arc<dyn ContentTyper>,
    redirects: Arc<dyn RedirectSource>,
    progress: Option<Arc<dyn DeployProgress>>,
}

impl Deployer {
    /// Create a deployer with no CDN, no redirects and extension-based MIME types
    pub fn new(
        settings: DeploySettings,
        store: Arc<dyn ObjectStore>,
        cache: Arc<dyn DeployCache>,
    ) -> Self {
        Self {
            settings,
            store,
            cache,
            invalidator: None,
            typer: Arc::new(ExtensionTyper),
            redirects: Arc::new(StaticRedirects::default()),
            progress: None,
        }
    }

    /// Invalidate through this CDN client when a distribution is configured
    pub fn with_invalidator(mut self, invalidator: Arc<dyn EdgeInvalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// Use a different MIME lookup
    pub fn with_content_typer(mut self, typer: Arc<dyn ContentTyper>) -> Self {
        self.typer = typer;
        self
    }

    /// Deploy these redirect rules after the files
    pub fn with_redirects(mut self, redirects: Arc<dyn RedirectSource>) -> Self {
        self.redirects = redirects;
        self
    }

    /// Report per-entry progress
    pub fn with_progress(mut self, progress: Arc<dyn DeployProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn settings(&self) -> &DeploySettings {
        &self.settings
    }

    /// Deploy the site under `root`.
    ///
    /// A missing root is not an error: nothing is uploaded, recorded or
    /// invalidated. Per-entry failures are logged and counted in the report;
    /// deploy cache failures and cancellation abort the run.
    pub async fn deploy(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> SiteSyncResult<DeployReport> {
        let mut report = DeployReport::default();

        if !root.is_dir() {
            debug!("{} is not a directory, nothing to deploy", root.display());
            return Ok(report);
        }

        // Load rules up front so a broken redirect source fails before any upload.
        let rules = self.redirects.redirects().await?;
        let mut stale = StalePathSet::new(self.settings.max_paths_to_invalidate);

        info!(
            "Deploying {} to s3://{}/{} (namespace {})",
            root.display(),
            self.settings.bucket,
            self.settings.remote_path.as_deref().unwrap_or(""),
            self.settings.namespace
        );

        let walk_root = root.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || walk_site(&walk_root))
            .await
            .map_err(|e| SiteSyncError::Internal(format!("site walk task failed: {}", e)))?;
        debug!("Found {} entries under {}", entries.len(), root.display());

        if let Some(progress) = &self.progress {
            progress.begin(entries.len() + rules.len());
        }

        let deployed = match self
            .deploy_files(entries, &mut stale, &mut report, cancel)
            .await
        {
            Ok(()) => {
                self.deploy_redirects(&rules, &mut stale, &mut report, cancel)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Some(progress) = &self.progress {
            progress.finish();
        }
        deployed?;

        info!(
            "Deployed {} files and {} redirects ({} already deployed, {} failed)",
            report.uploaded,
            report.redirects_deployed,
            report.cached + report.redirects_cached,
            report.failed + report.redirects_failed
        );

        report.invalidation = self.invalidate(stale.into_plan(), cancel).await;
        Ok(report)
    }

    /// Invalidate every path in the distribution.
    ///
    /// No-op without a configured distribution. Failures and cancellation
    /// are logged and returned as [`InvalidationOutcome::Failed`].
    pub async fn invalidate_all(&self, cancel: &CancellationToken) -> InvalidationOutcome {
        let (Some(distribution), Some(invalidator)) =
            (&self.settings.distribution_id, &self.invalidator)
        else {
            return InvalidationOutcome::NotConfigured;
        };

        invalidate_everything(invalidator.as_ref(), distribution, cancel).await
    }

    async fn deploy_files(
        &self,
        entries: Vec<SiteEntry>,
        stale: &mut StalePathSet,
        report: &mut DeployReport,
        cancel: &CancellationToken,
    ) -> SiteSyncResult<()> {
        let base = self.settings.put_base();
        let mut uploads = std::pin::pin!(stream::iter(entries)
            .map(|entry| self.deploy_file(entry, &base))
            .buffer_unordered(self.settings.concurrency));

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SiteSyncError::Cancelled),
                next = uploads.next() => match next {
                    Some(outcome) => outcome?,
                    None => break,
                },
            };

            // Single consumer: counting and the cap check never race.
            let key = match outcome {
                FileOutcome::Cached(key) => {
                    report.cached += 1;
                    key
                }
                FileOutcome::Uploaded(key) => {
                    report.uploaded += 1;
                    stale.record(&key);
                    key
                }
                FileOutcome::Failed(key) => {
                    report.failed += 1;
                    key
                }
                FileOutcome::Unresolvable(key) => {
                    report.unresolvable += 1;
                    key
                }
            };
            self.advance(&key);
        }

        Ok(())
    }

    async fn deploy_file(&self, entry: SiteEntry, base: &PutBase) -> SiteSyncResult<FileOutcome> {
        let (path, relative) = match entry {
            SiteEntry::File { path, relative } => (path, relative),
            SiteEntry::Unresolvable { path, reason } => {
                warn!("Trying to deploy unknown file {}: {}", path.display(), reason);
                return Ok(FileOutcome::Unresolvable(path.display().to_string()));
            }
        };

        let Some(cache_key) = file_cache_key(&relative) else {
            warn!("Skipping {}: file name is not valid UTF-8", path.display());
            return Ok(FileOutcome::Unresolvable(path.display().to_string()));
        };
        let real_path = match tokio::fs::canonicalize(&path).await {
            Ok(real) => real,
            Err(e) => {
                warn!("Trying to deploy unknown file {}: {}", path.display(), e);
                return Ok(FileOutcome::Unresolvable(cache_key));
            }
        };

        if self
            .cache
            .is_cached(&cache_key, &self.settings.namespace, None)
            .await?
        {
            return Ok(FileOutcome::Cached(cache_key));
        }

        let key = remote_key(self.settings.remote_path.as_deref(), &cache_key);
        let content_type = content_type::header_value(&self.typer.guess(&path));

        let body = match tokio::fs::read(&real_path).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read {}: {}", real_path.display(), e);
                return Ok(FileOutcome::Failed(cache_key));
            }
        };

        debug!("Uploading {} ({}, {} bytes)", key, content_type, body.len());
        let request = base.request(key.clone(), PutPayload::File { body, content_type });
        let result = self.store.put_object(request).await;

        if !put_confirmed("file", &key, result) {
            return Ok(FileOutcome::Failed(cache_key));
        }

        self.cache
            .mark_cached(&cache_key, &self.settings.namespace, None)
            .await?;
        Ok(FileOutcome::Uploaded(cache_key))
    }

    async fn deploy_redirects(
        &self,
        rules: &[RedirectRule],
        stale: &mut StalePathSet,
        report: &mut DeployReport,
        cancel: &CancellationToken,
    ) -> SiteSyncResult<()> {
        // Fresh base: redirects never inherit body or content type from the file phase.
        let base = self.settings.put_base();

        // Sequential, so duplicate URLs in one list never race on a CacheKey.
        for rule in rules {
            if cancel.is_cancelled() {
                return Err(SiteSyncError::Cancelled);
            }

            let cache_key = redirect_cache_key(&rule.url);
            let fingerprint = rule.fingerprint();

            if self
                .cache
                .is_cached(&cache_key, &self.settings.namespace, Some(&fingerprint))
                .await?
            {
                report.redirects_cached += 1;
                self.advance(&cache_key);
                continue;
            }

            let key = remote_key(self.settings.remote_path.as_deref(), &cache_key);
            debug!("Uploading redirect {} -> {}", key, rule.redirect_to);
            let request = base.request(
                key.clone(),
                PutPayload::Redirect {
                    location: rule.redirect_to.clone(),
                },
            );

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SiteSyncError::Cancelled),
                result = self.store.put_object(request) => result,
            };

            if put_confirmed("redirect", &key, result) {
                self.cache
                    .mark_cached(&cache_key, &self.settings.namespace, Some(&fingerprint))
                    .await?;
                report.redirects_deployed += 1;
                stale.record(&cache_key);
            } else {
                report.redirects_failed += 1;
            }
            self.advance(&cache_key);
        }

        Ok(())
    }

    fn advance(&self, cache_key: &str) {
        if let Some(progress) = &self.progress {
            progress.advance(cache_key);
        }
    }

    async fn invalidate(
        &self,
        plan: InvalidationPlan,
        cancel: &CancellationToken,
    ) -> InvalidationOutcome {
        let Some(distribution) = &self.settings.distribution_id else {
            return InvalidationOutcome::NotConfigured;
        };
        let Some(invalidator) = &self.invalidator else {
            warn!(
                "Distribution {} configured but no CDN client available",
                distribution
            );
            return InvalidationOutcome::NotConfigured;
        };

        match plan {
            InvalidationPlan::Nothing => InvalidationOutcome::NothingChanged,
            InvalidationPlan::All => self.invalidate_all(cancel).await,
            InvalidationPlan::Paths(paths) => {
                let count = paths.len();
                let noun = if count == 1 { "path" } else { "paths" };
                info!("Invalidating {} CloudFront {}", count, noun);

                match create_invalidation(invalidator.as_ref(), distribution, paths, cancel).await
                {
                    Ok(id) => InvalidationOutcome::Paths { count, id },
                    Err(reason) => InvalidationOutcome::Failed { reason },
                }
            }
        }
    }
}

/// Invalidate `/*` on a distribution, independent of any deploy state.
///
/// Failures and cancellation are logged and returned as
/// [`InvalidationOutcome::Failed`].
pub async fn invalidate_everything(
    invalidator: &dyn EdgeInvalidator,
    distribution_id: &str,
    cancel: &CancellationToken,
) -> InvalidationOutcome {
    info!("Invalidating all CloudFront paths");
    let paths = vec![INVALIDATE_ALL.to_string()];
    match create_invalidation(invalidator, distribution_id, paths, cancel).await {
        Ok(id) => InvalidationOutcome::All { id },
        Err(reason) => InvalidationOutcome::Failed { reason },
    }
}

/// One CDN request raced against cancellation; the error is the logged reason.
async fn create_invalidation(
    invalidator: &dyn EdgeInvalidator,
    distribution_id: &str,
    paths: Vec<String>,
    cancel: &CancellationToken,
) -> Result<String, String> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SiteSyncError::Cancelled),
        result = invalidator.create_invalidation(distribution_id, paths) => result,
    };

    result.map_err(|e| {
        warn!("Invalidation of {} not completed: {}", distribution_id, e);
        e.to_string()
    })
}

/// Whether a put result counts as a confirmed write; logs the failures.
fn put_confirmed(kind: &str, key: &str, result: SiteSyncResult<u16>) -> bool {
    match result {
        Ok(STATUS_OK) => true,
        Ok(status) => {
            warn!(
                "Failed to deploy {} {}: status {}, will retry next run",
                kind, key, status
            );
            false
        }
        Err(e) => {
            warn!("Failed to deploy {} {}: {}, will retry next run", kind, key, e);
            false
        }
    }
}

/// Every non-directory entry under `root`, following symlinks, in file-name order.
fn walk_site(root: &Path) -> Vec<SiteEntry> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => Some(match entry.path().strip_prefix(root) {
                Ok(relative) => SiteEntry::File {
                    path: entry.path().to_path_buf(),
                    relative: relative.to_path_buf(),
                },
                Err(e) => SiteEntry::Unresolvable {
                    path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                },
            }),
            // Dangling symlinks, loops and unreadable directories.
            Err(e) => Some(SiteEntry::Unresolvable {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf()),
                reason: e.to_string(),
            }),
        })
        .collect()
}
