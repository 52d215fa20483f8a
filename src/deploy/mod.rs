//! Incremental deploys of a static site tree
//!
//! A run has three phases, always in this order:
//!
//! 1. **Files**: every file under the site root is uploaded unless the
//!    deploy cache already records its CacheKey.
//! 2. **Redirects**: each rule becomes an empty object with a redirect
//!    location, skipped when the cache holds the same key with the same
//!    fingerprint.
//! 3. **Invalidation**: the CDN paths of everything deployed are
//!    invalidated, or `/*` when there are more than the configured cap.
//!
//! Only confirmed writes (status 200) are recorded in the deploy cache,
//! so anything that failed is retried by the next run.

mod deployer;
pub mod paths;
mod progress;
mod redirects;
mod report;
mod stale;

pub use deployer::{invalidate_everything, DeploySettings, Deployer};
pub use progress::DeployProgress;
pub use redirects::{RedirectRule, RedirectSource, RedirectsFile, StaticRedirects};
pub use report::{DeployReport, InvalidationOutcome};
pub use stale::{InvalidationPlan, StalePathSet};
