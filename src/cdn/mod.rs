//! CDN edge cache invalidation

mod cloudfront;

pub use cloudfront::CloudFrontInvalidator;

use crate::error::SiteSyncResult;
use async_trait::async_trait;

/// Path that invalidates every object in a distribution
pub const INVALIDATE_ALL: &str = "/*";

/// Issues invalidation batches against a CDN distribution
#[async_trait]
pub trait EdgeInvalidator: Send + Sync {
    /// Invalidate `paths` in one request and return the invalidation id
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: Vec<String>,
    ) -> SiteSyncResult<String>;
}

/// Caller reference for an invalidation batch; must be unique per request.
pub fn caller_reference() -> String {
    format!("sitesync-{}", chrono::Utc::now().timestamp_millis())
}
