//! Amazon CloudFront invalidation client

use super::{caller_reference, EdgeInvalidator};
use crate::credentials::ClientSettings;
use crate::error::{SiteSyncError, SiteSyncResult};
use async_trait::async_trait;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use aws_sdk_cloudfront::Client;
use tracing::debug;

/// CloudFront-backed invalidator
#[derive(Debug, Clone)]
pub struct CloudFrontInvalidator {
    client: Client,
}

impl CloudFrontInvalidator {
    /// Build a client from resolved settings
    pub async fn connect(settings: &ClientSettings) -> SiteSyncResult<Self> {
        let config = settings.load_sdk_config().await?;
        Ok(Self {
            client: Client::new(&config),
        })
    }
}

#[async_trait]
impl EdgeInvalidator for CloudFrontInvalidator {
    async fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: Vec<String>,
    ) -> SiteSyncResult<String> {
        let quantity = i32::try_from(paths.len())
            .map_err(|e| SiteSyncError::invalidation(distribution_id, e))?;

        let paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths))
            .build()
            .map_err(|e| SiteSyncError::invalidation(distribution_id, e))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(caller_reference())
            .build()
            .map_err(|e| SiteSyncError::invalidation(distribution_id, e))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| SiteSyncError::invalidation(distribution_id, DisplayErrorContext(&e)))?;

        let id = output
            .invalidation()
            .map(|invalidation| invalidation.id().to_string())
            .unwrap_or_default();

        debug!("Created invalidation {} on {}", id, distribution_id);
        Ok(id)
    }
}
