//! Amazon S3 object store

use super::{ObjectStore, PutObjectRequest, PutPayload, STATUS_OK};
use crate::credentials::ClientSettings;
use crate::error::{SiteSyncError, SiteSyncResult};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use tracing::debug;

/// S3-backed object store
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client from resolved settings
    pub async fn connect(settings: &ClientSettings) -> SiteSyncResult<Self> {
        let config = settings.load_sdk_config().await?;
        Ok(Self {
            client: Client::new(&config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> SiteSyncResult<u16> {
        let PutObjectRequest {
            bucket,
            key,
            acl,
            cache_control,
            payload,
        } = request;

        let mut put = self
            .client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .acl(ObjectCannedAcl::from(acl))
            .set_cache_control(cache_control);

        put = match payload {
            PutPayload::File { body, content_type } => {
                put.body(ByteStream::from(body)).content_type(content_type)
            }
            PutPayload::Redirect { location } => put.website_redirect_location(location),
        };

        match put.send().await {
            Ok(_) => Ok(STATUS_OK),
            Err(err) => match err.raw_response() {
                // The service answered; report its status and let the caller decide.
                Some(response) => {
                    let status = response.status().as_u16();
                    debug!(
                        "S3 rejected {} with status {}: {}",
                        key,
                        status,
                        DisplayErrorContext(&err)
                    );
                    Ok(status)
                }
                None => Err(SiteSyncError::transport(key, DisplayErrorContext(&err))),
            },
        }
    }
}
