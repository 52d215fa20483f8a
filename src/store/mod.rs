//! Object store abstraction
//!
//! The deployer only ever needs one remote operation: an idempotent
//! "put object". Implementations report the HTTP status of each put;
//! anything other than 200 leaves the entry undeployed.

mod s3;

pub use s3::S3ObjectStore;

use crate::error::SiteSyncResult;
use async_trait::async_trait;

/// HTTP status the deployer treats as a confirmed write
pub const STATUS_OK: u16 = 200;

/// Canned ACL applied to every deployed object
pub const PUBLIC_READ: &str = "public-read";

/// Fields shared by every put of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutBase {
    pub bucket: String,
    pub cache_control: Option<String>,
}

/// What a single put carries besides the base fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutPayload {
    /// A file body with its Content-Type
    File { body: Vec<u8>, content_type: String },
    /// An empty object that redirects to `location`
    Redirect { location: String },
}

/// A complete put request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub acl: &'static str,
    pub cache_control: Option<String>,
    pub payload: PutPayload,
}

impl PutBase {
    /// Build a request for `key`; every request starts from the base fields only.
    pub fn request(&self, key: impl Into<String>, payload: PutPayload) -> PutObjectRequest {
        PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.into(),
            acl: PUBLIC_READ,
            cache_control: self.cache_control.clone(),
            payload,
        }
    }
}

/// Remote object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Put one object and return the HTTP status.
    ///
    /// `Err` means no status was obtained at all (connection, DNS, timeout).
    async fn put_object(&self, request: PutObjectRequest) -> SiteSyncResult<u16>;
}
