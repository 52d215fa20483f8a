//! sitesync - incremental static site deploys
//!
//! Uploads a local site tree to an S3 bucket, skipping everything a
//! durable deploy cache says is already there, publishes redirect rules
//! as redirect objects, and invalidates the CloudFront paths that changed.

pub mod cache;
pub mod cdn;
pub mod cli;
pub mod config;
pub mod content_type;
pub mod credentials;
pub mod deploy;
pub mod error;
pub mod history;
pub mod store;
pub mod ui;

pub use error::{SiteSyncError, SiteSyncResult};
