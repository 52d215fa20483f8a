//! Progress reporting hook for deploy runs

/// Receives progress while a run works through its entries.
///
/// `total` counts walked file entries plus redirect rules; `advance` is
/// called once per entry whatever its outcome.
pub trait DeployProgress: Send + Sync {
    fn begin(&self, total: usize);
    fn advance(&self, cache_key: &str);
    fn finish(&self);
}
