//! Seams between the pipeline and the outside world.

use async_trait::async_trait;
use txstats_common::{ResourceSlug, Result, StatRecord};

/// Source of per-resource translation statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Lists every resource of the project.
    async fn list_resources(&self) -> Result<Vec<ResourceSlug>>;

    /// Fetches the statistics of one resource for the configured locale.
    async fn fetch_resource_stat(&self, slug: &ResourceSlug) -> Result<(ResourceSlug, StatRecord)>;
}

/// Delivers a finished report.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends `message` to every configured recipient.
    async fn send(&self, message: &str) -> Result<()>;
}
