//! Transifex API client with connection pooling and rate limiting
//!
//! Talks to the v2 project API: the resource catalog and the per-resource
//! statistics of one locale. Requests are never retried; a failed batch is
//! picked up again by the next scheduled run.

use crate::aggregator::rename_glossary;
use crate::traits::StatsSource;
use async_trait::async_trait;
use futures::future::try_join_all;
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, info, instrument, warn};
use txstats_common::{ResourceSlug, Result, Snapshot, StatRecord, TxError};
use txstats_config::TransifexConfig;
use url::Url;

/// Basic-auth user name the API expects alongside a token.
const API_USER: &str = "api";

/// Catalog entry; only the slug is of interest.
#[derive(Debug, Deserialize)]
struct ResourceEntry {
    slug: String,
}

/// Transifex API client
#[derive(Debug, Clone)]
pub struct TransifexClient {
    client: Client,
    api_url: Url,
    api_token: String,
    locale: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl TransifexClient {
    /// Create a new client with the given configuration
    pub fn new(config: &TransifexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TxError::config_with_source("Failed to create HTTP client", e))?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = config.api_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let api_url = Url::parse(&base)
            .map_err(|e| TxError::config_with_source(format!("Invalid API URL '{base}'"), e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| TxError::config("Rate limit must be greater than 0"))?,
        );

        Ok(Self {
            client,
            api_url,
            api_token: config.api_token.clone(),
            locale: config.locale.clone(),
            rate_limiter: Arc::new(DefaultDirectRateLimiter::direct(quota)),
        })
    }

    /// Absolute URL of an API path relative to the project base.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| TxError::config_with_source(format!("Invalid API path '{path}'"), e))
    }

    /// Make an authenticated GET request and decode the JSON body
    #[instrument(skip(self))]
    async fn request_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(path)?;
        debug!(%url, "transifex api request");

        let response = self
            .client
            .get(url)
            .basic_auth(API_USER, Some(&self.api_token))
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            warn!("Server error for {}: {}", path, status);
            return Err(TxError::remote_unavailable(format!(
                "API returned server error {status} for {path}"
            )));
        }
        if !status.is_success() {
            warn!("Unexpected status for {}: {}", path, status);
            return Err(TxError::remote_protocol_with_status(
                format!("API returned {status} for {path}"),
                status.as_u16(),
            ));
        }

        let body = response.text().await?;
        decode_body(path, &body)
    }

    /// Fetches every resource's statistics and folds them into one snapshot.
    pub async fn fetch_all_stats(&self, slugs: &[ResourceSlug]) -> Result<Snapshot> {
        fetch_all_stats(self, slugs).await
    }
}

#[async_trait]
impl StatsSource for TransifexClient {
    #[instrument(skip(self))]
    async fn list_resources(&self) -> Result<Vec<ResourceSlug>> {
        let entries: Vec<ResourceEntry> = self.request_json("resources/").await?;
        info!("Found {} resources", entries.len());
        Ok(entries.into_iter().map(|entry| ResourceSlug::from(entry.slug)).collect())
    }

    async fn fetch_resource_stat(&self, slug: &ResourceSlug) -> Result<(ResourceSlug, StatRecord)> {
        let path = format!("resource/{slug}/stats/{}/", self.locale);
        let record: StatRecord = self.request_json(&path).await?;
        Ok((slug.clone(), record))
    }
}

fn decode_body<T>(path: &str, body: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        TxError::remote_protocol_with_source(format!("Unexpected response shape from {path}"), e)
    })
}

/// Fetches all `slugs` concurrently and folds the results into a snapshot.
///
/// The batch fails as a whole when any single fetch fails. Duplicate slugs are
/// summed, and the reserved glossary slug is stored under its canonical key.
pub async fn fetch_all_stats<S>(source: &S, slugs: &[ResourceSlug]) -> Result<Snapshot>
where
    S: StatsSource + ?Sized,
{
    let results = try_join_all(slugs.iter().map(|slug| source.fetch_resource_stat(slug))).await?;

    let snapshot = results
        .into_iter()
        .fold(Snapshot::new(), |mut snapshot, (slug, record)| {
            let total = snapshot.get(slug.as_str()).copied().unwrap_or(StatRecord::ZERO) + record;
            snapshot.insert(slug, total);
            snapshot
        });

    Ok(rename_glossary(snapshot))
}
