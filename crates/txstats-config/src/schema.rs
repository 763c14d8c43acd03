//! Configuration schema definitions using serde.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use txstats_common::{ChannelId, LoggingConfig, MissingReferencePolicy, StatField, TxError};

/// Format of the `HH:MM` wall-clock settings.
pub const TIME_FORMAT: &str = "%H:%M";

/// Main configuration structure for txstats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transifex API configuration.
    pub transifex: TransifexConfig,
    /// Snapshot storage configuration.
    pub storage: StorageConfig,
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Scheduling configuration.
    pub scheduling: SchedulingConfig,
    /// Weekly report configuration.
    pub report: ReportConfig,
    /// Log output configuration.
    pub logging: LoggingConfig,
}

/// Transifex API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransifexConfig {
    /// Project API base URL, e.g. `https://www.transifex.com/api/2/project/python-newest/`.
    pub api_url: String,
    /// API token, sent as the basic-auth password.
    pub api_token: String,
    /// Locale whose statistics are collected.
    pub locale: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Client-side request rate limit.
    pub rate_limit_per_sec: u32,
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one `<YYYY-MM-DD>.json` file per day.
    pub output_dir: PathBuf,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Channels the weekly report is posted to.
    pub channels: Vec<ChannelId>,
}

/// Scheduling configuration. Times are `HH:MM` in UTC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Time of the daily snapshot.
    pub daily_time: String,
    /// Time of the weekly report.
    pub report_time: String,
    /// Weekday of the weekly report (`Mon`, `tuesday`, ...).
    pub report_weekday: String,
    /// Take a snapshot immediately when the scheduler starts.
    pub run_on_startup: bool,
}

/// Weekly report configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of snapshots between the two compared snapshots.
    pub window_days: u32,
    /// Merge `group--sub` resources under `group` before comparing.
    pub group_by_prefix: bool,
    /// Fields included in the report.
    pub fields: Vec<StatField>,
    /// Handling of resources with no reference counterpart.
    pub missing_reference: MissingReferencePolicy,
}

impl SchedulingConfig {
    /// Parsed daily snapshot time.
    pub fn daily_time(&self) -> Result<NaiveTime, TxError> {
        parse_time(&self.daily_time, "daily_time")
    }

    /// Parsed weekly report time.
    pub fn report_time(&self) -> Result<NaiveTime, TxError> {
        parse_time(&self.report_time, "report_time")
    }

    /// Parsed weekly report weekday.
    pub fn report_weekday(&self) -> Result<Weekday, TxError> {
        self.report_weekday.trim().parse::<Weekday>().map_err(|_| {
            TxError::validation_field(
                format!("invalid weekday '{}'", self.report_weekday),
                "report_weekday",
            )
        })
    }
}

fn parse_time(value: &str, field: &str) -> Result<NaiveTime, TxError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        TxError::validation_field(format!("invalid time '{value}', expected HH:MM"), field)
    })
}
