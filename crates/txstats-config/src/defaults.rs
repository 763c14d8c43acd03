//! Default values.

use crate::schema::*;
use std::path::PathBuf;
use txstats_common::{LoggingConfig, MissingReferencePolicy, StatField};

/// API base URL of the Python documentation project.
pub const DEFAULT_API_URL: &str = "https://www.transifex.com/api/2/project/python-newest/";

/// Locale tracked by default.
pub const DEFAULT_LOCALE: &str = "pt_BR";

/// Default comparison window of the weekly report.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

impl Default for Config {
    fn default() -> Self {
        Self {
            transifex: TransifexConfig::default(),
            storage: StorageConfig::default(),
            discord: DiscordConfig::default(),
            scheduling: SchedulingConfig::default(),
            report: ReportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TransifexConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: String::new(),
            locale: DEFAULT_LOCALE.to_string(),
            timeout_seconds: 30,
            rate_limit_per_sec: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            channels: Vec::new(),
        }
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            daily_time: "00:00".to_string(),
            report_time: "09:00".to_string(),
            report_weekday: "Mon".to_string(),
            run_on_startup: true,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            group_by_prefix: true,
            fields: vec![StatField::Reviewed, StatField::TranslatedWords],
            missing_reference: MissingReferencePolicy::default(),
        }
    }
}
