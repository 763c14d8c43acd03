//! Configuration loading utilities

use crate::validator::ConfigValidator;
use crate::Config;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use txstats_common::{parse_list, ChannelId, LogFormat, MissingReferencePolicy, StatField};

/// Environment variable naming an optional YAML configuration file.
pub const CONFIG_PATH_VAR: &str = "TXSTATS_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file {path}: {source}")]
    IoError {
        /// File that could not be read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable
        var: String,
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] txstats_common::TxError),
}

impl From<ConfigError> for txstats_common::TxError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner,
            other => Self::config_with_source("Configuration loading error", other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        info!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        Self::finish(config, |var| env::var(var).ok())
    }

    /// Load configuration from environment variables and an optional file.
    ///
    /// The file is taken from `TXSTATS_CONFIG_PATH`, then `config.yaml` in the
    /// working directory; without either, defaults are used. Environment
    /// variables override file values in every case.
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_from_file(config_path);
        }
        if Path::new("config.yaml").exists() {
            return Self::load_from_file("config.yaml");
        }
        debug!("No configuration file found, using defaults");
        Self::finish(Config::default(), |var| env::var(var).ok())
    }

    /// Builds a configuration from defaults and the given variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::finish(Config::default(), lookup)
    }

    fn finish<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::apply_env_overrides(&mut config, lookup)?;
        ConfigValidator::validate_structure(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Transifex configuration overrides
        if let Some(url) = lookup("TRANSIFEX_API_URL") {
            config.transifex.api_url = url;
        }

        if let Some(token) = lookup("TRANSIFEX_API_TOKEN") {
            config.transifex.api_token = token;
        }

        if let Some(locale) = lookup("TRANSIFEX_LOCALE") {
            config.transifex.locale = locale;
        }

        if let Some(timeout) = lookup("TRANSIFEX_TIMEOUT") {
            config.transifex.timeout_seconds = parse_var("TRANSIFEX_TIMEOUT", &timeout)?;
        }

        if let Some(rate) = lookup("TRANSIFEX_RATE_LIMIT") {
            config.transifex.rate_limit_per_sec = parse_var("TRANSIFEX_RATE_LIMIT", &rate)?;
        }

        // Storage
        if let Some(output) = lookup("OUTPUT_DATA") {
            config.storage.output_dir = PathBuf::from(output);
        }

        // Discord configuration overrides
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Some(channels) = lookup("DISCORD_CHANNELS") {
            config.discord.channels = parse_list(&channels)
                .iter()
                .map(|id| parse_var::<ChannelId>("DISCORD_CHANNELS", id))
                .collect::<Result<_, _>>()?;
        }

        // Scheduling configuration overrides
        if let Some(time) = lookup("DAILY_STATS_TIME") {
            config.scheduling.daily_time = time;
        }

        if let Some(time) = lookup("WEEKLY_REPORT_TIME") {
            config.scheduling.report_time = time;
        }

        if let Some(day) = lookup("WEEKLY_REPORT_DAY") {
            config.scheduling.report_weekday = day;
        }

        if let Some(enabled) = lookup("RUN_ON_STARTUP") {
            config.scheduling.run_on_startup = parse_var("RUN_ON_STARTUP", &enabled)?;
        }

        // Report configuration overrides
        if let Some(window) = lookup("REPORT_WINDOW_DAYS") {
            config.report.window_days = parse_var("REPORT_WINDOW_DAYS", &window)?;
        }

        if let Some(group) = lookup("REPORT_GROUP_BY_PREFIX") {
            config.report.group_by_prefix = parse_var("REPORT_GROUP_BY_PREFIX", &group)?;
        }

        if let Some(fields) = lookup("REPORT_FIELDS") {
            config.report.fields = parse_list(&fields)
                .iter()
                .map(|field| parse_var::<StatField>("REPORT_FIELDS", field))
                .collect::<Result<_, _>>()?;
        }

        if let Some(policy) = lookup("REPORT_MISSING_REFERENCE") {
            config.report.missing_reference =
                parse_var::<MissingReferencePolicy>("REPORT_MISSING_REFERENCE", &policy)?;
        }

        // Logging configuration overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.format = parse_var::<LogFormat>("LOG_FORMAT", &format)?;
        }

        if let Some(file) = lookup("LOG_FILE") {
            config.logging.file_path = (!file.trim().is_empty()).then(|| PathBuf::from(file.trim()));
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ConfigLoader::from_lookup(|_| None).unwrap();
        assert_eq!(config.transifex.locale, "pt_BR");
        assert_eq!(config.report.window_days, 7);
        assert_eq!(config.storage.output_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::from_lookup(lookup_from(&[
            ("TRANSIFEX_API_TOKEN", "secret"),
            ("OUTPUT_DATA", "/var/lib/txstats"),
            ("DISCORD_CHANNELS", "111, 222"),
            ("REPORT_FIELDS", "reviewed,untranslated_words"),
            ("REPORT_MISSING_REFERENCE", "fail"),
            ("RUN_ON_STARTUP", "false"),
        ]))
        .unwrap();

        assert_eq!(config.transifex.api_token, "secret");
        assert_eq!(config.storage.output_dir, PathBuf::from("/var/lib/txstats"));
        assert_eq!(config.discord.channels, vec![ChannelId(111), ChannelId(222)]);
        assert_eq!(
            config.report.fields,
            vec![StatField::Reviewed, StatField::UntranslatedWords]
        );
        assert_eq!(config.report.missing_reference, MissingReferencePolicy::Fail);
        assert!(!config.scheduling.run_on_startup);
    }

    #[test]
    fn test_logging_overrides() {
        let config = ConfigLoader::from_lookup(lookup_from(&[
            ("LOG_LEVEL", "debug"),
            ("LOG_FORMAT", "json"),
            ("LOG_FILE", "/var/log/txstats.log"),
        ]))
        .unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.logging.file_path,
            Some(PathBuf::from("/var/log/txstats.log"))
        );
    }

    #[test]
    fn test_unknown_log_format_names_variable() {
        let err = ConfigLoader::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(err.to_string().contains("LOG_FORMAT"));
    }

    #[test]
    fn test_env_parse_error_names_variable() {
        let err = ConfigLoader::from_lookup(lookup_from(&[("REPORT_WINDOW_DAYS", "a week")]))
            .unwrap_err();
        assert!(err.to_string().contains("REPORT_WINDOW_DAYS"));
    }

    #[test]
    fn test_invalid_time_fails_validation() {
        let err = ConfigLoader::from_lookup(lookup_from(&[("DAILY_STATS_TIME", "midnight")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
