//! Configuration validation.
//!
//! Structural checks run on every load. Credential checks depend on what the
//! process is about to do: downloading a snapshot only needs the Transifex
//! token, reporting also needs Discord.

use crate::schema::Config;
use txstats_common::{Result, TxError};
use url::Url;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Checks values that must be well-formed regardless of the command being run.
    pub fn validate_structure(config: &Config) -> Result<()> {
        Url::parse(&config.transifex.api_url).map_err(|e| {
            TxError::validation_field(
                format!("invalid API URL '{}': {e}", config.transifex.api_url),
                "api_url",
            )
        })?;

        if config.transifex.locale.trim().is_empty() {
            return Err(TxError::validation_field("locale cannot be empty", "locale"));
        }

        if config.transifex.rate_limit_per_sec == 0 {
            return Err(TxError::validation_field(
                "rate limit must be greater than 0",
                "rate_limit_per_sec",
            ));
        }

        if config.transifex.timeout_seconds == 0 {
            return Err(TxError::validation_field(
                "timeout must be greater than 0",
                "timeout_seconds",
            ));
        }

        config.scheduling.daily_time()?;
        config.scheduling.report_time()?;
        config.scheduling.report_weekday()?;

        if config.report.window_days == 0 {
            return Err(TxError::validation_field(
                "report window must be at least one day",
                "window_days",
            ));
        }

        if config.report.fields.is_empty() {
            return Err(TxError::validation_field(
                "at least one report field is required",
                "fields",
            ));
        }

        Ok(())
    }

    /// Checks what is needed to talk to Transifex.
    pub fn validate_remote(config: &Config) -> Result<()> {
        if config.transifex.api_token.is_empty() {
            return Err(TxError::config("Transifex API token cannot be empty"));
        }
        Ok(())
    }

    /// Checks what is needed to post reports.
    pub fn validate_discord(config: &Config) -> Result<()> {
        if config.discord.token.is_empty() {
            return Err(TxError::config("Discord token cannot be empty"));
        }
        if config.discord.channels.is_empty() {
            return Err(TxError::config("At least one Discord channel is required"));
        }
        if config.discord.channels.iter().any(|channel| channel.0 == 0) {
            return Err(TxError::validation_field("channel id 0 is not valid", "channels"));
        }
        Ok(())
    }

    /// Validates everything the scheduler needs.
    pub fn validate(config: &Config) -> Result<()> {
        Self::validate_structure(config)?;
        Self::validate_remote(config)?;
        Self::validate_discord(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txstats_common::ChannelId;

    #[test]
    fn test_default_config_is_structurally_valid() {
        assert!(ConfigValidator::validate_structure(&Config::default()).is_ok());
    }

    #[test]
    fn test_default_config_lacks_credentials() {
        let config = Config::default();
        assert!(ConfigValidator::validate_remote(&config).is_err());
        assert!(ConfigValidator::validate_discord(&config).is_err());
    }

    #[test]
    fn test_full_validation() {
        let mut config = Config::default();
        config.transifex.api_token = "token".to_string();
        config.discord.token = "discord".to_string();
        config.discord.channels = vec![ChannelId(42)];
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_channel_rejected() {
        let mut config = Config::default();
        config.discord.token = "discord".to_string();
        config.discord.channels = vec![ChannelId(0)];
        assert!(ConfigValidator::validate_discord(&config).is_err());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = Config::default();
        config.report.window_days = 0;
        let err = ConfigValidator::validate_structure(&config).unwrap_err();
        assert!(matches!(
            err,
            TxError::Validation { field: Some(ref f), .. } if f == "window_days"
        ));
    }

    #[test]
    fn test_bad_url_rejected() {
        let mut config = Config::default();
        config.transifex.api_url = "not a url".to_string();
        assert!(ConfigValidator::validate_structure(&config).is_err());
    }
}
