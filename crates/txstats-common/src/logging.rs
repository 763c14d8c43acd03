//! Structured logging infrastructure for txstats

use crate::error::{Result, TxError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Line format of emitted log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One short line per event.
    #[default]
    Compact,
    /// Multi-line, human oriented output.
    Pretty,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Every format, in declaration order.
    pub const ALL: [Self; 3] = [Self::Compact, Self::Pretty, Self::Json];

    /// Name used in configuration files and environment variables.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == name)
            .ok_or_else(|| TxError::validation_field(format!("unknown log format '{s}'"), "format"))
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "txstats_core=debug")
    pub level: String,
    /// Line format
    pub format: LogFormat,
    /// Append log output to this file instead of stdout
    pub file_path: Option<PathBuf>,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            file_path: None,
            include_targets: true,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins over the configured level when it is set and valid.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Destination writer, and whether it should receive ANSI colors.
    fn writer(&self) -> Result<(BoxMakeWriter, bool)> {
        let Some(path) = &self.file_path else {
            return Ok((BoxMakeWriter::new(std::io::stdout), true));
        };

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                TxError::config_with_source(format!("cannot open log file {}", path.display()), e)
            })?;
        Ok((BoxMakeWriter::new(Mutex::new(file)), false))
    }
}

/// Initialize the tracing subscriber with the given configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    let (writer, ansi) = config.writer()?;
    let layer = tracing_subscriber::fmt::layer()
        .with_target(config.include_targets)
        .with_ansi(ansi)
        .with_writer(writer);

    let result = match config.format {
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };

    result.map_err(|e| TxError::config(format!("failed to initialize logging: {e}")))
}
