//! Error types and utilities for txstats

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for txstats operations
pub type Result<T> = std::result::Result<T, TxError>;

/// Main error type for txstats operations
#[derive(Error, Debug)]
pub enum TxError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The statistics platform could not be reached (network failure, timeout)
    #[error("Remote unavailable: {message}")]
    RemoteUnavailable {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The statistics platform answered with something we could not use
    #[error("Remote protocol error: {message}")]
    RemoteProtocol {
        /// Human readable description
        message: String,
        /// HTTP status, when the failure came from a non-success response
        status_code: Option<u16>,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A snapshot could not be written
    #[error("Snapshot write error: {message}")]
    StoreWrite {
        /// Human readable description
        message: String,
        /// File involved, if known
        path: Option<PathBuf>,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A snapshot could not be read or decoded
    #[error("Snapshot read error: {message}")]
    StoreRead {
        /// Human readable description
        message: String,
        /// File involved, if known
        path: Option<PathBuf>,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A resource of the latest snapshot has no counterpart in the reference snapshot
    #[error("Resource '{resource}' is missing from the reference snapshot")]
    MissingReferenceResource {
        /// Slug of the missing resource
        resource: String,
    },

    /// Sending a notification failed
    #[error("Notification error: {message}")]
    Notify {
        /// Human readable description
        message: String,
        /// Underlying cause
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        /// Human readable description
        message: String,
        /// Offending field, if known
        field: Option<String>,
    },
}

impl TxError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new remote-unavailable error
    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new remote-unavailable error with source
    pub fn remote_unavailable_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RemoteUnavailable {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new remote protocol error with HTTP status code
    pub fn remote_protocol_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::RemoteProtocol {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new remote protocol error with source
    pub fn remote_protocol_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::RemoteProtocol {
            message: msg.into(),
            status_code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new snapshot write error for `path`
    pub fn store_write(
        msg: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreWrite {
            message: msg.into(),
            path: Some(path.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new snapshot read error for `path`
    pub fn store_read(
        msg: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StoreRead {
            message: msg.into(),
            path: Some(path.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Create a snapshot read error that is not tied to one file
    pub fn store_read_msg(msg: impl Into<String>) -> Self {
        Self::StoreRead {
            message: msg.into(),
            path: None,
            source: None,
        }
    }

    /// Create a missing-reference error for `resource`
    pub fn missing_reference(resource: impl Into<String>) -> Self {
        Self::MissingReferenceResource {
            resource: resource.into(),
        }
    }

    /// Create a new notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether the error came from the transport rather than the payload
    pub const fn is_remote_unavailable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }
}

/// Convert from reqwest::Error to TxError
impl From<reqwest::Error> for TxError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::remote_unavailable_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::remote_unavailable_with_source("Connection failed", err)
        } else if err.is_status() {
            let status_code = err.status().map(|s| s.as_u16());
            Self::RemoteProtocol {
                message: format!("HTTP error: {}", status_code.unwrap_or(0)),
                status_code,
                source: Some(Box::new(err)),
            }
        } else if err.is_decode() || err.is_body() {
            Self::remote_protocol_with_source("Malformed response body", err)
        } else {
            Self::remote_unavailable_with_source("Network request failed", err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let config_error = TxError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let protocol_error = TxError::remote_protocol_with_status("Server error", 500);
        assert!(protocol_error.to_string().contains("Remote protocol error"));
        assert!(matches!(
            protocol_error,
            TxError::RemoteProtocol {
                status_code: Some(500),
                ..
            }
        ));

        let validation_error = TxError::validation_field("Invalid input", "daily_time");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(validation_error.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped = TxError::store_read("Failed to read snapshot", "data/2024-01-01.json", io_error);

        assert!(wrapped.to_string().contains("Failed to read snapshot"));
        assert!(wrapped.source().is_some());
        match wrapped {
            TxError::StoreRead { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("data/2024-01-01.json")));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_missing_reference_display() {
        let error = TxError::missing_reference("c-api");
        assert_eq!(
            error.to_string(),
            "Resource 'c-api' is missing from the reference snapshot"
        );
    }

    #[test]
    fn test_remote_unavailable_predicate() {
        assert!(TxError::remote_unavailable("down").is_remote_unavailable());
        assert!(!TxError::remote_protocol_with_status("Not found", 404).is_remote_unavailable());
    }

    #[test]
    fn test_error_chain_preservation() {
        let root_error = io::Error::new(io::ErrorKind::NotFound, "Root cause");
        let middle_error = TxError::config_with_source("Middle layer", root_error);
        let top_error = TxError::store_write("Top layer", "data/2024-01-01.json", middle_error);

        let mut current_error: &dyn std::error::Error = &top_error;
        let mut error_count = 0;

        while let Some(source) = current_error.source() {
            current_error = source;
            error_count += 1;
        }

        assert_eq!(error_count, 2);
    }
}
