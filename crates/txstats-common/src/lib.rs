//! # txstats common
//!
//! Shared types, errors, and utilities for the txstats workspace.
//!
//! This crate provides the data model (resource slugs, stat records and
//! snapshots), the error taxonomy and the logging setup used by every other
//! crate in the workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{Result, TxError};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
