//! # txstats bot
//!
//! Scheduled collection of Transifex translation statistics with periodic
//! progress reports posted to Discord.
//!
//! This crate wires configuration, the statistics pipeline, the cron
//! scheduler and the Discord notifier into the `txstats` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod error;
pub mod notifier;
pub mod scheduler;

pub use app::*;
pub use error::*;
pub use notifier::*;
pub use scheduler::*;
