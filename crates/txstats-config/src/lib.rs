//! # txstats config
//!
//! Type-safe configuration management for txstats.
//!
//! Configuration is read once at process start (optional YAML file, then
//! environment overrides), validated, and handed to each component by value.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
