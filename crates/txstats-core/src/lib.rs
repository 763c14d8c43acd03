//! # txstats core
//!
//! Collection, storage and comparison of Transifex translation statistics.
//!
//! The daily job downloads the statistics of every project resource and
//! stores them as a dated snapshot. The report job compares the latest
//! snapshot against an older one and renders the changes as a message.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod client;
pub mod jobs;
pub mod report;
pub mod store;
pub mod traits;

pub use aggregator::{group_snapshot, rename_glossary};
pub use client::{fetch_all_stats, TransifexClient};
pub use jobs::{build_report, publish_report, take_snapshot, ReportSettings};
pub use report::{
    compute_delta, filter_reportable_fields, format_report, DeltaReport, FieldDeltas, FieldFormat,
    FieldFormats,
};
pub use store::{ComparisonPair, SnapshotStore};
pub use traits::{Notifier, StatsSource};
