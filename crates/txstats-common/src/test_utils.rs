//! Test utilities and shared test helpers for txstats.
//!
//! Fixtures and proptest strategies used by unit and integration tests across
//! the workspace. Enabled with the `testing` feature.

use chrono::NaiveDate;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Shorthand for a calendar date in tests.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Snapshot fixtures.
pub mod snapshot_fixtures {
    use crate::{Snapshot, StatRecord};

    /// A record with only `reviewed` and `translated_words` set.
    pub fn record(reviewed: u64, translated_words: u64) -> StatRecord {
        StatRecord {
            reviewed,
            translated_words,
            ..StatRecord::ZERO
        }
    }

    /// A record with every counter set.
    pub fn full_record(
        reviewed: u64,
        translated_entities: u64,
        translated_words: u64,
        untranslated_entities: u64,
        untranslated_words: u64,
    ) -> StatRecord {
        StatRecord {
            reviewed,
            translated_entities,
            translated_words,
            untranslated_entities,
            untranslated_words,
        }
    }

    /// Raw platform-shaped snapshot with sub-resources and the reserved glossary slug.
    pub fn raw_snapshot() -> Snapshot {
        [
            ("c-api--abstract", record(10, 100)),
            ("c-api--allocation", record(5, 50)),
            ("library--asyncio", record(1, 1_000)),
            ("about", record(2, 20)),
            ("glossary_", record(0, 300)),
        ]
        .into_iter()
        .collect()
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use crate::{ResourceSlug, Snapshot, StatRecord};
    use proptest::prelude::*;

    /// Strategy for records with counters small enough to never overflow when summed.
    pub fn stat_record_strategy() -> impl Strategy<Value = StatRecord> {
        (0u64..100_000, 0u64..100_000, 0u64..1_000_000, 0u64..100_000, 0u64..1_000_000).prop_map(
            |(reviewed, translated_entities, translated_words, untranslated_entities, untranslated_words)| {
                StatRecord {
                    reviewed,
                    translated_entities,
                    translated_words,
                    untranslated_entities,
                    untranslated_words,
                }
            },
        )
    }

    /// Strategy for platform-like slugs, optionally with a `--` sub-resource part.
    pub fn slug_strategy() -> impl Strategy<Value = ResourceSlug> {
        (r"[a-z][a-z0-9_]{0,10}", proptest::option::of(r"[a-z][a-z0-9_]{0,10}")).prop_map(
            |(group, sub)| match sub {
                Some(sub) => ResourceSlug::new(format!("{group}--{sub}")),
                None => ResourceSlug::new(group),
            },
        )
    }

    /// Strategy for snapshots of up to `max_len` resources.
    pub fn snapshot_strategy(max_len: usize) -> impl Strategy<Value = Snapshot> {
        proptest::collection::btree_map(slug_strategy(), stat_record_strategy(), 0..max_len)
            .prop_map(|records| records.into_iter().collect())
    }
}
