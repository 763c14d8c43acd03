//! The two scheduled jobs: daily snapshot and periodic report.

use crate::aggregator::group_snapshot;
use crate::client::fetch_all_stats;
use crate::report::{compute_delta, filter_reportable_fields, format_report, FieldFormats};
use crate::store::SnapshotStore;
use crate::traits::{Notifier, StatsSource};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, instrument};
use txstats_common::{MissingReferencePolicy, Result, StatField};
use txstats_config::ReportConfig;

/// Everything the report job needs to know.
#[derive(Debug, Clone)]
pub struct ReportSettings {
    /// Stored snapshots between the compared pair.
    pub window_days: u32,
    /// Collapse sub-resources into their group.
    pub group_by_prefix: bool,
    /// Fields included in the message.
    pub fields: Vec<StatField>,
    /// Handling of resources missing from the reference snapshot.
    pub missing_reference: MissingReferencePolicy,
    /// Labels and formatters per field.
    pub formats: FieldFormats,
}

impl From<&ReportConfig> for ReportSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            window_days: config.window_days,
            group_by_prefix: config.group_by_prefix,
            fields: config.fields.clone(),
            missing_reference: config.missing_reference,
            formats: FieldFormats::default(),
        }
    }
}

/// Downloads the current statistics and stores them as the snapshot of `today`.
#[instrument(skip(source, store))]
pub async fn take_snapshot<S>(source: &S, store: &SnapshotStore, today: NaiveDate) -> Result<PathBuf>
where
    S: StatsSource + ?Sized,
{
    info!("Collecting translation statistics");

    let slugs = source.list_resources().await?;
    let snapshot = fetch_all_stats(source, &slugs).await?;

    info!("Fetched statistics for {} resources", snapshot.len());
    store.write_snapshot(&snapshot, today)
}

/// Builds the report message from the stored snapshots.
///
/// `Ok(None)` means nothing reportable changed.
pub fn build_report(store: &SnapshotStore, settings: &ReportSettings) -> Result<Option<String>> {
    let pair = store.select_comparison_pair(settings.window_days)?;
    info!(
        "Building report for {} against {}",
        pair.latest_date, pair.reference_date
    );

    let latest = group_snapshot(&pair.latest, settings.group_by_prefix);
    let reference = group_snapshot(&pair.reference, settings.group_by_prefix);

    let delta = compute_delta(&latest, &reference, settings.missing_reference)?;
    let delta = filter_reportable_fields(delta, &settings.fields);

    Ok(format_report(&delta, pair.span_days(), &settings.formats))
}

/// Builds the report and hands it to `notifier`.
///
/// Returns whether a message was sent.
#[instrument(skip_all)]
pub async fn publish_report<N>(store: &SnapshotStore, notifier: &N, settings: &ReportSettings) -> Result<bool>
where
    N: Notifier + ?Sized,
{
    match build_report(store, settings)? {
        Some(message) => {
            notifier.send(&message).await?;
            info!("Report sent");
            Ok(true)
        }
        None => {
            info!("No changes to report");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockNotifier, MockStatsSource};
    use mockall::predicate::*;
    use txstats_common::test_utils::snapshot_fixtures::{raw_snapshot, record};
    use txstats_common::test_utils::{create_temp_dir, date};
    use txstats_common::{ResourceSlug, Snapshot, TxError};

    fn settings() -> ReportSettings {
        ReportSettings::from(&ReportConfig::default())
    }

    #[tokio::test]
    async fn test_take_snapshot_writes_todays_file() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());

        let mut source = MockStatsSource::new();
        source.expect_list_resources().times(1).returning(|| {
            Ok(vec![ResourceSlug::new("about"), ResourceSlug::new("glossary_")])
        });
        source
            .expect_fetch_resource_stat()
            .times(2)
            .returning(|slug| Ok((slug.clone(), record(1, 10))));

        let path = take_snapshot(&source, &store, date(2024, 5, 6)).await.unwrap();
        assert!(path.ends_with("2024-05-06.json"));

        let stored = store.read_snapshot(date(2024, 5, 6)).unwrap();
        assert_eq!(stored.get("glossary"), Some(&record(1, 10)));
        assert!(!stored.contains("glossary_"));
    }

    #[tokio::test]
    async fn test_failed_download_writes_nothing() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());

        let mut source = MockStatsSource::new();
        source
            .expect_list_resources()
            .returning(|| Err(TxError::remote_unavailable("connection refused")));

        assert!(take_snapshot(&source, &store, date(2024, 5, 6)).await.is_err());
        assert!(store.list_snapshot_dates().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_sends_grouped_report() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());
        let reference: Snapshot = [("c-api--abstract", record(0, 0)), ("about", record(2, 20))]
            .into_iter()
            .collect();
        store.write_snapshot(&reference, date(2024, 5, 1)).unwrap();
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 8)).unwrap();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|message: &str| {
                message.contains("**c-api**\nreviewed strings: +15\ntranslated words: +150")
                    && message.contains("**glossary**\ntranslated words: +300")
                    && !message.contains("**about**")
            })
            .times(1)
            .returning(|_| Ok(()));

        assert!(publish_report(&store, &notifier, &settings()).await.unwrap());
    }

    #[test]
    fn test_short_history_reports_actual_span() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());
        store.write_snapshot(&Snapshot::new(), date(2024, 5, 1)).unwrap();
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 4)).unwrap();

        let message = build_report(&store, &settings()).unwrap().unwrap();
        assert!(message.starts_with("**Translation progress over the last 3 days**"));
    }

    #[tokio::test]
    async fn test_publish_skips_unchanged() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 1)).unwrap();
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 2)).unwrap();

        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();

        assert!(!publish_report(&store, &notifier, &settings()).await.unwrap());
    }

    #[tokio::test]
    async fn test_publish_without_snapshots_fails() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());

        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();

        let result = publish_report(&store, &notifier, &settings()).await;
        assert!(matches!(result, Err(TxError::StoreRead { .. })));
    }

    #[tokio::test]
    async fn test_notifier_error_propagates() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());
        store.write_snapshot(&Snapshot::new(), date(2024, 5, 1)).unwrap();
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 2)).unwrap();

        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .with(always())
            .returning(|_| Err(TxError::notify("channel gone")));

        let result = publish_report(&store, &notifier, &settings()).await;
        assert!(matches!(result, Err(TxError::Notify { .. })));
    }

    #[test]
    fn test_strict_policy_surfaces_new_resources() {
        let dir = create_temp_dir();
        let store = SnapshotStore::new(dir.path());
        store.write_snapshot(&Snapshot::new(), date(2024, 5, 1)).unwrap();
        store.write_snapshot(&raw_snapshot(), date(2024, 5, 2)).unwrap();

        let strict = ReportSettings {
            missing_reference: MissingReferencePolicy::Fail,
            ..settings()
        };
        let err = build_report(&store, &strict).unwrap_err();
        assert!(matches!(err, TxError::MissingReferenceResource { .. }));
    }
}
