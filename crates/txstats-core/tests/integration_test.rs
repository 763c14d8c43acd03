//! Integration tests for txstats-core crate.
//!
//! These run both jobs end to end against an in-memory statistics source and
//! a recording notifier.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use txstats_common::test_utils::snapshot_fixtures::record;
use txstats_common::test_utils::{create_temp_dir, date, init_test_logging};
use txstats_common::{ResourceSlug, Result, StatRecord, TxError};
use txstats_config::ReportConfig;
use txstats_core::{
    publish_report, take_snapshot, Notifier, ReportSettings, SnapshotStore, StatsSource,
};

/// Serves whatever statistics the test put in.
struct FakeSource {
    stats: Mutex<BTreeMap<String, StatRecord>>,
}

impl FakeSource {
    fn new(entries: &[(&str, StatRecord)]) -> Self {
        Self {
            stats: Mutex::new(entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()),
        }
    }

    fn set(&self, slug: &str, stats: StatRecord) {
        self.stats.lock().unwrap().insert(slug.to_string(), stats);
    }
}

#[async_trait]
impl StatsSource for FakeSource {
    async fn list_resources(&self) -> Result<Vec<ResourceSlug>> {
        Ok(self.stats.lock().unwrap().keys().map(|k| ResourceSlug::new(k.as_str())).collect())
    }

    async fn fetch_resource_stat(&self, slug: &ResourceSlug) -> Result<(ResourceSlug, StatRecord)> {
        self.stats
            .lock()
            .unwrap()
            .get(slug.as_str())
            .map(|stats| (slug.clone(), *stats))
            .ok_or_else(|| TxError::remote_protocol_with_status("not found", 404))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_week_of_snapshots_then_report() {
    init_test_logging();
    let dir = create_temp_dir();
    let store = SnapshotStore::new(dir.path().join("data"));
    let source = FakeSource::new(&[
        ("c-api--abstract", record(0, 0)),
        ("c-api--buffer", record(0, 0)),
        ("tutorial--index", record(10, 100)),
        ("glossary_", record(0, 50)),
    ]);

    for day in 1..=8 {
        source.set("c-api--abstract", record(u64::from(day), 10 * u64::from(day)));
        take_snapshot(&source, &store, date(2024, 4, day)).await.unwrap();
    }

    assert_eq!(store.list_snapshot_dates().unwrap().len(), 8);

    let notifier = RecordingNotifier::default();
    let settings = ReportSettings::from(&ReportConfig::default());
    assert!(publish_report(&store, &notifier, &settings).await.unwrap());

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        "**Translation progress over the last 7 days**\n\n\
         **c-api**\nreviewed strings: +7\ntranslated words: +70"
    );
}

#[tokio::test]
async fn test_new_resource_appears_in_report() {
    init_test_logging();
    let dir = create_temp_dir();
    let store = SnapshotStore::new(dir.path());
    let source = FakeSource::new(&[("about", record(1, 10))]);

    take_snapshot(&source, &store, date(2024, 4, 1)).await.unwrap();
    source.set("whatsnew--3_13", record(4, 40));
    take_snapshot(&source, &store, date(2024, 4, 2)).await.unwrap();

    let notifier = RecordingNotifier::default();
    let settings = ReportSettings::from(&ReportConfig::default());
    publish_report(&store, &notifier, &settings).await.unwrap();

    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].contains("**whatsnew**\nreviewed strings: +4\ntranslated words: +40"));
    assert!(!sent[0].contains("about"));
}

#[tokio::test]
async fn test_ungrouped_report_keeps_sub_resources() {
    let dir = create_temp_dir();
    let store = SnapshotStore::new(dir.path());
    let source = FakeSource::new(&[("library--os", record(0, 0)), ("library--sys", record(0, 0))]);

    take_snapshot(&source, &store, date(2024, 4, 1)).await.unwrap();
    source.set("library--os", record(2, 0));
    take_snapshot(&source, &store, date(2024, 4, 2)).await.unwrap();

    let notifier = RecordingNotifier::default();
    let settings = ReportSettings::from(&ReportConfig {
        group_by_prefix: false,
        ..ReportConfig::default()
    });
    publish_report(&store, &notifier, &settings).await.unwrap();

    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].contains("**library--os**\nreviewed strings: +2"));
    assert!(!sent[0].contains("library--sys"));
}

#[tokio::test]
async fn test_snapshot_file_is_plain_json() {
    let dir = create_temp_dir();
    let store = SnapshotStore::new(dir.path());
    let source = FakeSource::new(&[("about", record(1, 2)), ("bugs", record(3, 4))]);

    let path = take_snapshot(&source, &store, date(2024, 4, 1)).await.unwrap();
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(raw["about"]["reviewed"], 1);
    assert_eq!(raw["bugs"]["translated_words"], 4);
    assert_eq!(raw["bugs"]["untranslated_words"], 0);
}
