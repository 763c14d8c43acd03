//! Property tests for the snapshot data model.

use proptest::prelude::*;
use std::collections::BTreeMap;
use txstats_common::{ResourceSlug, Snapshot, StatField, StatRecord};

fn record_strategy() -> impl Strategy<Value = StatRecord> {
    proptest::collection::vec(0u64..1_000_000, 5).prop_map(|values| {
        let mut record = StatRecord::ZERO;
        for (field, value) in StatField::ALL.into_iter().zip(values) {
            record.set(field, value);
        }
        record
    })
}

proptest! {
    #[test]
    fn test_property_record_serde_preserves_values(record in record_strategy()) {
        let json = serde_json::to_string(&record).unwrap();
        let decoded: StatRecord = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, record);
    }

    #[test]
    fn test_property_record_addition_is_fieldwise(a in record_strategy(), b in record_strategy()) {
        let sum = a + b;
        for field in StatField::ALL {
            prop_assert_eq!(sum.get(field), a.get(field) + b.get(field));
        }
    }

    #[test]
    fn test_property_snapshot_keys_written_descending(
        records in proptest::collection::btree_map("[a-z]{1,8}[0-9]", record_strategy(), 0..20)
    ) {
        let snapshot: Snapshot = records
            .iter()
            .map(|(slug, record)| (ResourceSlug::from(slug.as_str()), *record))
            .collect();

        let json = serde_json::to_string(&snapshot).unwrap();
        let mut positions: Vec<(usize, &String)> = records
            .keys()
            .map(|slug| (json.find(&format!("\"{slug}\":")).unwrap(), slug))
            .collect();
        positions.sort();
        let written: Vec<&String> = positions.into_iter().map(|(_, slug)| slug).collect();
        let mut expected: Vec<&String> = records.keys().collect();
        expected.reverse();
        prop_assert_eq!(written, expected);

        let decoded: BTreeMap<String, StatRecord> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, records);
    }
}
