//! Snapshot normalization before comparison.

use std::collections::BTreeMap;
use txstats_common::{Snapshot, StatRecord, GLOSSARY_RESERVED_SLUG, GLOSSARY_SLUG};

/// Moves the record stored under the reserved glossary slug to its canonical key.
///
/// An existing canonical record is replaced. Snapshots without the reserved
/// slug are returned unchanged.
pub fn rename_glossary(mut snapshot: Snapshot) -> Snapshot {
    if let Some(record) = snapshot.remove(GLOSSARY_RESERVED_SLUG) {
        snapshot.insert(GLOSSARY_SLUG, record);
    }
    snapshot
}

/// Collapses sub-resources into their group and renames the glossary.
///
/// With `group_by_prefix` every slug is keyed by the text before its first
/// `--`, and the records of one group are summed fieldwise. Without it only the
/// glossary rename applies.
pub fn group_snapshot(snapshot: &Snapshot, group_by_prefix: bool) -> Snapshot {
    if !group_by_prefix {
        return rename_glossary(snapshot.clone());
    }

    let groups = snapshot
        .iter()
        .fold(BTreeMap::<&str, StatRecord>::new(), |mut groups, (slug, record)| {
            let total = groups.entry(slug.group_prefix()).or_insert(StatRecord::ZERO);
            *total = *total + *record;
            groups
        });

    rename_glossary(groups.into_iter().collect())
}
