//! Common type definitions and newtype wrappers for domain modeling.

use crate::error::TxError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Slug the platform uses for the shared glossary resource.
pub const GLOSSARY_RESERVED_SLUG: &str = "glossary_";

/// Canonical key the glossary is stored and reported under.
pub const GLOSSARY_SLUG: &str = "glossary";

/// Token separating a parent group from the sub-resource part of a slug.
pub const GROUP_SEPARATOR: &str = "--";

/// A Discord channel ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(Self)
            .ok_or_else(|| TxError::validation_field(format!("invalid channel id '{s}'"), "channels"))
    }
}

/// Platform identifier of a translatable resource, e.g. `c-api--abstract`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSlug(String);

impl ResourceSlug {
    /// Wraps a slug.
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// The slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before [`GROUP_SEPARATOR`], or the whole slug when there is none.
    pub fn group_prefix(&self) -> &str {
        self.0
            .split_once(GROUP_SEPARATOR)
            .map_or(self.0.as_str(), |(prefix, _)| prefix)
    }
}

impl fmt::Display for ResourceSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceSlug {
    fn from(slug: &str) -> Self {
        Self(slug.to_string())
    }
}

impl From<String> for ResourceSlug {
    fn from(slug: String) -> Self {
        Self(slug)
    }
}

impl Borrow<str> for ResourceSlug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One of the counters tracked per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    /// Strings marked as reviewed.
    Reviewed,
    /// Translated strings.
    TranslatedEntities,
    /// Translated words.
    TranslatedWords,
    /// Strings without a translation.
    UntranslatedEntities,
    /// Words without a translation.
    UntranslatedWords,
}

impl StatField {
    /// Every field, in record order.
    pub const ALL: [Self; 5] = [
        Self::Reviewed,
        Self::TranslatedEntities,
        Self::TranslatedWords,
        Self::UntranslatedEntities,
        Self::UntranslatedWords,
    ];

    /// Wire name of the field.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reviewed => "reviewed",
            Self::TranslatedEntities => "translated_entities",
            Self::TranslatedWords => "translated_words",
            Self::UntranslatedEntities => "untranslated_entities",
            Self::UntranslatedWords => "untranslated_words",
        }
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatField {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| TxError::validation_field(format!("unknown stat field '{name}'"), "fields"))
    }
}

/// What to do when a resource of the latest snapshot is absent from the reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingReferencePolicy {
    /// Compare against an all-zero record, so the whole value counts as progress.
    #[default]
    TreatAsNew,
    /// Abort the comparison with [`TxError::MissingReferenceResource`].
    Fail,
}

impl FromStr for MissingReferencePolicy {
    type Err = TxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "treat-as-new" => Ok(Self::TreatAsNew),
            "fail" => Ok(Self::Fail),
            other => Err(TxError::validation_field(
                format!("unknown missing-reference policy '{other}'"),
                "missing_reference",
            )),
        }
    }
}

/// Statistics of a single resource.
///
/// Decoding is strict about types and lenient about presence: a missing
/// counter is zero, a counter that is not a non-negative integer is an error,
/// and anything else the platform sends along is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatRecord {
    /// Strings marked as reviewed.
    pub reviewed: u64,
    /// Translated strings.
    pub translated_entities: u64,
    /// Translated words.
    pub translated_words: u64,
    /// Strings without a translation.
    pub untranslated_entities: u64,
    /// Words without a translation.
    pub untranslated_words: u64,
}

impl StatRecord {
    /// All counters at zero.
    pub const ZERO: Self = Self {
        reviewed: 0,
        translated_entities: 0,
        translated_words: 0,
        untranslated_entities: 0,
        untranslated_words: 0,
    };

    /// Value of `field`.
    pub const fn get(&self, field: StatField) -> u64 {
        match field {
            StatField::Reviewed => self.reviewed,
            StatField::TranslatedEntities => self.translated_entities,
            StatField::TranslatedWords => self.translated_words,
            StatField::UntranslatedEntities => self.untranslated_entities,
            StatField::UntranslatedWords => self.untranslated_words,
        }
    }

    /// Sets `field` to `value`.
    pub fn set(&mut self, field: StatField, value: u64) {
        let slot = match field {
            StatField::Reviewed => &mut self.reviewed,
            StatField::TranslatedEntities => &mut self.translated_entities,
            StatField::TranslatedWords => &mut self.translated_words,
            StatField::UntranslatedEntities => &mut self.untranslated_entities,
            StatField::UntranslatedWords => &mut self.untranslated_words,
        };
        *slot = value;
    }

    /// `(field, value)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (StatField, u64)> + '_ {
        StatField::ALL.into_iter().map(move |field| (field, self.get(field)))
    }
}

impl Add for StatRecord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut sum = self;
        for (field, value) in rhs.iter() {
            sum.set(field, sum.get(field).saturating_add(value));
        }
        sum
    }
}

/// Statistics of every resource on one calendar day.
///
/// Iteration is in ascending slug order; serialization writes the keys in
/// descending order so persisted files stay byte-stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: BTreeMap<ResourceSlug, StatRecord>,
}

impl Snapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record of `slug`.
    pub fn insert(&mut self, slug: impl Into<ResourceSlug>, record: StatRecord) -> Option<StatRecord> {
        self.records.insert(slug.into(), record)
    }

    /// Record of `slug`, if present.
    pub fn get(&self, slug: &str) -> Option<&StatRecord> {
        self.records.get(slug)
    }

    /// Removes and returns the record of `slug`.
    pub fn remove(&mut self, slug: &str) -> Option<StatRecord> {
        self.records.remove(slug)
    }

    /// Whether `slug` is present.
    pub fn contains(&self, slug: &str) -> bool {
        self.records.contains_key(slug)
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no resources.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Entries in ascending slug order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&ResourceSlug, &StatRecord)> {
        self.records.iter()
    }

    /// Slugs in ascending order.
    pub fn slugs(&self) -> impl Iterator<Item = &ResourceSlug> {
        self.records.keys()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (slug, record) in self.records.iter().rev() {
            map.serialize_entry(slug, record)?;
        }
        map.end()
    }
}

impl<K: Into<ResourceSlug>> FromIterator<(K, StatRecord)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, StatRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|(slug, record)| (slug.into(), record)).collect(),
        }
    }
}

impl IntoIterator for Snapshot {
    type Item = (ResourceSlug, StatRecord);
    type IntoIter = std::collections::btree_map::IntoIter<ResourceSlug, StatRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_prefix() {
        assert_eq!(ResourceSlug::from("c-api--abstract").group_prefix(), "c-api");
        assert_eq!(ResourceSlug::from("library--asyncio--task").group_prefix(), "library");
        assert_eq!(ResourceSlug::from("glossary_").group_prefix(), "glossary_");
    }

    #[test]
    fn test_stat_field_parse() {
        assert_eq!("reviewed".parse::<StatField>().unwrap(), StatField::Reviewed);
        assert_eq!(
            " translated_words ".parse::<StatField>().unwrap(),
            StatField::TranslatedWords
        );
        assert!("completed".parse::<StatField>().is_err());
    }

    #[test]
    fn test_record_decoding_defaults_missing_fields() {
        let record: StatRecord =
            serde_json::from_str(r#"{"reviewed": 3, "completed": "12%", "last_commiter": "x"}"#).unwrap();
        assert_eq!(record.reviewed, 3);
        assert_eq!(record.translated_words, 0);
    }

    #[test]
    fn test_record_decoding_rejects_wrong_types() {
        assert!(serde_json::from_str::<StatRecord>(r#"{"reviewed": "3"}"#).is_err());
        assert!(serde_json::from_str::<StatRecord>(r#"{"reviewed": -1}"#).is_err());
    }

    #[test]
    fn test_record_addition() {
        let a = StatRecord {
            reviewed: 10,
            translated_words: 100,
            ..StatRecord::ZERO
        };
        let b = StatRecord {
            reviewed: 5,
            untranslated_words: 7,
            ..StatRecord::ZERO
        };
        let sum = a + b;
        assert_eq!(sum.reviewed, 15);
        assert_eq!(sum.translated_words, 100);
        assert_eq!(sum.untranslated_words, 7);
    }

    #[test]
    fn test_snapshot_serializes_keys_descending() {
        let snapshot: Snapshot = [
            ("about", StatRecord::ZERO),
            ("whatsnew--3_12", StatRecord::ZERO),
            ("c-api--abstract", StatRecord::ZERO),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&snapshot).unwrap();
        let whatsnew = json.find("whatsnew--3_12").unwrap();
        let c_api = json.find("c-api--abstract").unwrap();
        let about = json.find("\"about\"").unwrap();
        assert!(whatsnew < c_api && c_api < about);

        let decoded: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
