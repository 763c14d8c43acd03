//! Delta computation and report rendering.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;
use txstats_common::{
    escape_markdown, format_signed_thousands, MissingReferencePolicy, ResourceSlug, Result,
    Snapshot, StatField, StatRecord, TxError,
};

/// Nonzero per-field changes of one resource.
pub type FieldDeltas = BTreeMap<StatField, i64>;

/// Per-resource changes between two snapshots.
///
/// Only resources with at least one nonzero change are present, and each
/// resource only carries its nonzero fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DeltaReport {
    entries: BTreeMap<ResourceSlug, FieldDeltas>,
}

impl DeltaReport {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of resources with changes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Changes of one resource.
    pub fn get(&self, slug: &str) -> Option<&FieldDeltas> {
        self.entries.get(slug)
    }

    /// Resources and their changes in ascending slug order.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceSlug, &FieldDeltas)> {
        self.entries.iter()
    }
}

impl FromIterator<(ResourceSlug, FieldDeltas)> for DeltaReport {
    fn from_iter<I: IntoIterator<Item = (ResourceSlug, FieldDeltas)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .filter(|(_, deltas)| deltas.values().any(|d| *d != 0))
                .map(|(slug, deltas)| (slug, deltas.into_iter().filter(|(_, d)| *d != 0).collect()))
                .collect(),
        }
    }
}

fn signed_diff(current: u64, previous: u64) -> i64 {
    let diff = i128::from(current) - i128::from(previous);
    i64::try_from(diff).unwrap_or(if diff > 0 { i64::MAX } else { i64::MIN })
}

/// Changes from `reference` to `latest`, keyed by the resources of `latest`.
///
/// Resources only present in `reference` are not reported. How resources only
/// present in `latest` are handled depends on `policy`.
pub fn compute_delta(
    latest: &Snapshot,
    reference: &Snapshot,
    policy: MissingReferencePolicy,
) -> Result<DeltaReport> {
    let mut entries = BTreeMap::new();

    for (slug, current) in latest.iter() {
        let previous = match (reference.get(slug.as_str()), policy) {
            (Some(previous), _) => *previous,
            (None, MissingReferencePolicy::TreatAsNew) => {
                debug!("Resource {} is new since the reference snapshot", slug);
                StatRecord::ZERO
            }
            (None, MissingReferencePolicy::Fail) => {
                return Err(TxError::missing_reference(slug.as_str()));
            }
        };

        let deltas: FieldDeltas = current
            .iter()
            .map(|(field, value)| (field, signed_diff(value, previous.get(field))))
            .filter(|(_, delta)| *delta != 0)
            .collect();

        if !deltas.is_empty() {
            entries.insert(slug.clone(), deltas);
        }
    }

    Ok(DeltaReport { entries })
}

/// Keeps only the `allowed` fields, dropping resources left without any.
pub fn filter_reportable_fields(report: DeltaReport, allowed: &[StatField]) -> DeltaReport {
    report
        .entries
        .into_iter()
        .map(|(slug, deltas)| {
            let kept = deltas
                .into_iter()
                .filter(|(field, _)| allowed.contains(field))
                .collect();
            (slug, kept)
        })
        .collect()
}

/// How one field is labeled and its value rendered.
#[derive(Debug, Clone)]
pub struct FieldFormat {
    /// Human-readable label.
    pub label: String,
    /// Renders a delta value.
    pub formatter: fn(i64) -> String,
}

/// Display rules per field. Fields without a rule are not rendered.
#[derive(Debug, Clone)]
pub struct FieldFormats {
    formats: BTreeMap<StatField, FieldFormat>,
}

impl FieldFormats {
    /// No field rendered.
    pub const fn empty() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    /// Adds or replaces the rule for `field`.
    #[must_use]
    pub fn with(mut self, field: StatField, label: impl Into<String>, formatter: fn(i64) -> String) -> Self {
        self.formats.insert(
            field,
            FieldFormat {
                label: label.into(),
                formatter,
            },
        );
        self
    }

    /// Rule for `field`.
    pub fn get(&self, field: StatField) -> Option<&FieldFormat> {
        self.formats.get(&field)
    }
}

impl Default for FieldFormats {
    fn default() -> Self {
        Self::empty()
            .with(StatField::Reviewed, "reviewed strings", format_signed_thousands)
            .with(StatField::TranslatedEntities, "translated strings", format_signed_thousands)
            .with(StatField::TranslatedWords, "translated words", format_signed_thousands)
            .with(StatField::UntranslatedEntities, "untranslated strings", format_signed_thousands)
            .with(StatField::UntranslatedWords, "untranslated words", format_signed_thousands)
    }
}

fn header(days: u32) -> String {
    let unit = if days == 1 { "day" } else { "days" };
    format!("**Translation progress over the last {days} {unit}**")
}

/// Renders `report` as a Discord markdown message covering `days` days.
///
/// Returns `None` when no resource has a renderable field, so callers can skip
/// sending an empty report.
pub fn format_report(report: &DeltaReport, days: u32, formats: &FieldFormats) -> Option<String> {
    let sections: Vec<String> = report
        .iter()
        .filter_map(|(slug, deltas)| {
            let lines: Vec<String> = deltas
                .iter()
                .filter_map(|(field, value)| {
                    formats
                        .get(*field)
                        .map(|format| format!("{}: {}", format.label, (format.formatter)(*value)))
                })
                .collect();

            (!lines.is_empty())
                .then(|| format!("**{}**\n{}", escape_markdown(slug.as_str()), lines.join("\n")))
        })
        .collect();

    if sections.is_empty() {
        return None;
    }

    Some(format!("{}\n\n{}", header(days), sections.join("\n\n")))
}
