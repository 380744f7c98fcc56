//! Timeline Builder: one reading interval per record with a start date.
//!
//! Records are never mutated; open intervals get the as-of date as their end
//! on the derived entry only.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::color::{CategoricalColors, Palette, assign_categorical};
use crate::config::IntervalPolicy;
use crate::data::{BookRecord, SkippedInterval, TimelineEntry};
use crate::errors::ShelfError;
use crate::types::Title;

/// Timeline view model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineView {
    /// Entries in input order.
    pub entries: Vec<TimelineEntry>,
    /// Category colours, first-seen over the emitted entries.
    pub category_colors: CategoricalColors,
    /// Distinct titles ordered for display (fewest intervals first).
    pub title_order: Vec<Title>,
    /// Inverted intervals dropped under `IntervalPolicy::Skip`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedInterval>,
}

impl TimelineView {
    /// Entries belonging to `title`, in input order.
    pub fn entries_for<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a TimelineEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.group_key() == title)
    }
}

/// Derive timeline entries from `records`.
///
/// Records without a start date produce nothing. A missing end becomes
/// `as_of` and marks the entry `open`. Inverted intervals are handled by
/// `policy`; the skipped ones are returned in the second tuple slot.
pub fn build(
    records: &[BookRecord],
    as_of: NaiveDate,
    policy: IntervalPolicy,
) -> Result<(Vec<TimelineEntry>, Vec<SkippedInterval>), ShelfError> {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    for record in records {
        let Some(start) = record.start else {
            continue;
        };
        let (end, open) = match record.end {
            Some(end) => (end, false),
            None => (as_of, true),
        };
        if end < start {
            match policy {
                IntervalPolicy::Reject => {
                    return Err(ShelfError::InvalidInterval {
                        title: record.title.clone(),
                        start,
                        end,
                    });
                }
                IntervalPolicy::Skip => {
                    warn!(
                        row = record.row,
                        title = %record.title,
                        %start,
                        %end,
                        "skipping reading interval that ends before it starts"
                    );
                    skipped.push(SkippedInterval {
                        row: record.row,
                        title: record.title.clone(),
                        start,
                        end,
                    });
                    continue;
                }
                IntervalPolicy::PassThrough => {}
            }
        }
        entries.push(TimelineEntry {
            row: record.row,
            title: record.title.clone(),
            start,
            end,
            open,
            category: record.category.clone(),
            tooltip: record.tooltip(),
        });
    }
    Ok((entries, skipped))
}

/// Distinct titles sorted by interval count ascending.
///
/// Ties break on total interval days ascending, then first-seen order.
pub fn title_order(entries: &[TimelineEntry]) -> Vec<Title> {
    let mut groups: IndexMap<&str, (usize, i64)> = IndexMap::new();
    for entry in entries {
        let group = groups.entry(entry.group_key()).or_default();
        group.0 += 1;
        group.1 += entry.duration_days();
    }
    let mut ordered: Vec<(&str, (usize, i64))> = groups.into_iter().collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1));
    ordered
        .into_iter()
        .map(|(title, _)| title.to_string())
        .collect()
}

/// Build the full timeline view with category colours and display order.
pub fn build_timeline_view(
    records: &[BookRecord],
    as_of: NaiveDate,
    palette: &Palette,
    policy: IntervalPolicy,
) -> Result<TimelineView, ShelfError> {
    let (entries, skipped) = build(records, as_of, policy)?;
    let category_colors =
        assign_categorical(entries.iter().map(|entry| entry.category.as_str()), palette);
    let title_order = title_order(&entries);
    debug!(
        records = records.len(),
        entries = entries.len(),
        skipped = skipped.len(),
        titles = title_order.len(),
        %as_of,
        "timeline view built"
    );
    Ok(TimelineView {
        entries,
        category_colors,
        title_order,
        skipped,
    })
}
