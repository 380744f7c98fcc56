//! Status breakdown: one slice per distinct status label.
//!
//! Slices are ordered by descending count with ties in first-seen order, and
//! coloured by position from the status palette. More statuses than palette
//! entries wrap around and reuse colours; that collision is accepted.

use serde::Serialize;
use tracing::{debug, warn};

use crate::color::Palette;
use crate::data::{BookRecord, StatusSlice};
use crate::metrics::{count_labels, label_shares};

/// Status breakdown view model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusView {
    pub slices: Vec<StatusSlice>,
    /// Number of records counted; equals the sum of slice counts.
    pub total: usize,
}

impl StatusView {
    /// Slice for `label`, if any record carries it.
    pub fn slice(&self, label: &str) -> Option<&StatusSlice> {
        self.slices.iter().find(|slice| slice.label == label)
    }
}

/// Count records per status value (exact match, no normalisation).
pub fn aggregate(records: &[BookRecord]) -> Vec<(String, usize)> {
    let counts = count_labels(records.iter().map(|record| record.status.as_str()));
    label_shares(&counts)
        .into_iter()
        .map(|entry| (entry.label, entry.count))
        .collect()
}

/// Build the coloured status view.
pub fn build_status_view(records: &[BookRecord], palette: &Palette) -> StatusView {
    let counts = count_labels(records.iter().map(|record| record.status.as_str()));
    if counts.len() > palette.len() {
        warn!(
            statuses = counts.len(),
            palette = palette.len(),
            "more statuses than status colours; colours will repeat"
        );
    }
    let slices: Vec<StatusSlice> = label_shares(&counts)
        .into_iter()
        .enumerate()
        .map(|(position, entry)| StatusSlice {
            color: palette.color_at(position),
            label: entry.label,
            count: entry.count,
            share: entry.share,
        })
        .collect();
    debug!(
        records = records.len(),
        slices = slices.len(),
        "status view built"
    );
    StatusView {
        slices,
        total: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaletteConfig;

    fn records(statuses: &[&str]) -> Vec<BookRecord> {
        statuses
            .iter()
            .enumerate()
            .map(|(row, status)| BookRecord::new(row, format!("Book {row}"), "Fiction", *status))
            .collect()
    }

    #[test]
    fn counts_sum_to_record_count() {
        let input = records(&["Read", "Reading", "Read", "To-Read", "Abandoned", "Read"]);
        let counts = aggregate(&input);
        let total: usize = counts.iter().map(|(_, count)| count).sum();
        assert_eq!(total, input.len());
        assert_eq!(counts[0], ("Read".to_string(), 3));
    }

    #[test]
    fn aggregation_is_exact_match_and_stable() {
        let input = records(&["Read", "read", "Read ", "Reading"]);
        let first = aggregate(&input);
        assert_eq!(first.len(), 4);
        assert_eq!(first, aggregate(&input));
        assert_eq!(first[0].0, "Read");
        assert_eq!(first[1].0, "read");
    }

    #[test]
    fn colours_are_position_based_and_wrap() {
        let palette = PaletteConfig::default().status;
        let input = records(&[
            "A", "A", "A", "A", "A", "B", "B", "B", "B", "C", "C", "C", "D", "D", "E",
        ]);
        let view = build_status_view(&input, &palette);
        assert_eq!(view.total, input.len());
        let labels: Vec<&str> = view.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D", "E"]);
        for (position, slice) in view.slices.iter().enumerate() {
            assert_eq!(slice.color, palette.color_at(position));
        }
        assert_eq!(
            view.slice("E").unwrap().color,
            view.slice("A").unwrap().color
        );
        assert!((view.slice("A").unwrap().share - 5.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_empty_view() {
        let view = build_status_view(&[], &PaletteConfig::default().status);
        assert!(view.slices.is_empty());
        assert_eq!(view.total, 0);
    }
}
