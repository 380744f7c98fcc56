use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::color::Color;

pub use crate::types::{CategoryLabel, ColumnName, StatusLabel, SubCategoryLabel, Title};

/// One row of the source table, after coercion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Zero-based source row index; distinguishes rows sharing a title.
    pub row: usize,
    pub title: Title,
    pub category: CategoryLabel,
    /// `None` when the source cell is blank.
    pub sub_category: Option<SubCategoryLabel>,
    pub status: StatusLabel,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub evaluation: Option<f64>,
    pub author: Option<String>,
    /// Value of the `Type` column.
    pub kind: Option<String>,
    pub language: Option<String>,
    /// Remaining non-ignored columns, in header order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<ColumnName, String>,
}

impl BookRecord {
    /// Minimal record with only the required fields populated.
    pub fn new(
        row: usize,
        title: impl Into<Title>,
        category: impl Into<CategoryLabel>,
        status: impl Into<StatusLabel>,
    ) -> Self {
        Self {
            row,
            title: title.into(),
            category: category.into(),
            sub_category: None,
            status: status.into(),
            start: None,
            end: None,
            evaluation: None,
            author: None,
            kind: None,
            language: None,
            attributes: IndexMap::new(),
        }
    }

    /// Set the sub-category; blank values are stored as `None`.
    pub fn with_sub_category(mut self, sub_category: impl Into<SubCategoryLabel>) -> Self {
        let sub_category = sub_category.into();
        self.sub_category = (!sub_category.is_empty()).then_some(sub_category);
        self
    }

    /// Set the reading interval.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Set the evaluation score.
    pub fn with_evaluation(mut self, evaluation: f64) -> Self {
        self.evaluation = Some(evaluation);
        self
    }

    /// Tooltip annotation fields carried by timeline entries.
    pub fn tooltip(&self) -> TooltipFields {
        TooltipFields {
            author: self.author.clone(),
            kind: self.kind.clone(),
            sub_category: self.sub_category.clone(),
            language: self.language.clone(),
            status: self.status.clone(),
        }
    }
}

/// Passthrough descriptive fields shown alongside a timeline bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipFields {
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub sub_category: Option<SubCategoryLabel>,
    pub language: Option<String>,
    pub status: StatusLabel,
}

/// A status label with its record count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusSlice {
    pub label: StatusLabel,
    pub count: usize,
    /// Fraction of all records carrying this status.
    pub share: f64,
    pub color: Color,
}

/// A reading interval derived from one record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// Source row of the record this entry came from.
    pub row: usize,
    pub title: Title,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// True when `end` was substituted with the as-of date.
    pub open: bool,
    pub category: CategoryLabel,
    pub tooltip: TooltipFields,
}

impl TimelineEntry {
    /// Key grouping entries that share a title (one bar row per title).
    pub fn group_key(&self) -> &str {
        &self.title
    }

    /// Interval length in whole days; negative for inverted intervals.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// An inverted interval the timeline dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedInterval {
    pub row: usize,
    pub title: Title,
    pub start: NaiveDate,
    pub end: NaiveDate,
}
