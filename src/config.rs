use crate::color::{Palette, ScaleStops};
use crate::constants::columns::{
    AUTHOR, CATEGORY, COVER, END, EVALUATION, LANGUAGE, START, STATUS, SUB_CATEGORY, TITLE, TYPE,
};
use crate::constants::hierarchy::{EVALUATION_DEPTH_LIMIT, OVERVIEW_DEPTH_LIMIT};
use crate::constants::palette::{
    CATEGORICAL, SCALE_HIGH, SCALE_LOW, SCALE_MID, STATUS as STATUS_PALETTE,
};
use crate::constants::status::READ;
use crate::constants::workbook::DEFAULT_SHEET;
use crate::errors::ShelfError;
use crate::types::{ColumnName, StatusLabel};

/// Header names for each logical book field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Required title column.
    pub title: ColumnName,
    /// Required category column.
    pub category: ColumnName,
    /// Optional sub-category column.
    pub sub_category: ColumnName,
    /// Required status column.
    pub status: ColumnName,
    /// Optional reading start column.
    pub start: ColumnName,
    /// Optional reading end column.
    pub end: ColumnName,
    /// Optional evaluation column.
    pub evaluation: ColumnName,
    /// Optional author column.
    pub author: ColumnName,
    /// Optional type column.
    pub kind: ColumnName,
    /// Optional language column.
    pub language: ColumnName,
    /// Columns dropped before any processing (binary/image payloads).
    pub ignored: Vec<ColumnName>,
    /// Match header names case-sensitively when true.
    pub case_sensitive: bool,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            title: TITLE.to_string(),
            category: CATEGORY.to_string(),
            sub_category: SUB_CATEGORY.to_string(),
            status: STATUS.to_string(),
            start: START.to_string(),
            end: END.to_string(),
            evaluation: EVALUATION.to_string(),
            author: AUTHOR.to_string(),
            kind: TYPE.to_string(),
            language: LANGUAGE.to_string(),
            ignored: vec![COVER.to_string()],
            case_sensitive: false,
        }
    }
}

impl ColumnMapping {
    /// Required columns in reporting order.
    pub fn required(&self) -> [&str; 3] {
        [&self.title, &self.category, &self.status]
    }

    /// Add a column to drop before processing.
    pub fn with_ignored(mut self, column: impl Into<ColumnName>) -> Self {
        self.ignored.push(column.into());
        self
    }

    /// Override case-sensitive header matching.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// True when `header` names the logical column `column`.
    pub fn matches(&self, header: &str, column: &str) -> bool {
        self.normalize(header) == self.normalize(column)
    }

    /// True when `header` is one of the ignored columns.
    pub fn is_ignored(&self, header: &str) -> bool {
        self.ignored.iter().any(|column| self.matches(header, column))
    }

    pub(crate) fn normalize(&self, value: &str) -> String {
        let trimmed = value.trim();
        if self.case_sensitive {
            trimmed.to_string()
        } else {
            trimmed.to_lowercase()
        }
    }
}

/// Palettes passed explicitly into colour assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Position-based palette for status slices.
    pub status: Palette,
    /// First-seen palette for categories.
    pub categorical: Palette,
    /// Stops for the evaluation scale.
    pub continuous: ScaleStops,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            status: default_palette(&STATUS_PALETTE),
            categorical: default_palette(&CATEGORICAL),
            continuous: ScaleStops {
                low: default_color(SCALE_LOW),
                mid: default_color(SCALE_MID),
                high: default_color(SCALE_HIGH),
            },
        }
    }
}

fn default_palette(values: &[&'static str]) -> Palette {
    let colors = values.iter().map(|value| default_color(value)).collect();
    Palette::new(colors).expect("built-in palettes are non-empty")
}

fn default_color(value: &'static str) -> crate::color::Color {
    value.parse().expect("built-in colours are valid hex")
}

/// What the timeline does with an interval whose end precedes its start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntervalPolicy {
    /// Drop the entry, log a warning, and report it alongside the view.
    #[default]
    Skip,
    /// Fail the whole timeline with `ShelfError::InvalidInterval`.
    Reject,
    /// Emit the entry unchanged.
    PassThrough,
}

/// Top-level runtime configuration.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Source header mapping.
    pub columns: ColumnMapping,
    /// Worksheet read from spreadsheet workbooks.
    pub sheet: String,
    /// Colour palettes.
    pub palette: PaletteConfig,
    /// Inverted interval handling.
    pub interval_policy: IntervalPolicy,
    /// Status literal selecting finished books for the evaluation view.
    pub completed_status: StatusLabel,
    /// Depth limit of the overall composition.
    pub overview_depth_limit: usize,
    /// Depth limit of the evaluation composition.
    pub evaluation_depth_limit: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            sheet: DEFAULT_SHEET.to_string(),
            palette: PaletteConfig::default(),
            interval_policy: IntervalPolicy::default(),
            completed_status: READ.to_string(),
            overview_depth_limit: OVERVIEW_DEPTH_LIMIT,
            evaluation_depth_limit: EVALUATION_DEPTH_LIMIT,
        }
    }
}

impl TrackerConfig {
    /// Override the header mapping.
    pub fn with_columns(mut self, columns: ColumnMapping) -> Self {
        self.columns = columns;
        self
    }

    /// Override the worksheet read from workbooks.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    /// Override the palettes.
    pub fn with_palette(mut self, palette: PaletteConfig) -> Self {
        self.palette = palette;
        self
    }

    /// Override inverted interval handling.
    pub fn with_interval_policy(mut self, policy: IntervalPolicy) -> Self {
        self.interval_policy = policy;
        self
    }

    /// Override both composition depth limits.
    pub fn with_depth_limits(mut self, overview: usize, evaluation: usize) -> Self {
        self.overview_depth_limit = overview;
        self.evaluation_depth_limit = evaluation;
        self
    }

    /// Check invariants that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ShelfError> {
        if self.overview_depth_limit == 0 || self.evaluation_depth_limit == 0 {
            return Err(ShelfError::Configuration(
                "composition depth limits must be at least 1".to_string(),
            ));
        }
        if self.sheet.trim().is_empty() {
            return Err(ShelfError::Configuration(
                "worksheet name must not be blank".to_string(),
            ));
        }
        for column in self.columns.required() {
            if column.trim().is_empty() {
                return Err(ShelfError::Configuration(
                    "required column names must not be blank".to_string(),
                ));
            }
            if self.columns.is_ignored(column) {
                return Err(ShelfError::Configuration(format!(
                    "required column '{column}' is also listed as ignored"
                )));
            }
        }
        Ok(())
    }
}
