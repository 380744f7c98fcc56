#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner used by the `shelfview` binary.
pub mod app;
/// Colour types, categorical assignment, and continuous scales.
pub mod color;
/// Runtime configuration types.
pub mod config;
/// Centralized constants: column names, palettes, and date formats.
pub mod constants;
/// One-shot pipeline deriving every view model.
pub mod dashboard;
/// Book record and view-model row types.
pub mod data;
/// Composition trees (category → sub-category → title).
pub mod hierarchy;
/// Label counting and share helpers.
pub mod metrics;
/// Tabular sources and the record store.
pub mod source;
/// Status breakdown view.
pub mod status;
/// Reading timeline view.
pub mod timeline;
/// Shared type aliases.
pub mod types;

mod errors;

pub use color::{CategoricalColors, Color, ContinuousScale, Palette, ScaleStops};
pub use config::{ColumnMapping, IntervalPolicy, PaletteConfig, TrackerConfig};
pub use dashboard::{Dashboard, DashboardViews};
pub use data::{BookRecord, SkippedInterval, StatusSlice, TimelineEntry, TooltipFields};
pub use errors::ShelfError;
pub use hierarchy::{CompositionView, HierarchyNode, HierarchyTree};
pub use source::{InMemoryRowSource, InputFormat, RecordStore, RowSource, XlsxRowSource};
pub use status::StatusView;
pub use timeline::TimelineView;
pub use types::{
    CategoryLabel, ColumnName, NodeId, SourceId, StatusLabel, SubCategoryLabel, Title,
};
