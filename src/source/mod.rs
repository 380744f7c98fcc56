//! Tabular sources and the record store.
//!
//! Ownership model:
//! - `RowSource` exposes stable, index-based access to raw rows plus the
//!   header they were read with.
//! - `BookRowAdapter` owns header resolution and cell coercion.
//! - `RecordStore` loads a source once and is read-only afterwards; every
//!   aggregator borrows its records and derives new structures.

use std::path::Path;

use tracing::debug;

use crate::config::ColumnMapping;
use crate::constants::app::MEMORY_SOURCE_ID;
use crate::constants::workbook::DEFAULT_SHEET;
use crate::data::BookRecord;
use crate::errors::ShelfError;
use crate::types::{ColumnName, SourceId};

/// Date-cell coercion helpers.
pub mod date_helpers;
/// Row contract and row-to-record adapter.
pub mod row_view;
/// Concrete tabular backends.
pub mod sources;

pub use row_view::{BookRowAdapter, ResolvedColumns, RowView, TextField};
pub use sources::csv_source::CsvRowSource;
pub use sources::json_source::JsonRowSource;
pub use sources::xlsx_source::XlsxRowSource;

/// Index-addressable tabular source.
///
/// `columns` is the header as read, before ignored columns are dropped.
/// `row_at` must return the same row for the same index for the lifetime of
/// the source.
pub trait RowSource: Send + Sync {
    /// Stable source identifier (typically the file path).
    fn id(&self) -> &str;
    /// Header names in source order.
    fn columns(&self) -> &[ColumnName];
    /// Current index domain size, typically `Some(total_rows)`.
    fn len_hint(&self) -> Option<usize>;
    /// Return the row at `idx`, or `None` for sparse/missing positions.
    fn row_at(&self, idx: usize) -> Result<Option<RowView>, ShelfError>;
}

/// In-memory row source for tests and embedding callers.
#[derive(Clone, Debug)]
pub struct InMemoryRowSource {
    id: SourceId,
    columns: Vec<ColumnName>,
    rows: Vec<Vec<String>>,
}

impl InMemoryRowSource {
    /// Create a source from a header and positional rows.
    pub fn new<H, R, C>(columns: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<ColumnName>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            id: MEMORY_SOURCE_ID.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Override the source id.
    pub fn with_id(mut self, id: impl Into<SourceId>) -> Self {
        self.id = id.into();
        self
    }
}

impl RowSource for InMemoryRowSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    fn len_hint(&self) -> Option<usize> {
        Some(self.rows.len())
    }

    fn row_at(&self, idx: usize) -> Result<Option<RowView>, ShelfError> {
        Ok(self.rows.get(idx).map(|cells| RowView {
            index: idx,
            text_fields: self
                .columns
                .iter()
                .zip(cells.iter())
                .map(|(name, text)| TextField::new(name.clone(), text.clone()))
                .collect(),
        }))
    }
}

/// Input encodings understood by `open_source`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    /// Pick by file extension.
    #[default]
    Auto,
    /// Comma-separated values with a header row.
    Csv,
    /// Tab-separated values with a header row.
    Tsv,
    /// JSON array of objects or JSON lines.
    Json,
    /// Spreadsheet workbook; rows come from one named worksheet.
    Xlsx,
}

impl InputFormat {
    /// Resolve `Auto` from the extension of `path`.
    pub fn resolve(self, path: &Path) -> Result<InputFormat, ShelfError> {
        if self != InputFormat::Auto {
            return Ok(self);
        }
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "tsv" | "tab" => Ok(InputFormat::Tsv),
            "json" | "jsonl" | "ndjson" => Ok(InputFormat::Json),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(InputFormat::Xlsx),
            _ => Err(ShelfError::Configuration(format!(
                "cannot infer input format from '{}'; pass an explicit format",
                path.display()
            ))),
        }
    }
}

/// Open `path` with the backend selected by `format`.
///
/// `sheet` names the worksheet read from workbooks; other formats ignore it.
pub fn open_source(
    path: &Path,
    format: InputFormat,
    sheet: &str,
) -> Result<Box<dyn RowSource>, ShelfError> {
    let source: Box<dyn RowSource> = match format.resolve(path)? {
        InputFormat::Csv => Box::new(CsvRowSource::open(path)?),
        InputFormat::Tsv => Box::new(CsvRowSource::open_with_delimiter(path, b'\t')?),
        InputFormat::Json => Box::new(JsonRowSource::open(path)?),
        InputFormat::Xlsx => Box::new(XlsxRowSource::open_sheet(path, sheet)?),
        InputFormat::Auto => {
            return Err(ShelfError::Configuration(format!(
                "input format for '{}' is unresolved",
                path.display()
            )));
        }
    };
    Ok(source)
}

/// Read-only table of book records loaded from one source.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    source_id: SourceId,
    columns: Vec<ColumnName>,
    records: Vec<BookRecord>,
}

impl RecordStore {
    /// Load every row of `source` into records.
    ///
    /// Ignored columns are dropped from the header and from every row before
    /// conversion. Fails with `ShelfError::Schema` when a required column is
    /// absent.
    pub fn load(source: &dyn RowSource, mapping: &ColumnMapping) -> Result<Self, ShelfError> {
        let source_id = source.id().to_string();
        let columns: Vec<ColumnName> = source
            .columns()
            .iter()
            .filter(|column| !mapping.is_ignored(column))
            .cloned()
            .collect();
        let adapter = BookRowAdapter::resolve(source_id.clone(), &columns, mapping)?;

        let total = source
            .len_hint()
            .ok_or_else(|| ShelfError::SourceInconsistent {
                source_id: source_id.clone(),
                details: "row source did not provide len_hint".to_string(),
            })?;
        let mut records = Vec::with_capacity(total);
        let mut blank = 0usize;
        for idx in 0..total {
            let Some(mut row) = source.row_at(idx)? else {
                continue;
            };
            row.retain_columns(|name| !mapping.is_ignored(name));
            match adapter.row_to_record(&row)? {
                Some(record) => records.push(record),
                None => blank += 1,
            }
        }
        debug!(
            source = %source_id,
            rows = total,
            records = records.len(),
            blank,
            "record store loaded"
        );
        Ok(Self {
            source_id,
            columns,
            records,
        })
    }

    /// Open `path` and load it in one step; workbooks read the `Shelf` sheet.
    pub fn open(
        path: impl AsRef<Path>,
        format: InputFormat,
        mapping: &ColumnMapping,
    ) -> Result<Self, ShelfError> {
        Self::open_sheet(path, format, DEFAULT_SHEET, mapping)
    }

    /// Open `path` and load it, reading worksheet `sheet` from workbooks.
    pub fn open_sheet(
        path: impl AsRef<Path>,
        format: InputFormat,
        sheet: &str,
        mapping: &ColumnMapping,
    ) -> Result<Self, ShelfError> {
        let source = open_source(path.as_ref(), format, sheet)?;
        Self::load(source.as_ref(), mapping)
    }

    /// Wrap already-built records.
    pub fn from_records(source_id: impl Into<SourceId>, records: Vec<BookRecord>) -> Self {
        Self {
            source_id: source_id.into(),
            columns: Vec::new(),
            records,
        }
    }

    /// Identifier of the source the records came from.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Header after ignored columns were dropped (empty for `from_records`).
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// Records in source order.
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelf() -> InMemoryRowSource {
        InMemoryRowSource::new(
            ["Title", "Category", "Status", "Cover", "Evaluation"],
            vec![
                vec!["Dune", "Fiction", "Read", "<png>", "9"],
                vec!["", "", "", "", ""],
                vec!["SPQR", "History", "Reading", "<png>", ""],
            ],
        )
    }

    #[test]
    fn load_drops_cover_and_blank_rows() {
        let store = RecordStore::load(&shelf(), &ColumnMapping::default()).unwrap();
        assert_eq!(store.source_id(), "memory");
        assert_eq!(
            store.columns(),
            ["Title", "Category", "Status", "Evaluation"]
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[1].row, 2);
        assert!(
            store
                .records()
                .iter()
                .all(|record| !record.attributes.contains_key("Cover"))
        );
    }

    #[test]
    fn load_fails_on_missing_required_columns() {
        let source = InMemoryRowSource::new(["Title", "Status"], vec![vec!["Dune", "Read"]])
            .with_id("books.csv");
        let err = RecordStore::load(&source, &ColumnMapping::default()).unwrap_err();
        assert!(matches!(
            err,
            ShelfError::Schema { source_id, missing }
                if source_id == "books.csv" && missing == vec!["Category".to_string()]
        ));
    }

    #[test]
    fn load_treats_missing_optional_columns_as_absent() {
        let source = InMemoryRowSource::new(
            ["Title", "Category", "Status"],
            vec![vec!["Dune", "Fiction", "Read"]],
        );
        let store = RecordStore::load(&source, &ColumnMapping::default()).unwrap();
        let record = &store.records()[0];
        assert_eq!(record.start, None);
        assert_eq!(record.end, None);
        assert_eq!(record.evaluation, None);
        assert_eq!(record.sub_category, None);
    }

    #[test]
    fn input_format_resolves_from_extension() {
        assert_eq!(
            InputFormat::Auto.resolve(Path::new("a/Books.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::Auto.resolve(Path::new("shelf.jsonl")).unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::Json.resolve(Path::new("shelf.txt")).unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            InputFormat::Auto.resolve(Path::new("data/Books.xlsx")).unwrap(),
            InputFormat::Xlsx
        );
        assert!(matches!(
            InputFormat::Auto.resolve(Path::new("Books.pdf")),
            Err(ShelfError::Configuration(_))
        ));
    }
}
