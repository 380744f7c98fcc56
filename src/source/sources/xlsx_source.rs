use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::constants::workbook::DEFAULT_SHEET;
use crate::errors::ShelfError;
use crate::source::RowSource;
use crate::source::date_helpers::serial_to_date;
use crate::source::row_view::{RowView, TextField};
use crate::types::{ColumnName, SourceId};

/// Spreadsheet source reading one worksheet (`.xlsx`, `.xlsm`, `.xls`, `.ods`).
///
/// The first row of the used range is the header. Date-formatted cells are
/// rendered as `YYYY-MM-DD` and numbers in their shortest decimal form, so the
/// row adapter coerces them like text exports.
#[derive(Clone, Debug)]
pub struct XlsxRowSource {
    id: SourceId,
    sheet: String,
    columns: Vec<ColumnName>,
    rows: Vec<Vec<Option<String>>>,
}

impl XlsxRowSource {
    /// Open the default `Shelf` worksheet of a workbook.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShelfError> {
        Self::open_sheet(path, DEFAULT_SHEET)
    }

    /// Open worksheet `sheet` of a workbook.
    pub fn open_sheet(path: impl AsRef<Path>, sheet: &str) -> Result<Self, ShelfError> {
        let path = path.as_ref();
        let id = path.display().to_string();
        let mut workbook = open_workbook_auto(path).map_err(|err| ShelfError::SourceUnavailable {
            source_id: id.clone(),
            reason: err.to_string(),
        })?;

        let sheet_names = workbook.sheet_names();
        if !sheet_names.iter().any(|name| name == sheet) {
            return Err(ShelfError::SourceUnavailable {
                source_id: id,
                reason: format!(
                    "worksheet '{sheet}' not found (available: {})",
                    sheet_names.join(", ")
                ),
            });
        }
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|err| ShelfError::SourceInconsistent {
                source_id: id.clone(),
                details: format!("failed reading worksheet '{sheet}': {err}"),
            })?;

        let mut raw_rows = range.rows();
        let columns: Vec<ColumnName> = raw_rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| cell_text(cell).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();
        let rows: Vec<Vec<Option<String>>> = raw_rows
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect();
        debug!(
            source = %id,
            sheet,
            columns = columns.len(),
            rows = rows.len(),
            "xlsx source read"
        );
        Ok(Self {
            id,
            sheet: sheet.to_string(),
            columns,
            rows,
        })
    }

    /// Name of the worksheet the rows came from.
    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

/// Text form of one worksheet cell; empty and error cells read as absent.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            Some(text.clone())
        }
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(value.to_string()),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => {
            let serial = value.as_f64();
            if value.is_duration() {
                return Some(serial.to_string());
            }
            Some(match serial_to_date(serial) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => serial.to_string(),
            })
        }
    }
}

impl RowSource for XlsxRowSource {
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
        let Some(cells) = self.rows.get(idx) else {
            return Ok(None);
        };
        let text_fields = self
            .columns
            .iter()
            .zip(cells.iter())
            .filter_map(|(name, text)| {
                text.as_ref()
                    .map(|text| TextField::new(name.clone(), text.clone()))
            })
            .collect();
        Ok(Some(RowView {
            index: idx,
            text_fields,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Format, Workbook};

    const HEADERS: [&str; 6] = [
        "Title",
        "Category",
        "Status",
        "Start",
        "Evaluation",
        "Cover",
    ];

    fn write_shelf(path: &Path, sheet: &str) {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header).unwrap();
        }
        worksheet.write_string(1, 0, "Dune").unwrap();
        worksheet.write_string(1, 1, "Fiction").unwrap();
        worksheet.write_string(1, 2, "Read").unwrap();
        worksheet
            .write_number_with_format(1, 3, 45292.0, &date_format)
            .unwrap();
        worksheet.write_number(1, 4, 8.5).unwrap();
        worksheet.write_string(1, 5, "<png>").unwrap();
        worksheet.write_number(2, 0, 1984.0).unwrap();
        worksheet.write_string(2, 1, "Fiction").unwrap();
        worksheet.write_string(2, 2, "To-Read").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn reads_named_sheet_with_typed_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Books.xlsx");
        write_shelf(&path, DEFAULT_SHEET);

        let source = XlsxRowSource::open(&path).unwrap();
        assert_eq!(source.sheet(), "Shelf");
        assert_eq!(source.columns(), HEADERS);
        assert_eq!(source.len_hint(), Some(2));

        let first = source.row_at(0).unwrap().unwrap();
        assert_eq!(first.get("Start"), Some("2024-01-01"));
        assert_eq!(first.get("Evaluation"), Some("8.5"));

        let second = source.row_at(1).unwrap().unwrap();
        assert_eq!(second.get("Title"), Some("1984"));
        assert_eq!(second.get("Start"), None);
    }

    #[test]
    fn missing_sheet_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Books.xlsx");
        write_shelf(&path, "Archive");

        let err = XlsxRowSource::open(&path).unwrap_err();
        assert!(matches!(
            err,
            ShelfError::SourceUnavailable { reason, .. } if reason.contains("Archive")
        ));
        assert!(XlsxRowSource::open_sheet(&path, "Archive").is_ok());
    }

    #[test]
    fn unreadable_workbook_is_source_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Books.xlsx");
        std::fs::write(&path, "not a workbook").unwrap();
        assert!(matches!(
            XlsxRowSource::open(&path),
            Err(ShelfError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn cell_text_renders_scalars() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::Float(9.0)).as_deref(), Some("9"));
        assert_eq!(cell_text(&Data::Float(7.25)).as_deref(), Some("7.25"));
        assert_eq!(cell_text(&Data::Int(3)).as_deref(), Some("3"));
        assert_eq!(
            cell_text(&Data::String("Dune".to_string())).as_deref(),
            Some("Dune")
        );
    }
}
