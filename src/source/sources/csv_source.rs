use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::ShelfError;
use crate::source::RowSource;
use crate::source::row_view::{RowView, TextField};
use crate::types::{ColumnName, SourceId};

/// Delimited-text source; the first record is the header row.
///
/// Rows shorter than the header read as blank in the missing cells; extra
/// trailing cells without a header are ignored.
#[derive(Clone, Debug)]
pub struct CsvRowSource {
    id: SourceId,
    columns: Vec<ColumnName>,
    rows: Vec<Vec<String>>,
}

impl CsvRowSource {
    /// Open and fully read a comma-separated file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShelfError> {
        Self::open_with_delimiter(path, b',')
    }

    /// Open and fully read a delimited file using `delimiter`.
    pub fn open_with_delimiter(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, ShelfError> {
        let path = path.as_ref();
        let id = path.display().to_string();
        let file = File::open(path).map_err(|err| ShelfError::SourceUnavailable {
            source_id: id.clone(),
            reason: err.to_string(),
        })?;
        Self::from_reader_with_delimiter(id, file, delimiter)
    }

    /// Read comma-separated rows from any reader.
    pub fn from_reader(id: impl Into<SourceId>, reader: impl Read) -> Result<Self, ShelfError> {
        Self::from_reader_with_delimiter(id, reader, b',')
    }

    fn from_reader_with_delimiter(
        id: impl Into<SourceId>,
        reader: impl Read,
        delimiter: u8,
    ) -> Result<Self, ShelfError> {
        let id = id.into();
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let columns: Vec<ColumnName> = csv_reader
            .headers()
            .map_err(|err| Self::read_error(&id, err))?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|err| ShelfError::SourceInconsistent {
                source_id: id.clone(),
                details: format!("failed decoding CSV row {idx}: {err}"),
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        debug!(source = %id, columns = columns.len(), rows = rows.len(), "csv source read");
        Ok(Self { id, columns, rows })
    }

    fn read_error(id: &SourceId, err: csv::Error) -> ShelfError {
        if err.is_io_error() {
            ShelfError::SourceUnavailable {
                source_id: id.clone(),
                reason: err.to_string(),
            }
        } else {
            ShelfError::SourceInconsistent {
                source_id: id.clone(),
                details: format!("failed decoding CSV header: {err}"),
            }
        }
    }
}

impl RowSource for CsvRowSource {
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
            .map(|(name, text)| TextField::new(name.clone(), text.clone()))
            .collect();
        Ok(Some(RowView {
            index: idx,
            text_fields,
        }))
    }
}
