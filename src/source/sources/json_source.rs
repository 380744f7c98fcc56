use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::ShelfError;
use crate::source::RowSource;
use crate::source::row_view::{RowView, TextField};
use crate::types::{ColumnName, SourceId};

/// JSON-backed source: either a top-level array of objects or JSON lines.
///
/// Each row may be wrapped as `{"row": {...}}`. The header is the union of
/// object keys in first-seen order.
#[derive(Clone, Debug)]
pub struct JsonRowSource {
    id: SourceId,
    columns: Vec<ColumnName>,
    rows: Vec<Map<String, Value>>,
}

impl JsonRowSource {
    /// Open and fully read a `.json` or `.jsonl` file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShelfError> {
        let path = path.as_ref();
        let id = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|err| ShelfError::SourceUnavailable {
            source_id: id.clone(),
            reason: err.to_string(),
        })?;
        Self::parse(id, &raw)
    }

    /// Parse rows from an in-memory JSON document or JSON-lines payload.
    pub fn parse(id: impl Into<SourceId>, raw: &str) -> Result<Self, ShelfError> {
        let id = id.into();
        let values = if raw.trim_start().starts_with('[') {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(values)) => values,
                Ok(_) => Vec::new(),
                Err(err) => {
                    return Err(ShelfError::SourceInconsistent {
                        source_id: id,
                        details: format!("failed decoding JSON array: {err}"),
                    });
                }
            }
        } else {
            let mut values = Vec::new();
            for (line_no, line) in raw.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value = serde_json::from_str::<Value>(line.trim()).map_err(|err| {
                    ShelfError::SourceInconsistent {
                        source_id: id.clone(),
                        details: format!("failed decoding JSON line {}: {err}", line_no + 1),
                    }
                })?;
                values.push(value);
            }
            values
        };

        let mut columns: Vec<ColumnName> = Vec::new();
        let mut rows = Vec::with_capacity(values.len());
        for (idx, value) in values.into_iter().enumerate() {
            let row = Self::row_object(&id, idx, value)?;
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            rows.push(row);
        }
        debug!(source = %id, columns = columns.len(), rows = rows.len(), "json source read");
        Ok(Self { id, columns, rows })
    }

    fn row_object(
        id: &SourceId,
        idx: usize,
        value: Value,
    ) -> Result<Map<String, Value>, ShelfError> {
        let Value::Object(mut object) = value else {
            return Err(ShelfError::SourceInconsistent {
                source_id: id.clone(),
                details: format!("row {idx} is not a JSON object"),
            });
        };
        if object.len() == 1 {
            if let Some(Value::Object(inner)) = object.get_mut("row") {
                return Ok(std::mem::take(inner));
            }
        }
        Ok(object)
    }

    fn value_to_text(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        }
    }
}

impl RowSource for JsonRowSource {
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
        let Some(row) = self.rows.get(idx) else {
            return Ok(None);
        };
        let text_fields = row
            .iter()
            .filter_map(|(name, value)| {
                Self::value_to_text(value).map(|text| TextField::new(name.clone(), text))
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

    #[test]
    fn reads_array_documents_and_unions_columns() {
        let raw = r#"[
            {"Title": "Dune", "Category": "Fiction", "Status": "Read", "Evaluation": 9},
            {"Title": "SPQR", "Category": "History", "Status": "Reading", "Start": "2024-02-01"}
        ]"#;
        let source = JsonRowSource::parse("shelf.json", raw).unwrap();
        assert_eq!(
            source.columns(),
            ["Title", "Category", "Status", "Evaluation", "Start"]
        );
        let first = source.row_at(0).unwrap().unwrap();
        assert_eq!(first.get("Evaluation"), Some("9"));
        assert_eq!(first.get("Start"), None);
    }

    #[test]
    fn reads_json_lines_with_row_wrappers_and_nulls() {
        let raw = "{\"row\": {\"Title\": \"Dune\", \"Category\": \"Fiction\", \"Status\": \"Read\", \"End\": null}}\n\n\
                   {\"Title\": \"SPQR\", \"Category\": \"History\", \"Status\": \"Reading\"}\n";
        let source = JsonRowSource::parse("shelf.jsonl", raw).unwrap();
        assert_eq!(source.len_hint(), Some(2));
        let first = source.row_at(0).unwrap().unwrap();
        assert_eq!(first.get("Title"), Some("Dune"));
        assert_eq!(first.get("End"), None);
        assert_eq!(source.row_at(1).unwrap().unwrap().index, 1);
    }

    #[test]
    fn rejects_non_object_rows() {
        let err = JsonRowSource::parse("shelf.jsonl", "[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            ShelfError::SourceInconsistent { details, .. } if details.contains("row 0")
        ));
        let err = JsonRowSource::parse("shelf.jsonl", "{\"Title\": ").unwrap_err();
        assert!(matches!(err, ShelfError::SourceInconsistent { .. }));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = JsonRowSource::open("/definitely/not/here/books.json").unwrap_err();
        assert!(matches!(err, ShelfError::SourceUnavailable { .. }));
    }
}
