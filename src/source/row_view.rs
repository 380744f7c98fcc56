use indexmap::IndexMap;
use tracing::warn;

use crate::config::ColumnMapping;
use crate::data::BookRecord;
use crate::errors::ShelfError;
use crate::source::date_helpers::parse_date_cell;
use crate::types::{CellText, ColumnName, SourceId};

/// A named cell in a row-like record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextField {
    /// Column header the cell belongs to.
    pub name: ColumnName,
    /// Cell text; may be blank.
    pub text: CellText,
}

impl TextField {
    /// Build a field from a header and cell text.
    pub fn new(name: impl Into<ColumnName>, text: impl Into<CellText>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Source-agnostic row contract for tabular backends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    /// Zero-based data row index (header excluded).
    pub index: usize,
    /// Cells present in the row; absent cells are treated as blank.
    pub text_fields: Vec<TextField>,
}

impl RowView {
    /// Text of the first cell named `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.text_fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.text.as_str())
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.text_fields
            .iter()
            .all(|field| field.text.trim().is_empty())
    }

    /// Drop every cell whose header fails `keep`.
    pub fn retain_columns(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.text_fields.retain(|field| keep(&field.name));
    }
}

/// Source header names resolved for each logical book field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub title: ColumnName,
    pub category: ColumnName,
    pub status: ColumnName,
    pub sub_category: Option<ColumnName>,
    pub start: Option<ColumnName>,
    pub end: Option<ColumnName>,
    pub evaluation: Option<ColumnName>,
    pub author: Option<ColumnName>,
    pub kind: Option<ColumnName>,
    pub language: Option<ColumnName>,
    /// Unmapped, non-ignored headers carried as passthrough attributes.
    pub extra: Vec<ColumnName>,
}

/// Converts `RowView`s into `BookRecord`s for one source header.
#[derive(Clone, Debug)]
pub struct BookRowAdapter {
    source_id: SourceId,
    columns: ResolvedColumns,
}

impl BookRowAdapter {
    /// Resolve `headers` against `mapping`.
    ///
    /// Fails with `ShelfError::Schema` listing every missing required column.
    /// Optional columns that are missing resolve to `None` and read as blank.
    pub fn resolve(
        source_id: impl Into<SourceId>,
        headers: &[ColumnName],
        mapping: &ColumnMapping,
    ) -> Result<Self, ShelfError> {
        let source_id = source_id.into();
        let visible: Vec<&ColumnName> = headers
            .iter()
            .filter(|header| !mapping.is_ignored(header))
            .collect();
        let find = |column: &str| -> Option<ColumnName> {
            visible
                .iter()
                .find(|header| mapping.matches(header, column))
                .map(|header| (*header).clone())
        };

        let missing: Vec<ColumnName> = mapping
            .required()
            .into_iter()
            .filter(|column| find(*column).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ShelfError::Schema { source_id, missing });
        }

        let mapped = [
            &mapping.title,
            &mapping.category,
            &mapping.status,
            &mapping.sub_category,
            &mapping.start,
            &mapping.end,
            &mapping.evaluation,
            &mapping.author,
            &mapping.kind,
            &mapping.language,
        ];
        let mut extra = Vec::new();
        for header in &visible {
            let is_mapped = mapped.iter().any(|column| mapping.matches(header, column));
            let seen = extra.iter().any(|known: &ColumnName| known == *header);
            if !is_mapped && !seen {
                extra.push((*header).clone());
            }
        }

        let columns = ResolvedColumns {
            title: find(mapping.title.as_str()).unwrap_or_default(),
            category: find(mapping.category.as_str()).unwrap_or_default(),
            status: find(mapping.status.as_str()).unwrap_or_default(),
            sub_category: find(mapping.sub_category.as_str()),
            start: find(mapping.start.as_str()),
            end: find(mapping.end.as_str()),
            evaluation: find(mapping.evaluation.as_str()),
            author: find(mapping.author.as_str()),
            kind: find(mapping.kind.as_str()),
            language: find(mapping.language.as_str()),
            extra,
        };
        Ok(Self { source_id, columns })
    }

    /// Headers this adapter reads from.
    pub fn columns(&self) -> &ResolvedColumns {
        &self.columns
    }

    /// Convert one row into a `BookRecord`.
    ///
    /// Wholly blank rows yield `Ok(None)`. Required fields are taken verbatim;
    /// unparseable dates and evaluations are logged and treated as absent.
    pub fn row_to_record(&self, row: &RowView) -> Result<Option<BookRecord>, ShelfError> {
        if row.is_blank() {
            return Ok(None);
        }
        let cols = &self.columns;
        let required = |name: &ColumnName| row.get(name).unwrap_or_default().to_string();
        let optional = |name: &Option<ColumnName>| -> Option<String> {
            let text = name.as_ref().and_then(|name| row.get(name))?;
            (!text.trim().is_empty()).then(|| text.to_string())
        };

        let title = required(&cols.title);
        let start =
            optional(&cols.start).and_then(|raw| self.coerce_date(row, &title, "start", &raw));
        let end = optional(&cols.end).and_then(|raw| self.coerce_date(row, &title, "end", &raw));
        let evaluation =
            optional(&cols.evaluation).and_then(|raw| self.coerce_evaluation(row, &title, &raw));

        let mut attributes = IndexMap::new();
        for name in &cols.extra {
            if let Some(text) = row.get(name) {
                attributes.insert(name.clone(), text.to_string());
            }
        }

        Ok(Some(BookRecord {
            row: row.index,
            category: required(&cols.category),
            sub_category: optional(&cols.sub_category),
            status: required(&cols.status),
            start,
            end,
            evaluation,
            author: optional(&cols.author),
            kind: optional(&cols.kind),
            language: optional(&cols.language),
            attributes,
            title,
        }))
    }

    fn coerce_date(
        &self,
        row: &RowView,
        title: &str,
        field: &str,
        raw: &str,
    ) -> Option<chrono::NaiveDate> {
        let parsed = parse_date_cell(raw);
        if parsed.is_none() {
            warn!(
                source = %self.source_id,
                row = row.index,
                title,
                field,
                value = raw,
                "unparseable date cell treated as absent"
            );
        }
        parsed
    }

    fn coerce_evaluation(&self, row: &RowView, title: &str, raw: &str) -> Option<f64> {
        let parsed = parse_evaluation_cell(raw);
        if parsed.is_none() {
            warn!(
                source = %self.source_id,
                row = row.index,
                title,
                value = raw,
                "unparseable evaluation cell treated as absent"
            );
        }
        parsed
    }
}

/// Parse a numeric evaluation cell; accepts a decimal comma (`7,5`).
///
/// Non-finite values are rejected.
pub fn parse_evaluation_cell(raw: &str) -> Option<f64> {
    let value = raw.trim();
    let parsed = value
        .parse::<f64>()
        .ok()
        .or_else(|| match value.matches(',').count() {
            1 if !value.contains('.') => value.replace(',', ".").parse::<f64>().ok(),
            _ => None,
        })?;
    parsed.is_finite().then_some(parsed)
}
