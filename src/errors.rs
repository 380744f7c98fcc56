use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{ColumnName, SourceId, Title};

/// Error type for source loading, schema validation, and view derivation failures.
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable { source_id: SourceId, reason: String },
    #[error("data source '{source_id}' is missing required column(s): {}", missing.join(", "))]
    Schema {
        source_id: SourceId,
        missing: Vec<ColumnName>,
    },
    #[error("data source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        source_id: SourceId,
        details: String,
    },
    #[error("reading interval for '{title}' ends ({end}) before it starts ({start})")]
    InvalidInterval {
        title: Title,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
