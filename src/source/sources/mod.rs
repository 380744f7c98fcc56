/// Delimited-text (CSV/TSV) source implementation.
pub mod csv_source;
/// JSON array / JSON-lines source implementation.
pub mod json_source;
/// Spreadsheet workbook source implementation.
pub mod xlsx_source;
