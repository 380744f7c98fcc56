use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::constants::dates::{
    DATE_FORMATS, DATETIME_FORMATS, SERIAL_EPOCH, SERIAL_MAX, SERIAL_MIN, SERIAL_TEXT_MIN,
};

/// Parse a date cell exported from a spreadsheet.
///
/// Accepts, in order: plain dates (`YYYY-MM-DD`, `YYYY/MM/DD`, `DD/MM/YYYY`,
/// `DD.MM.YYYY`, `DD-MM-YYYY`), date-times with an optional fractional second
/// (`YYYY-MM-DD HH:MM:SS`), RFC 3339 timestamps, and 1900-system serial day
/// numbers from 1910 on (e.g. `45292` for 2024-01-01). A bare year such as
/// `2023` is not a date. The time-of-day part is discarded.
/// Returns `None` for blank or unrecognised input.
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
        let with_fraction = format!("{format}%.f");
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, &with_fraction) {
            return Some(datetime.date());
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    parse_serial_date(value)
}

/// Convert a serial day number from a text cell into a date.
///
/// Serials below `SERIAL_TEXT_MIN` (1910-01-01) are rejected so that years
/// and small counts typed into date columns are not read as early-1900 dates.
pub fn parse_serial_date(value: &str) -> Option<NaiveDate> {
    let serial = value.trim().parse::<f64>().ok()?;
    if !serial.is_finite() || serial < SERIAL_TEXT_MIN {
        return None;
    }
    serial_to_date(serial)
}

/// Convert a spreadsheet serial day number into a date.
///
/// Fractions (time of day) are truncated. Serials outside `1..=2958465` are
/// rejected.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }
    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}
