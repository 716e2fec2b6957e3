//! Time, date and report-file naming helpers

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{StoreError, StoreResult};

/// Calendar date format used in query parameters and report file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const REPORT_FILE_PREFIX: &str = "report_";
pub const REPORT_FILE_SUFFIX: &str = ".json";

/// `report_2024-03-09.json`
pub fn report_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}{}",
        REPORT_FILE_PREFIX,
        date.format(DATE_FORMAT),
        REPORT_FILE_SUFFIX
    )
}

/// Inverse of [`report_file_name`]; `None` for anything that is not a report file
pub fn parse_report_file_name(name: &str) -> Option<NaiveDate> {
    let date = name
        .strip_prefix(REPORT_FILE_PREFIX)?
        .strip_suffix(REPORT_FILE_SUFFIX)?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_calendar_date(raw: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        StoreError::invalid(format!("invalid date '{}', expected YYYY-MM-DD", raw))
    })
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| StoreError::invalid(format!("invalid timestamp '{}', expected RFC 3339", raw)))
}

/// Start of a trailing window ending at `now`, clamped at the earliest representable time
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
