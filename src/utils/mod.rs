//! Utility functions and helpers
//!
//! Atomic file writes for snapshots and reports, plus date/time helpers.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write_json, atomic_write_with, cleanup_temp_files};
pub use time::{
    parse_calendar_date, parse_report_file_name, parse_timestamp, report_file_name, window_start,
};
