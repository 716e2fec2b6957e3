//! Reading back written sales reports

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::types::SalesReport;
use crate::utils::parse_report_file_name;

/// Reports whose file date falls in `[start, end]`, oldest first
///
/// A missing directory is an empty archive. Files that cannot be read or
/// decoded are skipped.
pub fn list_reports(dir: &Path, start: NaiveDate, end: NaiveDate) -> StoreResult<Vec<SalesReport>> {
    if end < start {
        return Err(StoreError::invalid(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "reports directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut dated = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(parse_report_file_name) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }

        let path = entry.path();
        let report = fs::read_to_string(&path)
            .map_err(StoreError::from)
            .and_then(|raw| serde_json::from_str::<SalesReport>(&raw).map_err(StoreError::from));
        match report {
            Ok(report) => dated.push((date, report)),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable report"),
        }
    }

    dated.sort_by_key(|(date, _)| *date);
    Ok(dated.into_iter().map(|(_, report)| report).collect())
}
