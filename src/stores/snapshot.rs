//! Snapshot file helpers shared by the four stores
//!
//! Each store persists to its own JSON object:
//!
//! ```text
//! { "<entities>": { "<id>": { ... }, ... }, "next_id": <n> }
//! ```
//!
//! Snapshots are only read at startup and written at shutdown.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::utils::atomic_write_json;

/// Ids start at 1
pub(crate) const FIRST_ID: u64 = 1;

pub(crate) fn first_id() -> u64 {
    FIRST_ID
}

/// Read a snapshot; `Ok(None)` when the file does not exist
pub(crate) fn read_snapshot<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot found, starting fresh");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot = serde_json::from_reader(BufReader::new(file))?;
    debug!(path = %path.display(), "snapshot decoded");
    Ok(Some(snapshot))
}

/// Write a snapshot atomically, creating parent directories as needed
pub(crate) fn write_snapshot<T: Serialize>(path: &Path, snapshot: &T) -> StoreResult<()> {
    atomic_write_json(path, snapshot)
}

/// Counter to resume from after a load: never below `max(id) + 1` or [`FIRST_ID`]
///
/// Guards against hand-edited or truncated snapshots handing out an id that
/// is already taken.
pub(crate) fn resume_next_id<I>(stored_next_id: u64, ids: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    let after_max = ids.into_iter().max().map(|id| id + 1).unwrap_or(FIRST_ID);
    stored_next_id.max(after_max).max(FIRST_ID)
}
