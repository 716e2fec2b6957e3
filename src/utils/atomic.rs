//! Atomic file operations
//!
//! Snapshot and report files are replaced, never edited in place:
//!
//! 1. Write to a temporary file (.tmp)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)
//!
//! A reader therefore sees either the previous version or the new one,
//! never a partially written file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::StoreResult;

/// Atomically write content using a writer function
///
/// # Example
///
/// ```ignore
/// atomic_write_with("database/authors.json", |file| {
///     file.write_all(b"{}")
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    write_fn(&mut file)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Atomically replace `path` with the pretty-printed JSON form of `value`
pub fn atomic_write_json<P, T>(path: P, value: &T) -> StoreResult<()>
where
    P: AsRef<Path>,
    T: Serialize + ?Sized,
{
    // Serialize up front so an encoding failure never touches the disk
    let bytes = serde_json::to_vec_pretty(value)?;

    atomic_write_with(path, |file| {
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.write_all(b"\n")?;
        writer.flush()
    })?;

    Ok(())
}

/// Clean up any leftover temp files from interrupted operations
///
/// Call this on startup to clean up .tmp files that may have been
/// left behind from crashes.
pub fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !dir.exists() {
        return Ok(0);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().map(|e| e == "tmp").unwrap_or(false) {
            fs::remove_file(&path)?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("authors.json");

        atomic_write_json(&path, &json!({"authors": {}, "next_id": 1})).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["next_id"], 1);

        // Temp file should not exist
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_replaces_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");

        atomic_write_json(&path, &json!({"v": 1})).unwrap();
        atomic_write_json(&path, &json!({"v": 2})).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["v"], 2);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("subdir").join("nested").join("test.txt");

        atomic_write_with(&path, |file| file.write_all(b"nested content")).unwrap();

        assert!(path.exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "nested content");
    }

    #[test]
    fn test_cleanup_temp_files() {
        let temp_dir = TempDir::new().unwrap();

        fs::write(temp_dir.path().join("books.tmp"), "temp1").unwrap();
        fs::write(temp_dir.path().join("orders.tmp"), "temp2").unwrap();
        fs::write(temp_dir.path().join("books.json"), "keep").unwrap();

        let cleaned = cleanup_temp_files(temp_dir.path()).unwrap();
        assert_eq!(cleaned, 2);

        assert!(!temp_dir.path().join("books.tmp").exists());
        assert!(!temp_dir.path().join("orders.tmp").exists());
        assert!(temp_dir.path().join("books.json").exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert_eq!(cleanup_temp_files(&missing).unwrap(), 0);
    }
}
