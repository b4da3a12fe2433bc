//! Local JSON file backing store.
//!
//! # Responsibility
//! - Persist notes as a JSON array of `{"title": ..., "content": ...}` objects.
//! - Replace the file atomically on every write.
//!
//! # Invariants
//! - A missing file, a blank file, or rows with no `title` field at all read
//!   as an empty table.
//! - Writes land in a temp file in the target directory and are renamed over
//!   the target, so readers never observe a half-written file.

use super::{BackingStore, StoreCause, StoreError, StoreResult};
use crate::model::note::NoteRow;
use serde::Deserialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const BACKEND: &str = "json";

/// Lenient on-disk row shape. Absent or `null` fields are tolerated here and
/// interpreted by `read_all`.
#[derive(Debug, Deserialize)]
struct StoredRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JsonFileBackingStore {
    path: PathBuf,
}

impl JsonFileBackingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl BackingStore for JsonFileBackingStore {
    fn kind(&self) -> &'static str {
        BACKEND
    }

    fn read_all(&mut self) -> StoreResult<Vec<NoteRow>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::read(BACKEND, StoreCause::Io(err))),
        };
        parse_rows(&raw)
    }

    fn write_all(&mut self, rows: &[NoteRow]) -> StoreResult<()> {
        let payload = serde_json::to_vec_pretty(rows)
            .map_err(|err| StoreError::write(BACKEND, StoreCause::Json(err)))?;
        let io_error = |err| StoreError::write(BACKEND, StoreCause::Io(err));

        let dir = self.target_dir();
        fs::create_dir_all(dir).map_err(io_error)?;
        let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
        staged.write_all(&payload).map_err(io_error)?;
        staged.write_all(b"\n").map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged
            .persist(&self.path)
            .map_err(|err| io_error(err.error))?;
        Ok(())
    }
}

fn parse_rows(raw: &str) -> StoreResult<Vec<NoteRow>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|err| StoreError::read(BACKEND, StoreCause::Json(err)))?;
    if !value.is_array() {
        return Err(StoreError::read(
            BACKEND,
            StoreCause::Malformed("top-level value must be an array of notes".to_string()),
        ));
    }

    let stored: Vec<StoredRow> = serde_json::from_value(value)
        .map_err(|err| StoreError::read(BACKEND, StoreCause::Json(err)))?;
    if stored.iter().all(|row| row.title.is_none()) {
        return Ok(Vec::new());
    }

    // Rows missing a title keep an empty one so the store layer can report them.
    Ok(stored
        .into_iter()
        .map(|row| NoteRow {
            title: row.title.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::parse_rows;
    use crate::model::note::NoteRow;
    use crate::store::StoreError;

    #[test]
    fn blank_source_is_empty() {
        assert!(parse_rows("").unwrap().is_empty());
        assert!(parse_rows("  \n").unwrap().is_empty());
        assert!(parse_rows("[]").unwrap().is_empty());
    }

    #[test]
    fn rows_without_title_field_are_treated_as_missing_table() {
        let rows = parse_rows(r#"[{"content": "x"}, {"other": 1}]"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_or_null_content_reads_as_empty() {
        let rows = parse_rows(r#"[{"title": "A"}, {"title": "B", "content": null}]"#).unwrap();
        assert_eq!(rows, vec![NoteRow::new("A", ""), NoteRow::new("B", "")]);
    }

    #[test]
    fn unparsable_sources_are_read_errors() {
        for raw in [r#"{"title": "A"}"#, "[{", r#"[{"title": 7}]"#, "[1, 2]"] {
            let err = parse_rows(raw).unwrap_err();
            assert!(matches!(err, StoreError::Read { .. }), "{raw}: {err}");
        }
    }
}
