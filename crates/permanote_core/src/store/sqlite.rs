//! SQLite backing store.
//!
//! # Responsibility
//! - Persist the note table in a single `notes(title, content)` table.
//! - Replace the whole table atomically on every write.
//!
//! # Invariants
//! - `write_all` runs `DELETE` + `INSERT` in one immediate transaction, so a
//!   failed write leaves the previous rows intact.
//! - File-backed stores open their connection lazily; an unopenable file is
//!   reported as a read or write failure of the operation that hit it.

use super::{BackingStore, StoreCause, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::NoteRow;
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};

const BACKEND: &str = "sqlite";

pub struct SqliteBackingStore {
    path: Option<PathBuf>,
    conn: Option<Connection>,
}

impl SqliteBackingStore {
    /// Creates a store for the database file at `path`. Nothing is opened yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            conn: None,
        }
    }

    /// Creates a store over a fresh, migrated in-memory database.
    pub fn in_memory() -> Result<Self, DbError> {
        Ok(Self {
            path: None,
            conn: Some(open_db_in_memory()?),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the open connection, opening the database file on first use.
    pub fn connection(&mut self) -> Result<&mut Connection, DbError> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => match self.path.as_deref() {
                Some(path) => {
                    ensure_parent_dir(path)?;
                    open_db(path)?
                }
                None => open_db_in_memory()?,
            },
        };
        Ok(self.conn.insert(conn))
    }
}

impl BackingStore for SqliteBackingStore {
    fn kind(&self) -> &'static str {
        BACKEND
    }

    fn read_all(&mut self) -> StoreResult<Vec<NoteRow>> {
        let conn = self.connection().map_err(read_error)?;
        read_rows(conn).map_err(|err| read_error(err.into()))
    }

    fn write_all(&mut self, rows: &[NoteRow]) -> StoreResult<()> {
        let conn = self.connection().map_err(write_error)?;
        replace_rows(conn, rows).map_err(|err| write_error(err.into()))
    }
}

fn read_rows(conn: &Connection) -> rusqlite::Result<Vec<NoteRow>> {
    let mut stmt = conn.prepare("SELECT title, content FROM notes ORDER BY title ASC;")?;
    let mut rows = stmt.query([])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(NoteRow {
            title: row.get("title")?,
            content: row.get("content")?,
        });
    }
    Ok(notes)
}

fn replace_rows(conn: &mut Connection, rows: &[NoteRow]) -> rusqlite::Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM notes;", [])?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO notes (title, content) VALUES (?1, ?2)
             ON CONFLICT(title) DO UPDATE SET content = excluded.content;",
        )?;
        for row in rows {
            insert.execute([row.title.as_str(), row.content.as_str()])?;
        }
    }
    tx.commit()
}

fn ensure_parent_dir(path: &Path) -> Result<(), DbError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(DbError::Io)
        }
        _ => Ok(()),
    }
}

fn read_error(err: DbError) -> StoreError {
    StoreError::read(BACKEND, StoreCause::Db(err))
}

fn write_error(err: DbError) -> StoreError {
    StoreError::write(BACKEND, StoreCause::Db(err))
}
