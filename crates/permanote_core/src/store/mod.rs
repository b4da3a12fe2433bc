//! Note persistence contracts and backing store implementations.
//!
//! # Responsibility
//! - Define the two-operation `BackingStore` contract every backend satisfies.
//! - Load and save the whole `NoteCollection` as one unit through `NoteStore`.
//!
//! # Invariants
//! - Every save is a full overwrite; there is no incremental update path.
//! - An absent or empty source loads as an empty collection, never an error.
//! - `NoteStore::save` never mutates the caller's collection.

use crate::db::DbError;
use crate::model::note::{NoteCollection, NoteRow, NoteTitle};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileBackingStore;
pub use memory::MemoryBackingStore;
pub use sqlite::SqliteBackingStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Underlying reason for a store failure.
#[derive(Debug)]
pub enum StoreCause {
    Io(std::io::Error),
    Db(DbError),
    Json(serde_json::Error),
    /// Source was readable but its shape is not a note table.
    Malformed(String),
    /// Backend refused or could not be reached.
    Unavailable(String),
}

impl Display for StoreCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::Malformed(message) => write!(f, "malformed note data: {message}"),
            Self::Unavailable(message) => write!(f, "backend unavailable: {message}"),
        }
    }
}

/// Store-level error taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// Backing store is reachable but could not be parsed.
    Read {
        backend: &'static str,
        cause: StoreCause,
    },
    /// Write failed or backend unreachable; persisted state is unknown.
    Write {
        backend: &'static str,
        cause: StoreCause,
    },
}

impl StoreError {
    pub fn read(backend: &'static str, cause: StoreCause) -> Self {
        Self::Read { backend, cause }
    }

    pub fn write(backend: &'static str, cause: StoreCause) -> Self {
        Self::Write { backend, cause }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Read { backend, .. } | Self::Write { backend, .. } => backend,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "store_read_failed",
            Self::Write { .. } => "store_write_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { backend, cause } => {
                write!(f, "could not read notes from {backend} store: {cause}")
            }
            Self::Write { backend, cause } => {
                write!(f, "could not write notes to {backend} store: {cause}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        let cause = match self {
            Self::Read { cause, .. } | Self::Write { cause, .. } => cause,
        };
        match cause {
            StoreCause::Io(err) => Some(err),
            StoreCause::Db(err) => Some(err),
            StoreCause::Json(err) => Some(err),
            StoreCause::Malformed(_) | StoreCause::Unavailable(_) => None,
        }
    }
}

/// Durable storage for the two-field note table.
pub trait BackingStore {
    /// Short, stable backend label used in logs and errors.
    fn kind(&self) -> &'static str;
    /// Reads every row. Absent or empty sources return an empty vector.
    fn read_all(&mut self) -> StoreResult<Vec<NoteRow>>;
    /// Replaces all prior contents with `rows`.
    fn write_all(&mut self, rows: &[NoteRow]) -> StoreResult<()>;
}

impl<B: BackingStore + ?Sized> BackingStore for Box<B> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn read_all(&mut self) -> StoreResult<Vec<NoteRow>> {
        (**self).read_all()
    }

    fn write_all(&mut self, rows: &[NoteRow]) -> StoreResult<()> {
        (**self).write_all(rows)
    }
}

/// Retry schedule applied to `StoreError::Write` during `NoteStore::save`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRetryPolicy {
    /// Total attempts including the first one. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Sleep before the second attempt; doubles for each later attempt.
    pub initial_backoff: Duration,
}

impl WriteRetryPolicy {
    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    fn backoff_before(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(16);
        self.initial_backoff.saturating_mul(1 << exponent)
    }
}

impl Default for WriteRetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(50),
        }
    }
}

/// Whole-collection persistence over one backing store.
/// Result of one full load, including rows that could not become notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedNotes {
    pub notes: NoteCollection,
    /// Rows with a blank title. The next save drops them from the store.
    pub skipped: Vec<NoteRow>,
}

pub struct NoteStore<B: BackingStore> {
    backend: B,
    retry: WriteRetryPolicy,
}

impl<B: BackingStore> NoteStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            retry: WriteRetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: WriteRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Loads the full collection from the backing store.
    ///
    /// Rows whose title is blank are left out; use `load_report` to see them.
    /// Duplicate titles collapse with the last row winning.
    ///
    /// # Errors
    /// - Returns `StoreError::Read` when the source exists but cannot be parsed.
    pub fn load(&mut self) -> StoreResult<NoteCollection> {
        self.load_report().map(|loaded| loaded.notes)
    }

    /// Loads the full collection and returns the rows it had to skip.
    ///
    /// # Errors
    /// - Returns `StoreError::Read` when the source exists but cannot be parsed.
    pub fn load_report(&mut self) -> StoreResult<LoadedNotes> {
        let started_at = Instant::now();
        let backend = self.backend.kind();
        info!("event=store_load module=store status=start backend={backend}");

        let rows = match self.backend.read_all() {
            Ok(rows) => rows,
            Err(err) => {
                error!(
                    "event=store_load module=store status=error backend={backend} duration_ms={} error_code={} error={err}",
                    started_at.elapsed().as_millis(),
                    err.error_code()
                );
                return Err(err);
            }
        };

        let row_count = rows.len();
        let mut skipped = Vec::new();
        let mut collection = NoteCollection::new();
        for row in rows {
            let Ok(title) = NoteTitle::new(row.title.as_str()) else {
                skipped.push(row);
                continue;
            };
            if collection.insert(title, row.content).is_some() {
                debug!("event=store_load module=store status=duplicate_title backend={backend}");
            }
        }
        if !skipped.is_empty() {
            warn!(
                "event=store_load module=store status=skipped_rows backend={backend} skipped={}",
                skipped.len()
            );
        }

        info!(
            "event=store_load module=store status=ok backend={backend} rows={row_count} notes={} duration_ms={}",
            collection.len(),
            started_at.elapsed().as_millis()
        );
        Ok(LoadedNotes {
            notes: collection,
            skipped,
        })
    }

    /// Overwrites the backing store with the full collection.
    ///
    /// Write failures are retried per the configured `WriteRetryPolicy`.
    ///
    /// # Errors
    /// - Returns the last `StoreError::Write` once attempts are exhausted. The
    ///   persisted state is unknown at that point.
    pub fn save(&mut self, collection: &NoteCollection) -> StoreResult<()> {
        let started_at = Instant::now();
        let backend = self.backend.kind();
        let rows = collection.to_rows();
        let max_attempts = self.retry.max_attempts.max(1);
        info!(
            "event=store_save module=store status=start backend={backend} notes={}",
            rows.len()
        );

        let mut attempt = 1;
        loop {
            match self.backend.write_all(&rows) {
                Ok(()) => {
                    info!(
                        "event=store_save module=store status=ok backend={backend} attempts={attempt} duration_ms={}",
                        started_at.elapsed().as_millis()
                    );
                    return Ok(());
                }
                Err(err) if err.is_write() && attempt < max_attempts => {
                    attempt += 1;
                    let backoff = self.retry.backoff_before(attempt);
                    warn!(
                        "event=store_save module=store status=retry backend={backend} attempt={attempt} backoff_ms={} error={err}",
                        backoff.as_millis()
                    );
                    std::thread::sleep(backoff);
                }
                Err(err) => {
                    error!(
                        "event=store_save module=store status=error backend={backend} attempts={attempt} duration_ms={} error_code={} error={err}",
                        started_at.elapsed().as_millis(),
                        err.error_code()
                    );
                    return Err(err);
                }
            }
        }
    }
}
