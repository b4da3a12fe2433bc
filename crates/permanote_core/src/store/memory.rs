//! In-process backing store.
//!
//! Holds rows in memory and counts writes. Read and write failures can be
//! injected so callers can exercise error paths without real I/O.

use super::{BackingStore, StoreCause, StoreError, StoreResult};
use crate::model::note::NoteRow;

const BACKEND: &str = "memory";

#[derive(Debug, Clone, Default)]
pub struct MemoryBackingStore {
    rows: Option<Vec<NoteRow>>,
    write_attempts: usize,
    writes: usize,
    read_failure: Option<String>,
    failing_writes: u32,
}

impl MemoryBackingStore {
    /// Creates a store with no persisted source at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `rows`.
    pub fn with_rows(rows: Vec<NoteRow>) -> Self {
        Self {
            rows: Some(rows),
            ..Self::default()
        }
    }

    /// Current persisted rows; empty when nothing was ever written.
    pub fn rows(&self) -> &[NoteRow] {
        self.rows.as_deref().unwrap_or(&[])
    }

    /// Completed `write_all` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// `write_all` calls including failed ones.
    pub fn write_attempts(&self) -> usize {
        self.write_attempts
    }

    /// Makes every later `read_all` fail as unparsable.
    pub fn fail_reads(&mut self, message: impl Into<String>) {
        self.read_failure = Some(message.into());
    }

    /// Makes the next `count` writes fail without touching stored rows.
    pub fn fail_next_writes(&mut self, count: u32) {
        self.failing_writes = count;
    }
}

impl BackingStore for MemoryBackingStore {
    fn kind(&self) -> &'static str {
        BACKEND
    }

    fn read_all(&mut self) -> StoreResult<Vec<NoteRow>> {
        if let Some(message) = &self.read_failure {
            return Err(StoreError::read(
                BACKEND,
                StoreCause::Malformed(message.clone()),
            ));
        }
        Ok(self.rows.clone().unwrap_or_default())
    }

    fn write_all(&mut self, rows: &[NoteRow]) -> StoreResult<()> {
        self.write_attempts += 1;
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(StoreError::write(
                BACKEND,
                StoreCause::Unavailable("injected write failure".to_string()),
            ));
        }
        self.rows = Some(rows.to_vec());
        self.writes += 1;
        Ok(())
    }
}
