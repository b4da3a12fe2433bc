//! Core domain logic for Permanote.
//! Owns the note collection, its persistence, and the editing session.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod session;
pub mod store;

pub use config::{AppConfig, BackendKind, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{InvalidTitleError, NoteCollection, NoteRow, NoteTitle};
pub use session::{
    CommandOutcome, NoteSession, Selection, SessionCommand, SessionError, SessionResult,
    SessionSnapshot, SessionStart, SessionState,
};
pub use store::{
    BackingStore, JsonFileBackingStore, LoadedNotes, MemoryBackingStore, NoteStore,
    SqliteBackingStore, StoreCause, StoreError, StoreResult, WriteRetryPolicy,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
