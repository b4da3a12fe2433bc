//! Runtime configuration for store and logging setup.
//!
//! # Responsibility
//! - Hold backend choice, data/log locations, and write retry settings.
//! - Build the configured backing store behind one `NoteStore`.
//!
//! # Invariants
//! - Store files always live directly under `data_dir`.
//! - The resolved log directory is absolute.

use crate::logging::default_log_level;
use crate::store::{
    BackingStore, JsonFileBackingStore, MemoryBackingStore, NoteStore, SqliteBackingStore,
    WriteRetryPolicy,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = ".permanote";
pub const SQLITE_FILE_NAME: &str = "notes.sqlite3";
pub const JSON_FILE_NAME: &str = "notes.json";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    UnknownBackend(String),
    EmptyDataDir,
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => {
                write!(f, "unknown backend `{value}`; expected sqlite|json|memory")
            }
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
            Self::CurrentDir(err) => write!(f, "cannot resolve current directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::UnknownBackend(_) | Self::EmptyDataDir => None,
        }
    }
}

/// Backing store implementation selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sqlite,
    Json,
    /// Nothing survives the process; useful for trying the app out.
    Memory,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
            Self::Memory => "memory",
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "json" | "file" => Ok(Self::Json),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Defaults to `<data_dir>/logs` when unset.
    pub log_dir: Option<PathBuf>,
    pub write_retry: WriteRetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: default_log_level().to_string(),
            log_dir: None,
            write_retry: WriteRetryPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Store file for file-backed backends; `None` for the memory backend.
    pub fn store_path(&self) -> Option<PathBuf> {
        match self.backend {
            BackendKind::Sqlite => Some(self.data_dir.join(SQLITE_FILE_NAME)),
            BackendKind::Json => Some(self.data_dir.join(JSON_FILE_NAME)),
            BackendKind::Memory => None,
        }
    }

    /// Absolute log directory.
    pub fn resolved_log_dir(&self) -> Result<PathBuf, ConfigError> {
        let dir = match &self.log_dir {
            Some(dir) => dir.clone(),
            None => self.data_dir.join(LOG_DIR_NAME),
        };
        if dir.is_absolute() {
            return Ok(dir);
        }
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Ok(cwd.join(dir))
    }

    /// Builds the configured backend. Nothing is opened or read yet.
    pub fn open_store(&self) -> Result<NoteStore<Box<dyn BackingStore>>, ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        let backend: Box<dyn BackingStore> = match self.backend {
            BackendKind::Sqlite => {
                Box::new(SqliteBackingStore::open(self.data_dir.join(SQLITE_FILE_NAME)))
            }
            BackendKind::Json => {
                Box::new(JsonFileBackingStore::new(self.data_dir.join(JSON_FILE_NAME)))
            }
            BackendKind::Memory => Box::new(MemoryBackingStore::new()),
        };
        Ok(NoteStore::new(backend).with_retry_policy(self.write_retry))
    }
}
