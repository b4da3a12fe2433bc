//! Interactive note shell.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment.
//! - Start logging and one note session, then hand stdin to the shell.

mod render;
mod shell;

use anyhow::Context;
use clap::Parser;
use log::info;
use permanote_core::config::DEFAULT_DATA_DIR;
use permanote_core::{
    default_log_level, init_logging, AppConfig, BackendKind, NoteSession, SessionStart,
    WriteRetryPolicy,
};
use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "permanote", version)]
#[command(about = "Keep short text notes that persist across sessions")]
struct Cli {
    /// Storage backend: sqlite, json, or memory.
    #[arg(long, env = "PERMANOTE_BACKEND", default_value = "sqlite")]
    backend: BackendKind,

    /// Directory holding the note store.
    #[arg(long, env = "PERMANOTE_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "PERMANOTE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log directory; defaults to `<data-dir>/logs`.
    #[arg(long, env = "PERMANOTE_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Attempts per store write, including the first.
    #[arg(long, default_value_t = 2)]
    write_attempts: u32,

    /// Backoff before the first write retry, in milliseconds.
    #[arg(long, default_value_t = 50)]
    retry_backoff_ms: u64,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig {
            backend: self.backend,
            data_dir: self.data_dir,
            log_level: self
                .log_level
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: self.log_dir,
            write_retry: WriteRetryPolicy {
                max_attempts: self.write_attempts,
                initial_backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config();

    let log_dir = config
        .resolved_log_dir()
        .context("failed to resolve log directory")?;
    if let Err(err) = init_logging(&config.log_level, &log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let store = config
        .open_store()
        .context("failed to configure note store")?;
    info!(
        "event=cli_start module=cli status=ok backend={} version={}",
        config.backend,
        permanote_core::core_version()
    );

    let SessionStart {
        mut session,
        load_error,
        skipped_rows,
    } = NoteSession::start(store);
    if let Some(err) = load_error {
        eprintln!("error: {err}");
        eprintln!("warning: starting with no notes; saving will overwrite the unreadable store");
    }
    if !skipped_rows.is_empty() {
        eprintln!(
            "warning: {} stored note(s) have a blank title and will be dropped on the next save",
            skipped_rows.len()
        );
    }

    shell::run(&mut session, io::stdin().lock(), io::stdout().lock())
        .context("shell I/O failed")?;
    Ok(())
}
