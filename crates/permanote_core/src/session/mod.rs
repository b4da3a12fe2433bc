//! Note session controller.
//!
//! # Responsibility
//! - Own one session's in-memory collection and editor state.
//! - Implement new/select/edit/rename/save/delete against `NoteStore`.
//!
//! # Invariants
//! - The collection is loaded once, in `NoteSession::start`.
//! - Every successful save or delete rewrites the whole backing store.
//! - Commands that fail validation leave the collection and store untouched.
//! - A note with a rejected title edit pending cannot be saved.
//! - A failed store write never discards the user's draft.

use crate::model::note::{InvalidTitleError, NoteCollection, NoteRow, NoteTitle};
use crate::store::{BackingStore, LoadedNotes, NoteStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod command;
mod placeholder;
mod state;

pub use command::{CommandOutcome, SessionCommand};
pub use placeholder::PlaceholderTitles;
pub use state::{Selection, SessionSnapshot, SessionState};

pub type SessionResult<T> = Result<T, SessionError>;

/// Error surface of session commands.
#[derive(Debug)]
pub enum SessionError {
    /// Title is empty or blank.
    InvalidTitle(InvalidTitleError),
    /// Command requires an open note.
    NoNoteOpen,
    /// `select_note` target is not in the collection.
    NoteNotFound(String),
    /// Backing store failure; in-memory edits are retained.
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle(err) => write!(f, "{err}"),
            Self::NoNoteOpen => write!(f, "no note is open"),
            Self::NoteNotFound(title) => write!(f, "note not found: `{title}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NoNoteOpen | Self::NoteNotFound(_) => None,
        }
    }
}

impl From<InvalidTitleError> for SessionError {
    fn from(value: InvalidTitleError) -> Self {
        Self::InvalidTitle(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of starting a session.
pub struct SessionStart<B: BackingStore> {
    pub session: NoteSession<B>,
    /// Set when the store could not be read; the session runs on an empty
    /// collection and callers must surface this to the user.
    pub load_error: Option<StoreError>,
    /// Stored rows with a blank title. They are not editable and the first
    /// save drops them, so callers must surface these too.
    pub skipped_rows: Vec<NoteRow>,
}

/// One user's editing session over a note store.
pub struct NoteSession<B: BackingStore> {
    store: NoteStore<B>,
    notes: NoteCollection,
    state: SessionState,
    placeholders: PlaceholderTitles,
    load_failed: bool,
}

impl<B: BackingStore> NoteSession<B> {
    /// Loads the collection once and opens a session with nothing selected.
    ///
    /// An unreadable store does not abort startup: the session starts empty
    /// and the error is returned in `SessionStart::load_error`.
    pub fn start(mut store: NoteStore<B>) -> SessionStart<B> {
        let (loaded, load_error) = match store.load_report() {
            Ok(loaded) => (loaded, None),
            Err(err) => {
                warn!(
                    "event=session_start module=session status=degraded backend={} error={err}",
                    err.backend()
                );
                (LoadedNotes::default(), Some(err))
            }
        };
        let LoadedNotes { notes, skipped } = loaded;
        info!(
            "event=session_start module=session status=ok notes={}",
            notes.len()
        );

        let session = Self {
            placeholders: PlaceholderTitles::seeded_from(&notes),
            load_failed: load_error.is_some(),
            store,
            notes,
            state: SessionState::default(),
        };
        SessionStart {
            session,
            load_error,
            skipped_rows: skipped,
        }
    }

    pub fn collection(&self) -> &NoteCollection {
        &self.notes
    }

    pub fn titles(&self) -> impl Iterator<Item = &NoteTitle> {
        self.notes.titles()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore<B> {
        &mut self.store
    }

    /// Whether the startup load failed and no write has succeeded since.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Whether the open note's title or draft differs from the collection.
    pub fn is_dirty(&self) -> bool {
        match self.state.selected_title() {
            Some(title) => {
                self.state.rejected_title().is_some()
                    || self.notes.get(title.as_str()) != Some(self.state.draft())
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            titles: self.notes.titles().map(|t| t.to_string()).collect(),
            selected: self.state.selected_title().map(|t| t.to_string()),
            draft: self.state.draft().to_string(),
            rejected_title: self.state.rejected_title().map(|err| err.raw().to_string()),
            dirty: self.is_dirty(),
        }
    }

    /// Applies exactly one command.
    pub fn apply(&mut self, command: SessionCommand) -> SessionResult<CommandOutcome> {
        let name = command.name();
        let result = self.dispatch(command);
        if let Err(err) = &result {
            debug!(
                "event=session_command module=session status=rejected command={name} error={err}"
            );
        }
        result
    }

    fn dispatch(&mut self, command: SessionCommand) -> SessionResult<CommandOutcome> {
        match command {
            SessionCommand::NewNote => Ok(CommandOutcome::Opened(self.new_note())),
            SessionCommand::SelectNote(title) => {
                self.select_note(&title)?;
                Ok(CommandOutcome::Opened(self.open_title()?))
            }
            SessionCommand::EditDraft(content) => {
                self.edit_draft(content)?;
                Ok(CommandOutcome::DraftEdited)
            }
            SessionCommand::RenameDraft(title) => {
                let overwrites_existing = self.rename_draft(&title)?;
                Ok(CommandOutcome::Renamed {
                    title: self.open_title()?,
                    overwrites_existing,
                })
            }
            SessionCommand::Save => self.save().map(CommandOutcome::Saved),
            SessionCommand::Delete => self.delete(),
        }
    }

    /// Opens a new unsaved note under a fresh placeholder title.
    pub fn new_note(&mut self) -> NoteTitle {
        let title = self
            .placeholders
            .next_free(&self.notes, self.state.selected_title());
        debug!("event=note_new module=session status=ok");
        self.state.open(title.clone(), String::new());
        title
    }

    /// Opens an existing note, replacing the draft with its stored content.
    pub fn select_note(&mut self, title: &str) -> SessionResult<()> {
        match self.notes.entry(title) {
            Some((key, content)) => {
                self.state.open(key.clone(), content.to_string());
                Ok(())
            }
            None => Err(SessionError::NoteNotFound(title.to_string())),
        }
    }

    /// Replaces the draft of the open note.
    pub fn edit_draft(&mut self, content: impl Into<String>) -> SessionResult<()> {
        self.require_open()?;
        self.state.set_draft(content.into());
        Ok(())
    }

    /// Retitles the open note in memory.
    ///
    /// When the title changes, the old key is removed from the collection
    /// right away; nothing is persisted until `save`. Returns whether the new
    /// title already names another note, which `save` will then overwrite.
    ///
    /// # Errors
    /// - `InvalidTitle` for blank input. The collection and selection are kept,
    ///   and the rejected edit blocks `save` until a valid rename.
    pub fn rename_draft(&mut self, title: &str) -> SessionResult<bool> {
        let current = self.require_open()?.clone();
        let title = match NoteTitle::new(title) {
            Ok(title) => title,
            Err(err) => {
                self.state.reject_title(err.clone());
                return Err(err.into());
            }
        };
        if title == current {
            self.state.retitle(title);
            return Ok(false);
        }

        self.notes.remove(current.as_str());
        let overwrites_existing = self.notes.contains(title.as_str());
        if overwrites_existing {
            info!("event=note_rename module=session status=overwrite_pending");
        }
        self.state.retitle(title);
        Ok(overwrites_existing)
    }

    /// Commits the draft under the selected title and persists everything.
    ///
    /// On a store failure the saved entry stays in memory, so calling `save`
    /// again retries the same full write.
    ///
    /// # Errors
    /// - `InvalidTitle` while a rejected title edit is pending; nothing is
    ///   inserted or written.
    pub fn save(&mut self) -> SessionResult<NoteTitle> {
        let title = self.require_open()?.clone();
        if let Some(err) = self.state.rejected_title() {
            return Err(err.clone().into());
        }
        self.notes.insert(title.clone(), self.state.draft().to_string());
        self.persist("note_save")?;
        info!(
            "event=note_save module=session status=ok title_chars={} content_chars={}",
            title.as_str().chars().count(),
            self.state.draft().chars().count()
        );
        Ok(title)
    }

    /// Removes the open note and closes the editor.
    ///
    /// An unsaved note is discarded without touching the store.
    ///
    /// If the store write fails, the removal is rolled back rather than kept
    /// in memory: the note is put back and stays open with its draft. Keeping
    /// it removed would turn a retried `delete` into a discard that never
    /// writes, leaving the note in the store.
    pub fn delete(&mut self) -> SessionResult<CommandOutcome> {
        let title = self.require_open()?.clone();
        let Some(previous) = self.notes.remove(title.as_str()) else {
            self.state.close();
            debug!("event=note_delete module=session status=discarded");
            return Ok(CommandOutcome::DraftDiscarded(title));
        };

        if let Err(err) = self.persist("note_delete") {
            self.notes.insert(title, previous);
            return Err(err);
        }
        self.state.close();
        info!("event=note_delete module=session status=ok");
        Ok(CommandOutcome::Deleted(title))
    }

    fn require_open(&self) -> SessionResult<&NoteTitle> {
        self.state.selected_title().ok_or(SessionError::NoNoteOpen)
    }

    fn open_title(&self) -> SessionResult<NoteTitle> {
        self.require_open().cloned()
    }

    fn persist(&mut self, event: &'static str) -> SessionResult<()> {
        if self.load_failed {
            warn!(
                "event={event} module=session status=overwrite_unreadable backend={}",
                self.store.backend().kind()
            );
        }
        self.store.save(&self.notes)?;
        self.load_failed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteSession, SessionError};
    use crate::model::note::NoteRow;
    use crate::store::{MemoryBackingStore, NoteStore};

    fn session_with(rows: Vec<NoteRow>) -> NoteSession<MemoryBackingStore> {
        NoteSession::start(NoteStore::new(MemoryBackingStore::with_rows(rows))).session
    }

    #[test]
    fn commands_requiring_open_note_fail_when_none_is_open() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);

        assert!(matches!(session.edit_draft("y"), Err(SessionError::NoNoteOpen)));
        assert!(matches!(session.rename_draft("B"), Err(SessionError::NoNoteOpen)));
        assert!(matches!(session.save(), Err(SessionError::NoNoteOpen)));
        assert!(matches!(session.delete(), Err(SessionError::NoNoteOpen)));
        assert_eq!(session.store().backend().write_attempts(), 0);
    }

    #[test]
    fn select_unknown_note_keeps_current_state() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);
        session.select_note("A").unwrap();
        session.edit_draft("edited").unwrap();

        let err = session.select_note("missing").unwrap_err();
        assert!(matches!(err, SessionError::NoteNotFound(title) if title == "missing"));
        assert_eq!(session.state().draft(), "edited");
    }

    #[test]
    fn dirty_tracks_difference_from_collection() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);
        assert!(!session.is_dirty());

        session.select_note("A").unwrap();
        assert!(!session.is_dirty());

        session.edit_draft("y").unwrap();
        assert!(session.is_dirty());

        session.save().unwrap();
        assert!(!session.is_dirty());
    }

    #[test]
    fn rename_to_same_title_is_a_no_op() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);
        session.select_note("A").unwrap();

        assert!(!session.rename_draft("A").unwrap());
        assert!(session.collection().contains("A"));
    }

    #[test]
    fn valid_rename_clears_rejected_title() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);
        session.select_note("A").unwrap();
        session.edit_draft("y").unwrap();

        assert!(session.rename_draft("").is_err());
        assert_eq!(session.snapshot().rejected_title.as_deref(), Some(""));
        assert!(session.is_dirty());

        session.rename_draft("A").unwrap();
        assert!(session.state().rejected_title().is_none());
        assert_eq!(session.save().unwrap().as_str(), "A");
        assert_eq!(session.store().backend().rows(), &[NoteRow::new("A", "y")]);
    }

    #[test]
    fn opening_another_note_clears_rejected_title() {
        let mut session = session_with(vec![NoteRow::new("A", "x")]);
        session.new_note();
        assert!(session.rename_draft(" ").is_err());

        session.select_note("A").unwrap();
        assert!(session.state().rejected_title().is_none());
        session.save().unwrap();
    }
}
