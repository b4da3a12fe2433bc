//! Transient per-session editor state.

use crate::model::note::{InvalidTitleError, NoteTitle};

/// Which note, if any, the editor currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoNoteOpen,
    /// The title need not exist in the collection yet (unsaved new note).
    NoteOpen(NoteTitle),
}

/// Selected note plus its uncommitted edit buffers.
///
/// `rejected_title` holds the last title edit that failed validation. While it
/// is set the note cannot be saved; a valid rename or opening another note
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    selection: Selection,
    draft: String,
    rejected_title: Option<InvalidTitleError>,
}

impl SessionState {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_title(&self) -> Option<&NoteTitle> {
        match &self.selection {
            Selection::NoteOpen(title) => Some(title),
            Selection::NoNoteOpen => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.selection, Selection::NoteOpen(_))
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn rejected_title(&self) -> Option<&InvalidTitleError> {
        self.rejected_title.as_ref()
    }

    pub(crate) fn open(&mut self, title: NoteTitle, draft: String) {
        self.selection = Selection::NoteOpen(title);
        self.draft = draft;
        self.rejected_title = None;
    }

    pub(crate) fn retitle(&mut self, title: NoteTitle) {
        self.selection = Selection::NoteOpen(title);
        self.rejected_title = None;
    }

    pub(crate) fn reject_title(&mut self, err: InvalidTitleError) {
        self.rejected_title = Some(err);
    }

    pub(crate) fn set_draft(&mut self, draft: String) {
        self.draft = draft;
    }

    pub(crate) fn close(&mut self) {
        *self = Self::default();
    }
}

/// Owned view of one session, for rendering after each command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Collection titles in display order.
    pub titles: Vec<String>,
    pub selected: Option<String>,
    pub draft: String,
    /// Pending title edit that failed validation, as typed.
    pub rejected_title: Option<String>,
    /// Whether the open note differs from what the collection holds.
    pub dirty: bool,
}
