//! Command dispatch types for presentation layers.
//!
//! Each user action maps to exactly one `SessionCommand`, applied once through
//! `NoteSession::apply`.

use crate::model::note::NoteTitle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    NewNote,
    SelectNote(String),
    EditDraft(String),
    RenameDraft(String),
    Save,
    Delete,
}

impl SessionCommand {
    /// Stable command label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewNote => "new_note",
            Self::SelectNote(_) => "select_note",
            Self::EditDraft(_) => "edit_draft",
            Self::RenameDraft(_) => "rename_draft",
            Self::Save => "save",
            Self::Delete => "delete",
        }
    }
}

/// What one successfully applied command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A note is now open, either freshly created or selected.
    Opened(NoteTitle),
    DraftEdited,
    Renamed {
        title: NoteTitle,
        /// The next save will replace an existing note with this title.
        overwrites_existing: bool,
    },
    Saved(NoteTitle),
    Deleted(NoteTitle),
    /// The open note was never saved; it was dropped without a store write.
    DraftDiscarded(NoteTitle),
}

impl CommandOutcome {
    /// Whether the command wrote the backing store.
    pub fn persisted(&self) -> bool {
        matches!(self, Self::Saved(_) | Self::Deleted(_))
    }
}
