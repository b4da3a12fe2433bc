//! Note domain model.
//!
//! # Responsibility
//! - Define the title-keyed note shape shared by store and session layers.
//! - Reject blank titles at construction time.
//!
//! # Invariants
//! - A `NoteTitle` is never blank and is stored exactly as given.
//! - A `NoteCollection` holds at most one entry per title.
//! - Collection iteration order is lexicographic by title.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation error for note titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTitleError {
    raw: String,
}

impl InvalidTitleError {
    /// Returns the rejected input as provided by the caller.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl Display for InvalidTitleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.raw.is_empty() {
            write!(f, "note title cannot be empty")
        } else {
            write!(
                f,
                "note title cannot be blank (got {} whitespace chars)",
                self.raw.chars().count()
            )
        }
    }
}

impl Error for InvalidTitleError {}

/// Non-blank note title, acting as the note's primary key.
///
/// Renaming a note replaces its title, which changes its identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteTitle(String);

impl NoteTitle {
    /// Builds a title from raw input without rewriting it.
    ///
    /// Surrounding whitespace is part of the key, so `" A"` and `"A"` stay
    /// distinct notes.
    ///
    /// # Errors
    /// - Returns `InvalidTitleError` when the input is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidTitleError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidTitleError { raw });
        }
        Ok(Self(raw))
    }

    /// Wraps a title produced by core code that is known to be non-blank.
    pub(crate) fn from_generated(value: String) -> Self {
        debug_assert!(!value.trim().is_empty());
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for NoteTitle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NoteTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NoteTitle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Persisted two-field row shape shared by every backing store.
///
/// `title` is kept as a raw string here; backends may hold rows whose title
/// would not pass `NoteTitle` validation, and the store layer decides what to
/// do with them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow {
    pub title: String,
    pub content: String,
}

impl NoteRow {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Full title -> content mapping; the unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCollection {
    notes: BTreeMap<NoteTitle, String>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.notes.contains_key(title)
    }

    /// Returns the content stored under `title`.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.notes.get(title).map(String::as_str)
    }

    /// Returns the stored key together with its content.
    pub fn entry(&self, title: &str) -> Option<(&NoteTitle, &str)> {
        self.notes
            .get_key_value(title)
            .map(|(key, content)| (key, content.as_str()))
    }

    /// Inserts or overwrites one note. Returns the previous content, if any.
    pub fn insert(&mut self, title: NoteTitle, content: impl Into<String>) -> Option<String> {
        self.notes.insert(title, content.into())
    }

    /// Removes one note. Returns its content when it was present.
    pub fn remove(&mut self, title: &str) -> Option<String> {
        self.notes.remove(title)
    }

    /// Sorted titles for list rendering.
    pub fn titles(&self) -> impl Iterator<Item = &NoteTitle> {
        self.notes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NoteTitle, &str)> {
        self.notes
            .iter()
            .map(|(title, content)| (title, content.as_str()))
    }

    /// Flattens the collection into persisted rows, sorted by title.
    pub fn to_rows(&self) -> Vec<NoteRow> {
        self.iter()
            .map(|(title, content)| NoteRow::new(title.as_str(), content))
            .collect()
    }
}

impl FromIterator<(NoteTitle, String)> for NoteCollection {
    fn from_iter<I: IntoIterator<Item = (NoteTitle, String)>>(iter: I) -> Self {
        Self {
            notes: iter.into_iter().collect(),
        }
    }
}
