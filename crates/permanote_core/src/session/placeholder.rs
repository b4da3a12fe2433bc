//! Placeholder titles for freshly created notes.

use crate::model::note::{NoteCollection, NoteTitle};
use once_cell::sync::Lazy;
use regex::Regex;

const PLACEHOLDER_PREFIX: &str = "Untitled Note";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Untitled Note \((\d{1,18})\)$").expect("valid placeholder regex")
});

/// Monotonic `Untitled Note (n)` generator for one session.
///
/// # Invariants
/// - A generated title never matches an existing collection key.
/// - Titles are never handed out twice within one session, saved or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderTitles {
    next: u64,
}

impl PlaceholderTitles {
    /// Starts counting after the highest placeholder already in `notes`.
    pub fn seeded_from(notes: &NoteCollection) -> Self {
        let highest = notes
            .titles()
            .filter_map(|title| placeholder_number(title.as_str()))
            .max()
            .unwrap_or(0);
        Self {
            next: highest.saturating_add(1),
        }
    }

    /// Returns the next title absent from `notes` and different from `open`.
    pub fn next_free(&mut self, notes: &NoteCollection, open: Option<&NoteTitle>) -> NoteTitle {
        loop {
            let candidate = format!("{PLACEHOLDER_PREFIX} ({})", self.next);
            self.next = self.next.saturating_add(1);
            let taken = notes.contains(&candidate)
                || open.is_some_and(|title| title.as_str() == candidate);
            if !taken {
                return NoteTitle::from_generated(candidate);
            }
        }
    }
}

impl Default for PlaceholderTitles {
    fn default() -> Self {
        Self { next: 1 }
    }
}

fn placeholder_number(title: &str) -> Option<u64> {
    PLACEHOLDER_RE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{placeholder_number, PlaceholderTitles};
    use crate::model::note::{NoteCollection, NoteTitle};

    #[test]
    fn first_placeholder_in_empty_collection_is_one() {
        let notes = NoteCollection::new();
        let mut titles = PlaceholderTitles::seeded_from(&notes);
        assert_eq!(titles.next_free(&notes, None).as_str(), "Untitled Note (1)");
        assert_eq!(titles.next_free(&notes, None).as_str(), "Untitled Note (2)");
    }

    #[test]
    fn seeding_skips_past_existing_placeholders() {
        let mut notes = NoteCollection::new();
        notes.insert(NoteTitle::new("Untitled Note (4)").unwrap(), "");
        notes.insert(NoteTitle::new("Untitled Note (x)").unwrap(), "");
        let mut titles = PlaceholderTitles::seeded_from(&notes);
        assert_eq!(titles.next_free(&notes, None).as_str(), "Untitled Note (5)");
    }

    #[test]
    fn skips_titles_that_are_taken_or_open() {
        let mut notes = NoteCollection::new();
        notes.insert(NoteTitle::new("Untitled Note (1)").unwrap(), "");
        let open = NoteTitle::new("Untitled Note (2)").unwrap();
        let mut titles = PlaceholderTitles::default();
        assert_eq!(
            titles.next_free(&notes, Some(&open)).as_str(),
            "Untitled Note (3)"
        );
    }

    #[test]
    fn placeholder_number_parses_only_exact_shape() {
        assert_eq!(placeholder_number("Untitled Note (12)"), Some(12));
        assert_eq!(placeholder_number("Untitled Note (12) copy"), None);
        assert_eq!(placeholder_number("untitled note (1)"), None);
    }
}
