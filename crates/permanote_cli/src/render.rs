//! Text rendering for session snapshots and command results.

use permanote_core::{CommandOutcome, SessionError, SessionSnapshot};
use std::fmt::{self, Write};

pub const HELP: &str = "\
Commands:
  new                 start a new note
  open <title>        open an existing note
  edit <content>      replace the draft (\\n for new lines)
  append <line>       add a line to the draft
  rename <title>      retitle the open note
  save                save the open note
  delete              delete the open note (or discard an unsaved one)
  list | show         print notes and the editor
  help                show this help
  quit                leave the shell
";

/// Renders the note list followed by the editor pane.
pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    // Writing into a `String` cannot fail.
    let _ = write_snapshot(&mut out, snapshot);
    out
}

fn write_snapshot(out: &mut String, snapshot: &SessionSnapshot) -> fmt::Result {
    writeln!(out, "== Notes ({}) ==", snapshot.titles.len())?;
    if snapshot.titles.is_empty() {
        writeln!(out, "  (no notes yet)")?;
    }
    for title in &snapshot.titles {
        let marker = if snapshot.selected.as_deref() == Some(title.as_str()) {
            '*'
        } else {
            ' '
        };
        writeln!(out, "{marker} {title}")?;
    }

    let Some(title) = &snapshot.selected else {
        return writeln!(out, "Open a note with `open <title>` or type `new` to get started.");
    };
    let dirty = if snapshot.dirty { " (unsaved)" } else { "" };
    writeln!(out, "-- Editing: {title}{dirty} --")?;
    if let Some(rejected) = &snapshot.rejected_title {
        writeln!(out, "!! title {rejected:?} is not valid; rename before saving")?;
    }
    for line in snapshot.draft.lines() {
        writeln!(out, "| {line}")?;
    }
    Ok(())
}

/// One-line confirmation for outcomes worth announcing.
pub fn render_outcome(outcome: &CommandOutcome) -> Option<String> {
    match outcome {
        CommandOutcome::Renamed {
            title,
            overwrites_existing: true,
        } => Some(format!(
            "note '{title}' already exists; saving will overwrite it"
        )),
        CommandOutcome::Saved(title) => Some(format!("Note '{title}' saved.")),
        CommandOutcome::Deleted(title) => Some(format!("Note '{title}' deleted.")),
        CommandOutcome::DraftDiscarded(title) => {
            Some(format!("Unsaved note '{title}' discarded."))
        }
        CommandOutcome::Opened(_)
        | CommandOutcome::DraftEdited
        | CommandOutcome::Renamed { .. } => None,
    }
}

pub fn render_error(err: &SessionError) -> String {
    match err {
        SessionError::Store(store_err) if store_err.is_write() => {
            format!("error: {err}; your edits are kept, retry the command")
        }
        _ => format!("error: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{render_outcome, render_snapshot};
    use permanote_core::{CommandOutcome, NoteTitle, SessionSnapshot};

    #[test]
    fn snapshot_marks_open_note_and_dirty_state() {
        let snapshot = SessionSnapshot {
            titles: vec!["A".to_string(), "B".to_string()],
            selected: Some("B".to_string()),
            draft: "one\ntwo".to_string(),
            rejected_title: None,
            dirty: true,
        };

        let rendered = render_snapshot(&snapshot);
        assert!(rendered.contains("  A\n"));
        assert!(rendered.contains("* B\n"));
        assert!(rendered.contains("Editing: B (unsaved)"));
        assert!(rendered.contains("| one\n| two\n"));
    }

    #[test]
    fn empty_session_shows_hint() {
        let snapshot = SessionSnapshot {
            titles: Vec::new(),
            selected: None,
            draft: String::new(),
            rejected_title: None,
            dirty: false,
        };
        assert!(render_snapshot(&snapshot).contains("type `new`"));
    }

    #[test]
    fn rejected_title_is_shown_in_editor_header() {
        let snapshot = SessionSnapshot {
            titles: Vec::new(),
            selected: Some("Untitled Note (1)".to_string()),
            draft: "hello".to_string(),
            rejected_title: Some(String::new()),
            dirty: true,
        };
        let rendered = render_snapshot(&snapshot);
        assert!(rendered.contains("title \"\" is not valid; rename before saving"));
        assert!(rendered.contains("| hello\n"));
    }

    #[test]
    fn only_overwriting_rename_is_announced() {
        let title = NoteTitle::new("B").unwrap();
        let quiet = CommandOutcome::Renamed {
            title: title.clone(),
            overwrites_existing: false,
        };
        let loud = CommandOutcome::Renamed {
            title,
            overwrites_existing: true,
        };
        assert_eq!(render_outcome(&quiet), None);
        assert!(render_outcome(&loud).unwrap().contains("overwrite"));
    }
}
