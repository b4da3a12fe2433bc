use permanote_core::{
    BackingStore, CommandOutcome, MemoryBackingStore, NoteRow, NoteSession, NoteStore,
    Selection, SessionCommand, SessionError, SqliteBackingStore, WriteRetryPolicy,
};
use std::collections::HashSet;

fn memory_session(rows: Vec<NoteRow>) -> NoteSession<MemoryBackingStore> {
    let store = NoteStore::new(MemoryBackingStore::with_rows(rows))
        .with_retry_policy(WriteRetryPolicy::none());
    let started = NoteSession::start(store);
    assert!(started.load_error.is_none());
    started.session
}

fn persisted(session: &NoteSession<MemoryBackingStore>) -> Vec<NoteRow> {
    session.store().backend().rows().to_vec()
}

#[test]
fn new_note_edit_save_persists_placeholder_title() {
    let mut session = memory_session(Vec::new());

    let title = session.new_note();
    assert_eq!(title.as_str(), "Untitled Note (1)");
    session.edit_draft("hello").unwrap();
    session.save().unwrap();

    assert_eq!(
        persisted(&session),
        vec![NoteRow::new("Untitled Note (1)", "hello")]
    );
    assert_eq!(session.state().selection(), &Selection::NoteOpen(title));
}

#[test]
fn select_then_delete_empties_store() {
    let mut session = memory_session(vec![NoteRow::new("A", "x")]);

    session.select_note("A").unwrap();
    assert_eq!(session.state().draft(), "x");
    let outcome = session.delete().unwrap();

    assert!(outcome.persisted());
    assert!(persisted(&session).is_empty());
    assert_eq!(session.state().selection(), &Selection::NoNoteOpen);
    assert_eq!(session.state().draft(), "");
}

#[test]
fn save_adds_note_to_existing_collection() {
    let existing = vec![NoteRow::new("groceries", "milk"), NoteRow::new("todo", "")];
    let mut session = memory_session(existing.clone());

    session.new_note();
    session.rename_draft("ideas").unwrap();
    session.edit_draft("rust crate").unwrap();
    session.save().unwrap();

    let mut expected = existing;
    expected.push(NoteRow::new("ideas", "rust crate"));
    expected.sort_by(|a, b| a.title.cmp(&b.title));
    assert_eq!(persisted(&session), expected);

    let reloaded = NoteSession::start(NoteStore::new(session.store().backend().clone())).session;
    assert_eq!(reloaded.collection(), session.collection());
}

#[test]
fn repeated_save_is_idempotent() {
    let mut session = memory_session(vec![NoteRow::new("A", "x")]);
    session.select_note("A").unwrap();
    session.edit_draft("y").unwrap();

    session.save().unwrap();
    let after_first = persisted(&session);
    session.save().unwrap();

    assert_eq!(persisted(&session), after_first);
    assert_eq!(session.store().backend().writes(), 2);
}

#[test]
fn rename_moves_content_to_new_title() {
    let mut session = memory_session(vec![NoteRow::new("A", "alpha body")]);

    session.select_note("A").unwrap();
    let overwrites = session.rename_draft("B").unwrap();
    assert!(!overwrites);
    assert!(!session.collection().contains("A"));
    assert_eq!(session.store().backend().writes(), 0);

    session.save().unwrap();
    assert_eq!(persisted(&session), vec![NoteRow::new("B", "alpha body")]);
}

#[test]
fn rename_onto_existing_title_overwrites_it_on_save() {
    let mut session = memory_session(vec![
        NoteRow::new("A", "from a"),
        NoteRow::new("B", "from b"),
    ]);

    session.select_note("A").unwrap();
    assert!(session.rename_draft("B").unwrap());
    assert_eq!(session.collection().get("B"), Some("from b"));

    session.save().unwrap();
    assert_eq!(persisted(&session), vec![NoteRow::new("B", "from a")]);
}

#[test]
fn blank_rename_is_rejected_without_mutation() {
    let rows = vec![NoteRow::new("A", "x")];
    let mut session = memory_session(rows.clone());
    session.select_note("A").unwrap();
    let before = session.collection().clone();

    for blank in ["", "   ", "\t\n"] {
        let err = session.rename_draft(blank).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTitle(_)), "{blank:?}");
    }

    assert_eq!(session.collection(), &before);
    assert_eq!(session.state().selected_title().unwrap().as_str(), "A");
    assert_eq!(persisted(&session), rows);
    assert_eq!(session.store().backend().write_attempts(), 0);
}

#[test]
fn save_after_blank_rename_is_rejected_and_writes_nothing() {
    let mut session = memory_session(Vec::new());
    session.new_note();
    session.edit_draft("hello").unwrap();

    assert!(matches!(
        session.rename_draft(""),
        Err(SessionError::InvalidTitle(_))
    ));
    let err = session.save().unwrap_err();
    assert!(matches!(err, SessionError::InvalidTitle(_)));
    assert!(session.collection().is_empty());
    assert!(persisted(&session).is_empty());
    assert_eq!(session.store().backend().write_attempts(), 0);

    session.rename_draft("Greeting").unwrap();
    session.save().unwrap();
    assert_eq!(persisted(&session), vec![NoteRow::new("Greeting", "hello")]);
}

#[test]
fn titles_differing_only_by_whitespace_stay_distinct() {
    let mut session = memory_session(vec![NoteRow::new(" A", "one"), NoteRow::new("A", "two")]);
    let titles: Vec<&str> = session.titles().map(|title| title.as_str()).collect();
    assert_eq!(titles, vec![" A", "A"]);

    session.select_note("A").unwrap();
    session.save().unwrap();
    assert_eq!(
        persisted(&session),
        vec![NoteRow::new(" A", "one"), NoteRow::new("A", "two")]
    );
}

#[test]
fn rows_without_usable_title_are_reported_at_start() {
    let rows = vec![NoteRow::new("A", "x"), NoteRow::new("", "lost")];
    let backend = MemoryBackingStore::with_rows(rows);
    let started = NoteSession::start(NoteStore::new(backend));

    assert!(started.load_error.is_none());
    assert_eq!(started.skipped_rows, vec![NoteRow::new("", "lost")]);
    assert_eq!(started.session.collection().len(), 1);
}

#[test]
fn new_note_titles_never_collide() {
    let mut session = memory_session(vec![
        NoteRow::new("Untitled Note (1)", "kept"),
        NoteRow::new("Untitled Note (3)", "kept"),
    ]);

    let mut seen = HashSet::new();
    for _ in 0..25 {
        let title = session.new_note();
        assert!(!session.collection().contains(title.as_str()));
        assert!(seen.insert(title.clone()), "duplicate placeholder {title}");
        if seen.len() % 5 == 0 {
            session.save().unwrap();
        }
    }
}

#[test]
fn deleting_unsaved_note_discards_draft_without_write() {
    let mut session = memory_session(vec![NoteRow::new("A", "x")]);

    let title = session.new_note();
    session.edit_draft("scratch").unwrap();
    let outcome = session.delete().unwrap();

    assert_eq!(outcome, CommandOutcome::DraftDiscarded(title));
    assert!(!outcome.persisted());
    assert_eq!(session.store().backend().write_attempts(), 0);
    assert_eq!(session.state().selection(), &Selection::NoNoteOpen);
    assert_eq!(session.state().draft(), "");
    assert_eq!(persisted(&session), vec![NoteRow::new("A", "x")]);
}

#[test]
fn failed_save_keeps_draft_and_can_be_retried() {
    let mut session = memory_session(vec![NoteRow::new("A", "x")]);
    session.select_note("A").unwrap();
    session.edit_draft("new text").unwrap();
    session.store_mut().backend_mut().fail_next_writes(1);

    let err = session.save().unwrap_err();
    assert!(matches!(&err, SessionError::Store(store_err) if store_err.is_write()));
    assert_eq!(session.state().draft(), "new text");
    assert_eq!(session.collection().get("A"), Some("new text"));
    assert_eq!(persisted(&session), vec![NoteRow::new("A", "x")]);

    session.save().unwrap();
    assert_eq!(persisted(&session), vec![NoteRow::new("A", "new text")]);
}

#[test]
fn failed_delete_restores_note_and_keeps_it_open() {
    let mut session = memory_session(vec![NoteRow::new("A", "x")]);
    session.select_note("A").unwrap();
    session.store_mut().backend_mut().fail_next_writes(1);

    assert!(session.delete().is_err());
    assert_eq!(session.collection().get("A"), Some("x"));
    assert_eq!(session.state().selected_title().unwrap().as_str(), "A");

    session.delete().unwrap();
    assert!(persisted(&session).is_empty());
}

#[test]
fn unreadable_store_starts_empty_and_reports_error() {
    let mut backend = MemoryBackingStore::with_rows(vec![NoteRow::new("A", "x")]);
    backend.fail_reads("garbled sheet");
    let started = NoteSession::start(NoteStore::new(backend));

    let err = started.load_error.expect("load error should be reported");
    assert!(!err.is_write());
    assert!(err.to_string().contains("garbled sheet"));
    assert!(started.session.collection().is_empty());
    assert!(started.session.load_failed());
}

#[test]
fn apply_dispatches_one_command_per_call() {
    let mut session = memory_session(Vec::new());

    let opened = session.apply(SessionCommand::NewNote).unwrap();
    assert!(matches!(opened, CommandOutcome::Opened(_)));
    assert_eq!(
        session
            .apply(SessionCommand::EditDraft("body".to_string()))
            .unwrap(),
        CommandOutcome::DraftEdited
    );
    let renamed = session
        .apply(SessionCommand::RenameDraft("Journal".to_string()))
        .unwrap();
    assert!(matches!(
        renamed,
        CommandOutcome::Renamed {
            ref title,
            overwrites_existing: false,
        } if title.as_str() == "Journal"
    ));

    let saved = session.apply(SessionCommand::Save).unwrap();
    assert!(saved.persisted());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.titles, vec!["Journal".to_string()]);
    assert_eq!(snapshot.selected.as_deref(), Some("Journal"));
    assert_eq!(snapshot.draft, "body");
    assert!(!snapshot.dirty);

    let err = session
        .apply(SessionCommand::SelectNote("missing".to_string()))
        .unwrap_err();
    assert!(matches!(err, SessionError::NoteNotFound(_)));
    assert_eq!(session.snapshot(), snapshot);
}

#[test]
fn sqlite_backed_session_round_trips_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");

    {
        let store = NoteStore::new(SqliteBackingStore::open(&path));
        let mut session = NoteSession::start(store).session;
        session.new_note();
        session.edit_draft("first").unwrap();
        session.save().unwrap();
        session.new_note();
        session.rename_draft("second").unwrap();
        session.save().unwrap();
    }

    let mut backend = SqliteBackingStore::open(&path);
    assert_eq!(
        backend.read_all().unwrap(),
        vec![
            NoteRow::new("Untitled Note (1)", "first"),
            NoteRow::new("second", ""),
        ]
    );
}
