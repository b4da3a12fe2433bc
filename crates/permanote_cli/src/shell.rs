//! Line-oriented command shell over one note session.
//!
//! # Responsibility
//! - Parse one input line into at most one session command.
//! - Render the session after every command.
//!
//! # Invariants
//! - Each line dispatches at most one `SessionCommand`.
//! - Errors are printed inline; the shell keeps running.

use crate::render::{render_error, render_outcome, render_snapshot, HELP};
use log::info;
use permanote_core::{BackingStore, NoteSession, SessionCommand};
use std::io::{self, BufRead, Write};

const PROMPT: &str = "permanote> ";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Session(SessionCommand),
    /// Appends a line to the current draft; dispatched as one `EditDraft`.
    Append(String),
    List,
    Show,
    Help,
    Quit,
    Empty,
}

/// Parses one input line.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest),
        None => (trimmed, ""),
    };
    let command = match verb.to_ascii_lowercase().as_str() {
        "new" => ShellCommand::Session(SessionCommand::NewNote),
        "open" | "select" => ShellCommand::Session(SessionCommand::SelectNote(
            required(verb, rest.trim())?.to_string(),
        )),
        "edit" => ShellCommand::Session(SessionCommand::EditDraft(unescape(rest))),
        "append" => ShellCommand::Append(unescape(rest)),
        // Blank titles are passed through so the session reports them.
        "rename" => ShellCommand::Session(SessionCommand::RenameDraft(rest.trim().to_string())),
        "save" => ShellCommand::Session(SessionCommand::Save),
        "delete" | "rm" => ShellCommand::Session(SessionCommand::Delete),
        "list" | "ls" => ShellCommand::List,
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command `{other}`; type `help`")),
    };
    Ok(command)
}

/// Runs the shell until `quit` or end of input.
pub fn run<B, R, W>(session: &mut NoteSession<B>, input: R, mut output: W) -> io::Result<()>
where
    B: BackingStore,
    R: BufRead,
    W: Write,
{
    write!(output, "{}", render_snapshot(&session.snapshot()))?;
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        let Some(line) = lines.next().transpose()? else {
            writeln!(output)?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };

        match command {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                write!(output, "{HELP}")?;
                continue;
            }
            ShellCommand::List | ShellCommand::Show => {}
            ShellCommand::Append(extra) => {
                let draft = appended(session.state().draft(), &extra);
                dispatch(session, SessionCommand::EditDraft(draft), &mut output)?;
            }
            ShellCommand::Session(command) => dispatch(session, command, &mut output)?,
        }
        write!(output, "{}", render_snapshot(&session.snapshot()))?;
    }

    if session.is_dirty() {
        writeln!(output, "warning: unsaved changes were discarded")?;
    }
    info!("event=shell_exit module=cli status=ok dirty={}", session.is_dirty());
    Ok(())
}

fn dispatch<B: BackingStore, W: Write>(
    session: &mut NoteSession<B>,
    command: SessionCommand,
    output: &mut W,
) -> io::Result<()> {
    match session.apply(command) {
        Ok(outcome) => {
            if let Some(message) = render_outcome(&outcome) {
                writeln!(output, "{message}")?;
            }
        }
        Err(err) => writeln!(output, "{}", render_error(&err))?,
    }
    Ok(())
}

fn required<'a>(verb: &str, value: &'a str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("usage: {verb} <title>"))
    } else {
        Ok(value)
    }
}

fn appended(draft: &str, extra: &str) -> String {
    if draft.is_empty() {
        extra.to_string()
    } else {
        format!("{draft}\n{extra}")
    }
}

/// Expands `\n`, `\t` and `\\` escapes.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
