use std::cell::Cell;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::rc::Rc;
use std::sync::Arc;

use jot_core::notify::{Notification, NotificationLevel, Notifier};
use jot_core::store::SqliteStore;
use jot_core::{Confirm, ConfirmPrompt, Note, SyncController};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::error::CliError;

pub type Screen = SyncController<SqliteStore, StderrNotifier>;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
}

/// Prints notifications to stderr and remembers the last level shown.
#[derive(Clone, Default)]
pub struct StderrNotifier {
    last_level: Rc<Cell<Option<NotificationLevel>>>,
}

impl StderrNotifier {
    pub fn last_level(&self) -> Option<NotificationLevel> {
        self.last_level.get()
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "!",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{marker}] {notification}");
        self.last_level.set(Some(notification.level));
    }
}

/// Asks on stdin unless `--yes` was given.
pub struct StdinConfirm {
    pub assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        if self.assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            tracing::warn!("Refusing to delete without a terminal; pass --yes");
            return false;
        }

        eprint!("{}: {} [y/N] ", prompt.title, prompt.message);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_affirmative(&answer)
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn open_store(settings: &Settings) -> Result<Arc<SqliteStore>, CliError> {
    Ok(Arc::new(SqliteStore::open(
        &settings.db_path,
        settings.collection.clone(),
    )?))
}

/// Build a controller over `store` and mount it.
pub fn mount_screen(store: &Arc<SqliteStore>, settings: &Settings) -> (Screen, StderrNotifier) {
    let notifier = StderrNotifier::default();
    let mut screen =
        SyncController::new(Arc::clone(store), notifier.clone()).with_config(settings.controller);
    screen.mount();
    (screen, notifier)
}

/// Check for commits from other processes in the background, unless the
/// previous check is still running.
pub fn poll_in_background(store: &Arc<SqliteStore>, running: &mut Option<JoinHandle<()>>) {
    if running.as_ref().is_some_and(|task| !task.is_finished()) {
        return;
    }
    let poll = store.poll_external_changes();
    *running = Some(tokio::spawn(async move {
        if let Err(error) = poll.await {
            tracing::warn!("Failed to check for external changes: {error}");
        }
    }));
}

/// Mount and wait for the first delivery; fails if that delivery is an error.
pub async fn load_screen(settings: &Settings) -> Result<(Screen, StderrNotifier), CliError> {
    let store = open_store(settings)?;
    let (mut screen, notifier) = mount_screen(&store, settings);
    screen.wait_until_loaded().await;
    if notifier.last_level() == Some(NotificationLevel::Error) {
        return Err(CliError::SubscriptionFailed);
    }
    Ok((screen, notifier))
}

/// Wait for in-flight mutations and turn a failure into an error.
pub async fn settle(screen: &mut Screen, notifier: &StderrNotifier) -> Result<(), CliError> {
    screen.settle().await;
    if notifier.last_level() == Some(NotificationLevel::Error) {
        Err(CliError::MutationFailed)
    } else {
        Ok(())
    }
}

/// Find a note by full id, or by a prefix matching exactly one note.
pub fn resolve_note<'a>(notes: &'a [Note], query: &str) -> Result<&'a Note, CliError> {
    let query = normalize_note_identifier(query)?;
    if let Some(note) = notes.iter().find(|note| note.id.as_str() == query) {
        return Ok(note);
    }

    let matching: Vec<&Note> = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&query))
        .collect();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok(*note),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(note))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousNoteId(format!(
                "Note ID prefix '{query}' is ambiguous (matches: {options})"
            )))
        }
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn short_id(note: &Note) -> String {
    note.id.as_str().chars().take(13).collect()
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.title_preview(usize::MAX);
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    if notes.is_empty() {
        return vec!["No notes found".to_string()];
    }
    notes
        .iter()
        .map(|note| format!("{:<13}  {}", short_id(note), note_preview(note, 60)))
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
    }
}
