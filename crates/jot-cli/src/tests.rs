use std::path::PathBuf;
use std::sync::Arc;

use jot_core::notify::TracingNotifier;
use jot_core::store::MemoryStore;
use jot_core::{ControllerConfig, DialogClosePolicy, Note, NoteDocument, NoteId, SyncController};
use pretty_assertions::assert_eq;

use crate::commands::add::run_add;
use crate::commands::common::{
    format_note_lines, is_affirmative, load_screen, normalize_content, note_preview,
    resolve_note,
};
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::shell::{dialog_line, numbered_lines, resolve_target, ShellCommand};
use crate::config::{CliConfig, Overrides, Settings, COLLECTION_ENV, DB_PATH_ENV};
use crate::error::CliError;

fn notes() -> Vec<Note> {
    vec![
        Note::new("0190aa00-0000-7000-8000-000000000001", "Buy milk"),
        Note::new("0190aa00-0000-7000-8000-000000000002", "Call mom"),
        Note::new("0190bb00-0000-7000-8000-000000000003", "Water plants"),
    ]
}

fn temp_settings(dir: &tempfile::TempDir) -> Settings {
    CliConfig::default().resolve(
        Overrides {
            db_path: Some(dir.path().join("jot.db")),
            collection: None,
        },
        |_| None,
    )
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn affirmative_answers() {
    assert!(is_affirmative("y\n"));
    assert!(is_affirmative(" YES "));
    assert!(!is_affirmative(""));
    assert!(!is_affirmative("no"));
}

#[test]
fn note_preview_collapses_and_truncates() {
    let note = Note::new("n1", "  lots   of\tspace  \nsecond line");
    assert_eq!(note_preview(&note, 40), "lots of space");
    assert_eq!(note_preview(&note, 8), "lots ...");
}

#[test]
fn empty_list_prints_placeholder() {
    assert_eq!(format_note_lines(&[]), vec!["No notes found"]);
}

#[test]
fn resolve_note_by_full_id_and_prefix() {
    let notes = notes();
    let exact = resolve_note(&notes, "0190aa00-0000-7000-8000-000000000002").unwrap();
    assert_eq!(exact.title, "Call mom");

    let prefixed = resolve_note(&notes, "0190bb").unwrap();
    assert_eq!(prefixed.title, "Water plants");
}

#[test]
fn resolve_note_reports_ambiguity_and_absence() {
    let notes = notes();
    match resolve_note(&notes, "0190aa") {
        Err(CliError::AmbiguousNoteId(message)) => assert!(message.contains("ambiguous")),
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(matches!(
        resolve_note(&notes, "ffff"),
        Err(CliError::NoteNotFound(_))
    ));
    assert!(matches!(
        resolve_note(&notes, "  "),
        Err(CliError::EmptyNoteId)
    ));
}

#[test]
fn resolve_target_prefers_list_position() {
    let notes = notes();
    assert_eq!(resolve_target(&notes, "3").unwrap().title, "Water plants");
    assert_eq!(resolve_target(&notes, "0190bb").unwrap().title, "Water plants");
    assert!(resolve_target(&notes, "0").is_err());
}

#[test]
fn shell_commands_parse() {
    assert_eq!(ShellCommand::parse("ls"), Ok(ShellCommand::List));
    assert_eq!(
        ShellCommand::parse("open 2"),
        Ok(ShellCommand::Open("2".to_string()))
    );
    assert_eq!(
        ShellCommand::parse("text  Buy oat milk "),
        Ok(ShellCommand::Text("Buy oat milk".to_string()))
    );
    assert_eq!(ShellCommand::parse("TEXT"), Ok(ShellCommand::Text(String::new())));
    assert_eq!(ShellCommand::parse("q"), Ok(ShellCommand::Quit));
    assert!(ShellCommand::parse("open").is_err());
    assert!(ShellCommand::parse("frobnicate")
        .unwrap_err()
        .contains("unknown command"));
}

#[test]
fn settings_prefer_flags_then_env_then_file() {
    let file = CliConfig {
        db_path: Some(PathBuf::from("/from/file.db")),
        collection: Some("FileNotes".to_string()),
        controller: ControllerConfig::default().with_dialog_close(DialogClosePolicy::OnCompletion),
    };

    let from_file = file.resolve(Overrides::default(), |_| None);
    assert_eq!(from_file.db_path, PathBuf::from("/from/file.db"));
    assert_eq!(from_file.collection, "FileNotes");
    assert_eq!(
        from_file.controller.dialog_close,
        DialogClosePolicy::OnCompletion
    );

    let env = |key: &str| match key {
        DB_PATH_ENV => Some("/from/env.db".to_string()),
        COLLECTION_ENV => Some("  ".to_string()),
        _ => None,
    };
    let from_env = file.resolve(Overrides::default(), env);
    assert_eq!(from_env.db_path, PathBuf::from("/from/env.db"));
    assert_eq!(from_env.collection, "FileNotes");

    let from_flags = file.resolve(
        Overrides {
            db_path: Some(PathBuf::from("/from/flag.db")),
            collection: Some("Flagged".to_string()),
        },
        env,
    );
    assert_eq!(from_flags.db_path, PathBuf::from("/from/flag.db"));
    assert_eq!(from_flags.collection, "Flagged");
}

#[test]
fn defaults_use_notes_collection() {
    let settings = CliConfig::default().resolve(Overrides::default(), |_| None);
    assert_eq!(settings.collection, "Notes");
    assert!(settings.db_path.ends_with("jot/jot.db"));
}

#[test]
fn config_file_roundtrip_and_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    assert_eq!(CliConfig::load_from_path(&path).unwrap(), CliConfig::default());

    let settings = temp_settings(&dir);
    CliConfig::from(&settings).save_to_path(&path).unwrap();
    let loaded = CliConfig::load_from_path(&path).unwrap();
    assert_eq!(loaded.collection.as_deref(), Some("Notes"));

    std::fs::write(&path, r#"{ "colour": "blue" }"#).unwrap();
    let error = CliConfig::load_from_path(&path).unwrap_err();
    assert!(error.contains("unknown field"));
}

#[tokio::test]
async fn screen_lines_follow_the_controller() {
    let store = Arc::new(MemoryStore::with_documents([NoteDocument::new(
        NoteId::new("n1"),
        "Buy milk",
    )]));
    let mut screen = SyncController::new(Arc::clone(&store), TracingNotifier);
    screen.mount();
    assert_eq!(numbered_lines(screen.state()), vec!["Loading..."]);

    screen.wait_until_loaded().await;
    assert_eq!(
        numbered_lines(screen.state()),
        vec!["  1. n1             Buy milk"]
    );
    assert_eq!(dialog_line(screen.state()), None);

    screen.new_note();
    screen.set_input("draft");
    assert_eq!(
        dialog_line(screen.state()).as_deref(),
        Some("[new note] draft")
    );

    screen.edit_by_id(&NoteId::new("n1"));
    assert_eq!(
        dialog_line(screen.state()).as_deref(),
        Some("[editing n1] Buy milk")
    );
}

#[tokio::test]
async fn add_edit_delete_against_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);

    run_add(&["Buy".to_string(), "milk".to_string()], &settings)
        .await
        .unwrap();
    let (screen, _) = load_screen(&settings).await.unwrap();
    let created = screen.state().notes()[0].clone();
    assert_eq!(created.title, "Buy milk");
    drop(screen);

    let prefix: String = created.id.as_str().chars().take(30).collect();
    run_edit(&prefix, &["Buy oat milk".to_string()], &settings)
        .await
        .unwrap();
    let (screen, _) = load_screen(&settings).await.unwrap();
    assert_eq!(screen.state().notes()[0].title, "Buy oat milk");
    drop(screen);

    run_delete(created.id.as_str(), true, &settings).await.unwrap();
    let (screen, _) = load_screen(&settings).await.unwrap();
    assert!(screen.state().notes().is_empty());
}

#[tokio::test]
async fn edit_of_unknown_note_fails() {
    let dir = tempfile::tempdir().unwrap();
    let settings = temp_settings(&dir);

    let error = run_edit("missing", &["text".to_string()], &settings)
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::NoteNotFound(id) if id == "missing"));
}
