//! Interactive notes screen.
//!
//! Reads one command per line while applying subscription deliveries as they
//! arrive, so changes made elsewhere show up between commands.

use std::time::Duration;

use jot_core::{ConfirmPrompt, ControllerEvent, DialogMode, Note, NoteId, UiState};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::commands::common::{
    is_affirmative, mount_screen, note_preview, open_store, poll_in_background, resolve_note,
    short_id, Screen,
};
use crate::config::Settings;
use crate::error::CliError;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

const HELP: &str = "\
Commands:
  ls              show the list
  new             start a new note
  open <n|id>     edit note number n (or by id prefix)
  text <content>  set the dialog text
  save            save the dialog
  cancel          close the dialog
  delete          delete the open note
  status          show the dialog
  help            show this help
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    New,
    Open(String),
    Text(String),
    Save,
    Cancel,
    Delete,
    Status,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "ls" | "list" => Ok(Self::List),
            "new" => Ok(Self::New),
            "open" | "edit" if rest.is_empty() => Err("usage: open <n|id>".to_string()),
            "open" | "edit" => Ok(Self::Open(rest.to_string())),
            "text" => Ok(Self::Text(rest.to_string())),
            "save" => Ok(Self::Save),
            "cancel" => Ok(Self::Cancel),
            "delete" | "rm" => Ok(Self::Delete),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Resolve `open` targets: a 1-based list position, else an id or id prefix.
pub fn resolve_target<'a>(notes: &'a [Note], target: &str) -> Result<&'a Note, CliError> {
    if let Ok(position) = target.parse::<usize>() {
        if let Some(note) = position.checked_sub(1).and_then(|index| notes.get(index)) {
            return Ok(note);
        }
    }
    resolve_note(notes, target)
}

pub fn numbered_lines(state: &UiState) -> Vec<String> {
    if state.is_loading() {
        return vec!["Loading...".to_string()];
    }
    if state.shows_empty_placeholder() {
        return vec!["No notes found".to_string()];
    }
    state
        .notes()
        .iter()
        .enumerate()
        .map(|(index, note)| {
            format!(
                "{:>3}. {:<13}  {}",
                index + 1,
                short_id(note),
                note_preview(note, 60)
            )
        })
        .collect()
}

pub fn dialog_line(state: &UiState) -> Option<String> {
    let lock = if state.is_dialog_locked() { " (saving)" } else { "" };
    match state.dialog_mode()? {
        DialogMode::Create => Some(format!("[new note{lock}] {}", state.input())),
        DialogMode::Edit => {
            let id = state.selected_note().map_or("", |note| note.id.as_str());
            Some(format!("[editing {id}{lock}] {}", state.input()))
        }
    }
}

pub async fn run_shell(settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let (mut screen, _) = mount_screen(&store, settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut polling = None;
    let mut poll = tokio::time::interval(POLL_INTERVAL);

    println!("{HELP}");
    loop {
        tokio::select! {
            event = screen.next_event() => {
                let Some(event) = event else { break };
                let is_delivery = matches!(event, ControllerEvent::Store { .. });
                screen.apply(event);
                if is_delivery {
                    render_list(screen.state());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => execute(&mut screen, command, &mut lines).await?,
                    Err(message) if message.is_empty() => {}
                    Err(message) => eprintln!("{message}"),
                }
            }
            _ = poll.tick() => poll_in_background(&store, &mut polling),
        }
    }

    screen.unmount();
    screen.settle().await;
    Ok(())
}

async fn execute(
    screen: &mut Screen,
    command: ShellCommand,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), CliError> {
    match command {
        ShellCommand::List => render_list(screen.state()),
        ShellCommand::New => screen.new_note(),
        ShellCommand::Open(target) => {
            let resolved: Result<NoteId, CliError> =
                resolve_target(screen.state().notes(), &target).map(|note| note.id.clone());
            match resolved {
                Ok(id) => {
                    screen.edit_by_id(&id);
                }
                Err(error) => eprintln!("{error}"),
            }
        }
        ShellCommand::Text(text) => {
            if screen.state().is_dialog_open() {
                screen.set_input(text);
            } else {
                eprintln!("No dialog open (use 'new' or 'open')");
            }
        }
        ShellCommand::Save => {
            screen.save();
        }
        ShellCommand::Cancel => screen.cancel(),
        ShellCommand::Delete => {
            if screen.state().selected_note().is_none() {
                eprintln!("Open a note first");
                return Ok(());
            }
            let prompt = ConfirmPrompt::DELETE_NOTE;
            eprint!("{}: {} [y/N] ", prompt.title, prompt.message);
            let answer = lines.next_line().await?.unwrap_or_default();
            let confirmed = is_affirmative(&answer);
            if screen
                .delete_selected(&mut |_: &ConfirmPrompt| confirmed)
                .is_none()
            {
                eprintln!("Cancelled");
            }
        }
        ShellCommand::Status => {
            if dialog_line(screen.state()).is_none() {
                println!("No dialog open");
            }
        }
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::Quit => {}
    }

    if let Some(line) = dialog_line(screen.state()) {
        println!("{line}");
    }
    Ok(())
}

fn render_list(state: &UiState) {
    for line in numbered_lines(state) {
        println!("{line}");
    }
}
