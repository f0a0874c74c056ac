use crate::commands::common::{load_screen, resolve_note, settle, StdinConfirm};
use crate::config::Settings;
use crate::error::CliError;

pub async fn run_delete(id: &str, assume_yes: bool, settings: &Settings) -> Result<(), CliError> {
    let (mut screen, notifier) = load_screen(settings).await?;
    let note = resolve_note(screen.state().notes(), id)?.clone();

    screen.edit(note.clone());
    let mut confirm = StdinConfirm { assume_yes };
    if screen.delete_selected(&mut confirm).is_none() {
        screen.cancel();
        eprintln!("Cancelled");
        return Ok(());
    }
    settle(&mut screen, &notifier).await?;

    println!("{}", note.id);
    Ok(())
}
