use crate::commands::common::{load_screen, resolve_note, resolve_note_content, settle};
use crate::config::Settings;
use crate::error::CliError;

pub async fn run_edit(
    id: &str,
    content_parts: &[String],
    settings: &Settings,
) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let (mut screen, notifier) = load_screen(settings).await?;
    let note = resolve_note(screen.state().notes(), id)?.clone();

    if note.title == content {
        println!("{}", note.id);
        return Ok(());
    }

    screen.edit(note.clone());
    screen.set_input(content);
    if screen.save().is_none() {
        return Err(CliError::EmptyContent);
    }
    settle(&mut screen, &notifier).await?;

    println!("{}", note.id);
    Ok(())
}
