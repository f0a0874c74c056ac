use jot_core::Mutation;

use crate::commands::common::{load_screen, resolve_note_content, settle};
use crate::config::Settings;
use crate::error::CliError;

pub async fn run_add(content_parts: &[String], settings: &Settings) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;
    let (mut screen, notifier) = load_screen(settings).await?;

    screen.new_note();
    screen.set_input(content);
    let Some(Mutation::Create { id, .. }) = screen.save() else {
        return Err(CliError::EmptyContent);
    };
    settle(&mut screen, &notifier).await?;

    println!("{id}");
    Ok(())
}
