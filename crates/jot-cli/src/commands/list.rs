use crate::commands::common::{format_note_lines, load_screen, note_to_list_item, NoteListItem};
use crate::config::Settings;
use crate::error::CliError;

pub async fn run_list(as_json: bool, settings: &Settings) -> Result<(), CliError> {
    let (screen, _) = load_screen(settings).await?;
    let notes = screen.state().notes();

    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_note_lines(notes) {
            println!("{line}");
        }
    }

    Ok(())
}
