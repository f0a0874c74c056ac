use std::time::Duration;

use jot_core::ControllerEvent;

use crate::commands::common::{format_note_lines, mount_screen, open_store, poll_in_background};
use crate::config::Settings;
use crate::error::CliError;

pub async fn run_watch(interval_ms: u64, settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings)?;
    let (mut screen, _) = mount_screen(&store, settings);
    let mut polling = None;
    let mut poll = tokio::time::interval(Duration::from_millis(interval_ms.max(50)));

    eprintln!(
        "Watching collection '{}' in {} (Ctrl-C to stop)",
        settings.collection,
        settings.db_path.display()
    );

    loop {
        tokio::select! {
            event = screen.next_event() => {
                let Some(event) = event else { break };
                let is_delivery = matches!(event, ControllerEvent::Store { .. });
                screen.apply(event);
                if is_delivery && !screen.state().is_loading() {
                    println!("--- {} note(s) ---", screen.state().notes().len());
                    for line in format_note_lines(screen.state().notes()) {
                        println!("{line}");
                    }
                }
            }
            _ = poll.tick() => poll_in_background(&store, &mut polling),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    screen.unmount();
    Ok(())
}
