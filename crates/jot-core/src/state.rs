//! Screen state owned by a [`SyncController`](crate::SyncController).
//!
//! Front ends only ever see `&UiState`; every transition below is
//! crate-private and reachable through controller intents.

use crate::models::Note;

/// Which kind of save the open dialog will perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

/// State of the single notes screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    notes: Vec<Note>,
    is_loading: bool,
    selected_note: Option<Note>,
    input: String,
    dialog_open: bool,
    dialog_locked: bool,
}

impl UiState {
    /// Notes as last delivered by the subscription, in delivery order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub const fn selected_note(&self) -> Option<&Note> {
        self.selected_note.as_ref()
    }

    /// Text currently typed into the dialog.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub const fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// True while an open dialog waits for its save/delete to settle.
    pub const fn is_dialog_locked(&self) -> bool {
        self.dialog_locked
    }

    pub const fn dialog_mode(&self) -> Option<DialogMode> {
        if !self.dialog_open {
            None
        } else if self.selected_note.is_some() {
            Some(DialogMode::Edit)
        } else {
            Some(DialogMode::Create)
        }
    }

    /// Whether the list should render its "no notes" placeholder.
    pub fn shows_empty_placeholder(&self) -> bool {
        !self.is_loading && self.notes.is_empty()
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub(crate) fn replace_notes(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
    }

    pub(crate) fn open_create(&mut self) {
        self.selected_note = None;
        self.input.clear();
        self.dialog_open = true;
        self.dialog_locked = false;
    }

    pub(crate) fn open_edit(&mut self, note: Note) {
        self.input.clone_from(&note.title);
        self.selected_note = Some(note);
        self.dialog_open = true;
        self.dialog_locked = false;
    }

    pub(crate) fn lock_dialog(&mut self) {
        self.dialog_locked = true;
    }

    pub(crate) fn close_dialog(&mut self) {
        self.selected_note = None;
        self.input.clear();
        self.dialog_open = false;
        self.dialog_locked = false;
    }
}
