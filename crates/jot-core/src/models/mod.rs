//! Data models for jot

mod note;

pub use note::{has_content, Note, NoteDocument, NoteId};
