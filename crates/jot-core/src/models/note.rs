//! Note model and its store-side document form

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of a note, generated client-side and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for NoteId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

/// A document as the store keeps it.
///
/// The text lives in a field called `content`; on screen the same value is a
/// note's `title`. Conversions between the two go through
/// [`Note::from_document`] and [`NoteDocument::from_note`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDocument {
    pub id: NoteId,
    pub content: String,
}

impl NoteDocument {
    pub fn new(id: NoteId, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            content: note.title.clone(),
        }
    }
}

/// A note as the screen shows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Note text (the document's `content` field)
    pub title: String,
}

impl Note {
    pub fn new(id: impl Into<NoteId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }

    /// Map a store document onto the screen model.
    #[must_use]
    pub fn from_document(document: NoteDocument) -> Self {
        Self {
            id: document.id,
            title: document.content,
        }
    }

    /// Get first line as a list preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.title
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

/// Whether `text` is acceptable note content. Only the empty string is not.
#[must_use]
pub fn has_content(text: &str) -> bool {
    !text.is_empty()
}
