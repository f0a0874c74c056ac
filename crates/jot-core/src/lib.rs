//! jot-core - Core library for jot
//!
//! This crate contains the note models, the document store adapters, and the
//! sync controller that keeps a single notes screen consistent with a live
//! collection. Front ends (the `jot` CLI) only render `UiState` and forward
//! user intents.

pub mod config;
pub mod controller;
pub mod error;
pub mod ids;
pub mod models;
pub mod notify;
pub mod state;
pub mod store;

pub use config::{ControllerConfig, DialogClosePolicy};
pub use controller::{Confirm, ConfirmPrompt, ControllerEvent, Mutation, SyncController};
pub use error::{ChannelError, Error, Result};
pub use models::{Note, NoteDocument, NoteId};
pub use state::{DialogMode, UiState};
