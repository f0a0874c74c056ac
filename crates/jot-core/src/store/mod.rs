//! Document store adapters.
//!
//! A store holds one collection of [`NoteDocument`]s and pushes the whole
//! collection to every subscriber after each change. Mutations report only
//! success or failure; subscribers learn the new contents from the next
//! snapshot.

mod listeners;
mod memory;
mod migrations;
mod sqlite;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ChannelError, Result};
use crate::models::{NoteDocument, NoteId};

pub use listeners::{ListenerRegistry, Subscription};
pub use memory::{MemoryStore, Operation};
pub use sqlite::SqliteStore;

/// What a subscription delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Full current contents of the collection
    Snapshot(Vec<NoteDocument>),
    /// The channel itself failed
    Error(ChannelError),
}

/// Callback registered by a subscriber. May be invoked from any thread.
pub type Listener = Arc<dyn Fn(StoreEvent) + Send + Sync>;

/// A live document collection.
pub trait RemoteStore: Send + Sync + 'static {
    /// Register `listener` for snapshots of the collection.
    ///
    /// The current snapshot is delivered right away. Deliveries stop once the
    /// returned [`Subscription`] is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;

    /// Create the document at `id`, or replace it entirely.
    fn put(&self, id: &NoteId, document: NoteDocument)
        -> impl Future<Output = Result<()>> + Send;

    /// Replace the `content` field of an existing document.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) when `id` does
    /// not exist.
    fn update_field(&self, id: &NoteId, content: String)
        -> impl Future<Output = Result<()>> + Send;

    /// Remove the document at `id`.
    fn delete(&self, id: &NoteId) -> impl Future<Output = Result<()>> + Send;
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
