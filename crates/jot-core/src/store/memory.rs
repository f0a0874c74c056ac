//! In-process document collection.

use std::collections::{BTreeMap, VecDeque};
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};

use crate::error::{ChannelError, Error, Result};
use crate::models::{NoteDocument, NoteId};

use super::{lock, Listener, ListenerRegistry, RemoteStore, StoreEvent, Subscription};

/// Store call that can be made to fail with [`MemoryStore::fail_next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Subscribe,
    Put,
    UpdateField,
    Delete,
}

#[derive(Default)]
struct Collection {
    documents: BTreeMap<NoteId, NoteDocument>,
    failures: VecDeque<(Operation, String)>,
}

impl Collection {
    fn snapshot(&self) -> Vec<NoteDocument> {
        self.documents.values().cloned().collect()
    }

    fn take_failure(&mut self, operation: Operation) -> Option<String> {
        let position = self
            .failures
            .iter()
            .position(|(failing, _)| *failing == operation)?;
        self.failures.remove(position).map(|(_, message)| message)
    }
}

/// Collection held in memory, ordered by document id.
///
/// Clones share the same collection and subscribers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collection: Arc<Mutex<Collection>>,
    listeners: ListenerRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `documents` already stored.
    pub fn with_documents(documents: impl IntoIterator<Item = NoteDocument>) -> Self {
        let store = Self::new();
        {
            let mut collection = lock(&store.collection);
            for document in documents {
                collection.documents.insert(document.id.clone(), document);
            }
        }
        store
    }

    /// Current contents, in snapshot order.
    pub fn documents(&self) -> Vec<NoteDocument> {
        lock(&self.collection).snapshot()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Make the next `operation` fail with [`Error::Unavailable`]. A failing
    /// subscribe delivers a channel error instead of the first snapshot.
    pub fn fail_next(&self, operation: Operation, message: impl Into<String>) {
        lock(&self.collection)
            .failures
            .push_back((operation, message.into()));
    }

    /// Report a channel failure to every subscriber.
    pub fn interrupt(&self, error: ChannelError) {
        tracing::warn!("Interrupting subscribers: {error}");
        self.listeners.broadcast(&StoreEvent::Error(error));
    }

    fn mutate(
        &self,
        operation: Operation,
        apply: impl FnOnce(&mut BTreeMap<NoteId, NoteDocument>) -> Result<()>,
    ) -> Result<()> {
        let snapshot = {
            let mut collection = lock(&self.collection);
            if let Some(message) = collection.take_failure(operation) {
                return Err(Error::Unavailable(message));
            }
            apply(&mut collection.documents)?;
            collection.snapshot()
        };
        self.listeners.broadcast(&StoreEvent::Snapshot(snapshot));
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    fn subscribe(&self, listener: Listener) -> Subscription {
        let (subscription, initial) = {
            let mut collection = lock(&self.collection);
            let subscription = self.listeners.register(Arc::clone(&listener));
            let initial = match collection.take_failure(Operation::Subscribe) {
                Some(message) => StoreEvent::Error(ChannelError::Unavailable(message)),
                None => StoreEvent::Snapshot(collection.snapshot()),
            };
            (subscription, initial)
        };
        listener(initial);
        subscription
    }

    fn put(&self, id: &NoteId, document: NoteDocument) -> impl Future<Output = Result<()>> + Send {
        let id = id.clone();
        ready(self.mutate(Operation::Put, move |documents| {
            documents.insert(id, document);
            Ok(())
        }))
    }

    fn update_field(
        &self,
        id: &NoteId,
        content: String,
    ) -> impl Future<Output = Result<()>> + Send {
        ready(self.mutate(Operation::UpdateField, |documents| {
            let document = documents
                .get_mut(id)
                .ok_or_else(|| Error::NotFound(id.to_string()))?;
            document.content = content;
            Ok(())
        }))
    }

    fn delete(&self, id: &NoteId) -> impl Future<Output = Result<()>> + Send {
        ready(self.mutate(Operation::Delete, |documents| {
            documents.remove(id);
            Ok(())
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn recording_listener() -> (Listener, Arc<Mutex<Vec<StoreEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let listener: Listener = Arc::new(move |event| lock(&sink).push(event));
        (listener, events)
    }

    fn doc(id: &str, content: &str) -> NoteDocument {
        NoteDocument::new(NoteId::new(id), content)
    }

    #[test]
    fn subscribe_delivers_current_snapshot() {
        let store = MemoryStore::with_documents([doc("b", "second"), doc("a", "first")]);
        let (listener, events) = recording_listener();
        let _subscription = store.subscribe(listener);

        assert_eq!(
            *lock(&events),
            vec![StoreEvent::Snapshot(vec![
                doc("a", "first"),
                doc("b", "second")
            ])]
        );
    }

    #[tokio::test]
    async fn mutations_broadcast_full_snapshots() {
        let store = MemoryStore::new();
        let (listener, events) = recording_listener();
        let _subscription = store.subscribe(listener);

        store.put(&NoteId::new("n1"), doc("n1", "one")).await.unwrap();
        store
            .update_field(&NoteId::new("n1"), "uno".to_string())
            .await
            .unwrap();
        store.delete(&NoteId::new("n1")).await.unwrap();

        assert_eq!(
            *lock(&events),
            vec![
                StoreEvent::Snapshot(vec![]),
                StoreEvent::Snapshot(vec![doc("n1", "one")]),
                StoreEvent::Snapshot(vec![doc("n1", "uno")]),
                StoreEvent::Snapshot(vec![]),
            ]
        );
    }

    #[tokio::test]
    async fn update_of_missing_document_fails() {
        let store = MemoryStore::new();
        let error = store
            .update_field(&NoteId::new("ghost"), "boo".to_string())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::NotFound(id) if id == "ghost"));
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let store = MemoryStore::new();
        store.fail_next(Operation::Put, "offline");

        let error = store.put(&NoteId::new("n1"), doc("n1", "x")).await.unwrap_err();
        assert!(matches!(error, Error::Unavailable(message) if message == "offline"));
        assert!(store.documents().is_empty());

        store.put(&NoteId::new("n1"), doc("n1", "x")).await.unwrap();
        assert_eq!(store.documents(), vec![doc("n1", "x")]);
    }

    #[test]
    fn failing_subscribe_delivers_channel_error() {
        let store = MemoryStore::new();
        store.fail_next(Operation::Subscribe, "denied");
        let (listener, events) = recording_listener();
        let _subscription = store.subscribe(listener);

        assert_eq!(
            *lock(&events),
            vec![StoreEvent::Error(ChannelError::Unavailable(
                "denied".to_string()
            ))]
        );
    }

    #[test]
    fn interrupt_reaches_live_subscribers_only() {
        let store = MemoryStore::new();
        let (listener, events) = recording_listener();
        let subscription = store.subscribe(listener);
        subscription.cancel();

        store.interrupt(ChannelError::PermissionDenied("revoked".to_string()));
        assert_eq!(lock(&events).len(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }
}
