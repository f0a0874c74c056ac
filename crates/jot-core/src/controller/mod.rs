//! Sync controller for the notes screen.
//!
//! The controller owns [`UiState`] and is driven from a single task. It keeps
//! exactly one subscription open while mounted and rebuilds the note list from
//! every snapshot it receives. Mutations only report success or failure: the
//! list itself changes when the store pushes the next snapshot, never because
//! a mutation completed.
//!
//! Remote calls run on spawned tasks that own copies of everything they need
//! and post a [`ControllerEvent`] back when they settle, so their completion
//! may arrive before or after the snapshot that reflects them.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{ControllerConfig, DialogClosePolicy};
use crate::ids::{IdGenerator, UuidGenerator};
use crate::models::{has_content, Note, NoteDocument, NoteId};
use crate::notify::{self, Notification, Notifier, TracingNotifier};
use crate::state::UiState;
use crate::store::{Listener, RemoteStore, StoreEvent, Subscription};
use crate::{ChannelError, Error, Result};


/// A request issued against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { id: NoteId, content: String },
    Update { id: NoteId, content: String },
    Delete { id: NoteId },
}

impl Mutation {
    pub const fn id(&self) -> &NoteId {
        match self {
            Self::Create { id, .. } | Self::Update { id, .. } | Self::Delete { id } => id,
        }
    }

    const fn success_message(&self) -> &'static str {
        match self {
            Self::Create { .. } => notify::NOTE_ADDED,
            Self::Update { .. } => notify::NOTE_UPDATED,
            Self::Delete { .. } => notify::NOTE_DELETED,
        }
    }

    async fn execute<S: RemoteStore>(&self, store: &S) -> Result<()> {
        match self {
            Self::Create { id, content } => {
                store
                    .put(id, NoteDocument::new(id.clone(), content.clone()))
                    .await
            }
            Self::Update { id, content } => store.update_field(id, content.clone()).await,
            Self::Delete { id } => store.delete(id).await,
        }
    }
}

/// Something that happened outside the controller's own call stack.
#[derive(Debug)]
pub enum ControllerEvent {
    /// Delivery from the subscription opened by mount number `epoch`
    Store { epoch: u64, event: StoreEvent },
    /// A mutation finished
    Settled {
        ticket: u64,
        mutation: Mutation,
        outcome: Result<()>,
    },
}

/// Question put to the user before a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: &'static str,
}

impl ConfirmPrompt {
    pub const DELETE_NOTE: Self = Self {
        title: "Delete Note",
        message: "Are you sure you want to delete the note?",
    };
}

/// Blocking yes/cancel prompt.
pub trait Confirm {
    /// Returns `true` only for an explicit yes.
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&ConfirmPrompt) -> bool,
{
    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        self(prompt)
    }
}

/// Owner of the notes screen state.
pub struct SyncController<S, N = TracingNotifier, G = UuidGenerator>
where
    S: RemoteStore,
{
    store: Arc<S>,
    notifier: N,
    ids: G,
    config: ControllerConfig,
    state: UiState,
    subscription: Option<Subscription>,
    epoch: u64,
    loaded: bool,
    in_flight: usize,
    next_ticket: u64,
    awaiting: Option<u64>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
}

impl<S, N> SyncController<S, N, UuidGenerator>
where
    S: RemoteStore,
    N: Notifier,
{
    pub fn new(store: Arc<S>, notifier: N) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            store,
            notifier,
            ids: UuidGenerator,
            config: ControllerConfig::default(),
            state: UiState::default(),
            subscription: None,
            epoch: 0,
            loaded: false,
            in_flight: 0,
            next_ticket: 0,
            awaiting: None,
            events_tx,
            events_rx,
        }
    }
}

impl<S, N, G> SyncController<S, N, G>
where
    S: RemoteStore,
    N: Notifier,
    G: IdGenerator,
{
    #[must_use]
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the identifier generator used for new notes.
    #[must_use]
    pub fn with_id_generator<H: IdGenerator>(self, ids: H) -> SyncController<S, N, H> {
        SyncController {
            store: self.store,
            notifier: self.notifier,
            ids,
            config: self.config,
            state: self.state,
            subscription: self.subscription,
            epoch: self.epoch,
            loaded: self.loaded,
            in_flight: self.in_flight,
            next_ticket: self.next_ticket,
            awaiting: self.awaiting,
            events_tx: self.events_tx,
            events_rx: self.events_rx,
        }
    }

    /// Read-only view of the screen.
    pub const fn state(&self) -> &UiState {
        &self.state
    }

    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub const fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Number of mutations issued but not yet settled.
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Open the subscription. Calling this while mounted does nothing.
    pub fn mount(&mut self) {
        if self.is_mounted() {
            return;
        }

        self.epoch += 1;
        self.loaded = false;
        self.state.set_loading(true);

        let epoch = self.epoch;
        let events = self.events_tx.clone();
        let listener: Listener = Arc::new(move |event| {
            // The receiver only disappears together with the controller.
            let _ = events.send(ControllerEvent::Store { epoch, event });
        });

        tracing::info!("Mounting notes screen (epoch {epoch})");
        self.subscription = Some(self.store.subscribe(listener));
    }

    /// Cancel the subscription. Deliveries already queued are discarded.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
            tracing::info!("Unmounted notes screen (epoch {})", self.epoch);
        }
    }

    /// Open the dialog in create mode.
    pub fn new_note(&mut self) {
        if self.state.is_dialog_locked() {
            return;
        }
        self.state.open_create();
    }

    /// Open the dialog in edit mode for `note`.
    pub fn edit(&mut self, note: Note) {
        if self.state.is_dialog_locked() {
            return;
        }
        self.state.open_edit(note);
    }

    /// Open the listed note with `id` for editing. Returns whether it exists.
    pub fn edit_by_id(&mut self, id: &NoteId) -> bool {
        let Some(note) = self.state.notes().iter().find(|note| &note.id == id).cloned() else {
            return false;
        };
        self.edit(note);
        true
    }

    /// Replace the dialog's text. Ignored while no dialog is open.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.state.is_dialog_open() || self.state.is_dialog_locked() {
            return;
        }
        self.state.set_input(text.into());
    }

    /// Close the dialog without saving.
    pub fn cancel(&mut self) {
        if self.state.is_dialog_locked() {
            return;
        }
        self.state.close_dialog();
    }

    /// Save the dialog's text: update the selected note, or create a new one.
    ///
    /// Empty text is rejected with a notification and leaves everything else
    /// untouched. Returns the issued mutation.
    pub fn save(&mut self) -> Option<Mutation> {
        if !self.state.is_dialog_open() || self.state.is_dialog_locked() {
            return None;
        }

        let content = self.state.input().to_string();
        if !has_content(&content) {
            self.notifier
                .notify(Notification::warning(notify::EMPTY_CONTENT));
            return None;
        }

        let mutation = match self.state.selected_note() {
            Some(note) => Mutation::Update {
                id: note.id.clone(),
                content,
            },
            None => Mutation::Create {
                id: self.ids.generate(),
                content,
            },
        };
        self.issue(mutation.clone());
        Some(mutation)
    }

    /// Delete the selected note once `confirm` says yes.
    ///
    /// Only available in edit mode.
    pub fn delete_selected(&mut self, confirm: &mut impl Confirm) -> Option<Mutation> {
        if self.state.is_dialog_locked() {
            return None;
        }
        let id = self.state.selected_note()?.id.clone();

        if !confirm.confirm(&ConfirmPrompt::DELETE_NOTE) {
            tracing::debug!("Delete of {id} declined");
            return None;
        }

        let mutation = Mutation::Delete { id };
        self.issue(mutation.clone());
        Some(mutation)
    }

    fn issue(&mut self, mutation: Mutation) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight += 1;
        self.state.set_loading(true);

        match self.config.dialog_close {
            DialogClosePolicy::Immediate => self.state.close_dialog(),
            DialogClosePolicy::OnCompletion => {
                self.awaiting = Some(ticket);
                self.state.lock_dialog();
            }
        }

        tracing::debug!("Issuing {mutation:?} (ticket {ticket})");
        let store = Arc::clone(&self.store);
        let call = {
            let mutation = mutation.clone();
            tokio::spawn(async move { mutation.execute(store.as_ref()).await })
        };

        // A panicking store call still settles, so `settle` cannot hang.
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = call.await.unwrap_or_else(|error| {
                Err(Error::Unavailable(format!("store call aborted: {error}")))
            });
            let _ = events.send(ControllerEvent::Settled {
                ticket,
                mutation,
                outcome,
            });
        });
    }

    /// Apply one event to the screen state.
    pub fn apply(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Store { epoch, event } => {
                if !self.is_mounted() || epoch != self.epoch {
                    tracing::debug!("Discarding delivery from cancelled subscription {epoch}");
                    return;
                }
                match event {
                    StoreEvent::Snapshot(documents) => self.on_snapshot(documents),
                    StoreEvent::Error(error) => self.on_channel_error(&error),
                }
            }
            ControllerEvent::Settled {
                ticket,
                mutation,
                outcome,
            } => self.on_settled(ticket, &mutation, outcome),
        }
    }

    fn on_snapshot(&mut self, documents: Vec<NoteDocument>) {
        tracing::debug!("Applying snapshot with {} documents", documents.len());
        let notes = documents.into_iter().map(Note::from_document).collect();
        self.state.replace_notes(notes);
        self.state.set_loading(false);
        self.loaded = true;
    }

    fn on_channel_error(&mut self, error: &ChannelError) {
        tracing::warn!("Subscription failed: {error}");
        self.notifier
            .notify(Notification::error(notify::GENERIC_ERROR));
        self.state.set_loading(false);
        self.loaded = true;
    }

    fn on_settled(&mut self, ticket: u64, mutation: &Mutation, outcome: Result<()>) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match outcome {
            Ok(()) => {
                tracing::debug!("Mutation {ticket} on {} succeeded", mutation.id());
                self.notifier
                    .notify(Notification::success(mutation.success_message()));
                self.state.set_loading(false);
            }
            Err(error) => {
                tracing::warn!("Mutation {ticket} on {} failed: {error}", mutation.id());
                self.notifier
                    .notify(Notification::error(notify::GENERIC_ERROR));
                let is_delete = matches!(mutation, Mutation::Delete { .. });
                if !is_delete || self.config.clear_loading_on_delete_failure {
                    self.state.set_loading(false);
                }
            }
        }

        if self.awaiting == Some(ticket) {
            self.awaiting = None;
            self.state.close_dialog();
        }
    }

    /// Wait for the next event without applying it.
    pub async fn next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.recv().await
    }

    /// Wait for the next event and apply it.
    pub async fn process_next(&mut self) -> bool {
        match self.next_event().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event that is already queued. Returns how many there were.
    pub fn drain_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait until the current subscription has delivered a snapshot or an
    /// error.
    pub async fn wait_until_loaded(&mut self) {
        while self.is_mounted() && !self.loaded {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Wait for every in-flight mutation, then apply whatever else is queued.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            if !self.process_next().await {
                break;
            }
        }
        self.drain_ready();
    }
}
