//! Feed transport seam and the in-memory reference transport.

#![allow(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};

use crate::core::errors::{HudError, Result};
use crate::event::model::{ChatEvent, EventDraft, MessageKind, RollPayload, RollSummary};

/// Change notification pushed over a feed subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
}

/// Live handle to a feed subscription.
///
/// Dropping the handle without unsubscribing leaves a dead sender behind;
/// the transport prunes those on the next broadcast.
#[derive(Debug)]
pub struct FeedSubscription {
    pub id: u64,
    pub receiver: Receiver<FeedEvent>,
}

/// Backend that stores chat events and pushes change notifications.
pub trait EventSource: Send + Sync {
    /// Look up an event by id. `Ok(None)` means the id is unknown or not
    /// yet visible, which callers treat as retryable.
    fn event_by_id(&self, id: &str) -> Result<Option<ChatEvent>>;

    /// Delete an event. The transport decides whether the caller may.
    fn delete_event(&self, id: &str) -> Result<()>;

    /// Post a new event; returns the stored form with id and timestamp.
    fn post_event(&self, draft: EventDraft) -> Result<ChatEvent>;

    fn subscribe(&self) -> Result<FeedSubscription>;

    fn unsubscribe(&self, subscription: FeedSubscription) -> Result<()>;
}

/// In-memory transport for tests, demos, and embedding without a real
/// backend. Supports scripted failures so error paths stay testable.
#[derive(Default)]
pub struct MemoryTransport {
    events: RwLock<Vec<ChatEvent>>,
    subscribers: Mutex<Vec<(u64, Sender<FeedEvent>)>>,
    next_subscription: AtomicU64,
    next_event: AtomicU64,
    suppressed: Mutex<HashSet<String>>,
    delete_errors: Mutex<HashMap<String, String>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for posting a plain authored event.
    pub fn post(&self, author: &str, kind: MessageKind, body: &str) -> Result<ChatEvent> {
        self.post_event(EventDraft {
            speaker: None,
            author: Some(author.to_string()),
            kind,
            body: body.to_string(),
            roll: None,
        })
    }

    /// Make `event_by_id` report the id as unknown until [`Self::release`].
    /// Models an event that exists upstream but is not yet visible here.
    pub fn suppress(&self, id: &str) {
        self.suppressed.lock().insert(id.to_string());
    }

    /// Undo a [`Self::suppress`] call.
    pub fn release(&self, id: &str) {
        self.suppressed.lock().remove(id);
    }

    /// Make deletions of `id` fail with the given message.
    pub fn reject_deletions_of(&self, id: &str, details: &str) {
        self.delete_errors
            .lock()
            .insert(id.to_string(), details.to_string());
    }

    /// Replace a pending roll payload with its finalized summary and
    /// broadcast an update, as a backend would after evaluation.
    pub fn finalize_roll(&self, id: &str, summary: RollSummary) -> Result<()> {
        {
            let mut events = self.events.write();
            let event = events
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| HudError::resolution(id, "no such event"))?;
            event.roll = Some(RollPayload::Final(summary));
        }
        self.broadcast(&FeedEvent::Updated { id: id.to_string() });
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Stored event ids in insertion order.
    #[must_use]
    pub fn event_ids(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.id.clone()).collect()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn broadcast(&self, event: &FeedEvent) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }
}

impl EventSource for MemoryTransport {
    fn event_by_id(&self, id: &str) -> Result<Option<ChatEvent>> {
        if self.suppressed.lock().contains(id) {
            return Ok(None);
        }
        Ok(self.events.read().iter().find(|e| e.id == id).cloned())
    }

    fn delete_event(&self, id: &str) -> Result<()> {
        if let Some(details) = self.delete_errors.lock().get(id) {
            return Err(HudError::deletion(id, details));
        }

        {
            let mut events = self.events.write();
            let before = events.len();
            events.retain(|e| e.id != id);
            if events.len() == before {
                return Err(HudError::deletion(id, "no such event"));
            }
        }

        self.broadcast(&FeedEvent::Deleted { id: id.to_string() });
        Ok(())
    }

    fn post_event(&self, draft: EventDraft) -> Result<ChatEvent> {
        let seq = self.next_event.fetch_add(1, Ordering::Relaxed) + 1;
        let event = ChatEvent {
            id: format!("msg-{seq}"),
            speaker: draft.speaker,
            author: draft.author,
            kind: draft.kind,
            body: draft.body,
            roll: draft.roll,
            ts: Utc::now(),
        };

        self.events.write().push(event.clone());
        self.broadcast(&FeedEvent::Created {
            id: event.id.clone(),
        });
        Ok(event)
    }

    fn subscribe(&self) -> Result<FeedSubscription> {
        let (sender, receiver) = unbounded();
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed) + 1;
        self.subscribers.lock().push((id, sender));
        Ok(FeedSubscription { id, receiver })
    }

    fn unsubscribe(&self, subscription: FeedSubscription) -> Result<()> {
        self.subscribers
            .lock()
            .retain(|(id, _)| *id != subscription.id);
        Ok(())
    }
}
