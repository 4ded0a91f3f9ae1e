//! Cross-context event bus.
//!
//! An explicit pub/sub channel scoped to named topics, replacing the
//! generic storage-change broadcast the browser provides. The durable
//! key-value write (or removal) is a side effect of publishing, never a
//! substitute for it: a container observing [`Event::CartInvalidated`]
//! resets its in-memory items without re-writing storage, because the
//! already-cleared store is the source of truth.

use tokio::sync::broadcast;

use sokocamp_core::Language;

const BUS_CAPACITY: usize = 64;

/// Events broadcast between state containers and open contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The persisted cart was cleared (sign-out, checkout success, or a
    /// clear observed from another context). Observers must reset their
    /// in-memory cart without persisting.
    CartInvalidated,
    /// The UI language changed.
    LanguageChanged(Language),
}

/// Broadcast channel shared by all containers in a process.
///
/// Cheaply cloneable; publishing with no live subscribers is not an error.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BUS_CAPACITY);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: Event) {
        // A send error only means nobody is listening right now.
        if self.sender.send(event.clone()).is_err() {
            tracing::debug!(?event, "event published with no subscribers");
        }
    }

    /// Subscribe to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
