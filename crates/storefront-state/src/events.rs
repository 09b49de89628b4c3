//! # Store Events
//!
//! Typed events one store publishes and another reacts to. This is the only
//! path by which stores affect each other.
//!
//! ```text
//! OrderStore ── OrderCreated ──┐                    ┌──► CartStore::get_cart_qty
//!                              ├──► EventBus ──► AppStore
//! UserStore ─── LoggedOut ─────┘    (broadcast)     └──► CartStore::initial_cart
//! ```

use tokio::sync::broadcast;
use tracing::trace;

/// Events published by stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// An order was accepted; the server-side cart changed.
    OrderCreated { order_num: String },

    /// The session token was cleared.
    LoggedOut,
}

const EVENT_CAPACITY: usize = 64;

/// Broadcast bus for [`StoreEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        EventBus { tx }
    }

    /// Publishes an event. Nobody listening is not an error.
    pub fn publish(&self, event: StoreEvent) {
        trace!(?event, "Publishing store event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
