//! Typed publish/subscribe bus for on-page cart events.
//!
//! DESIGN
//! ======
//! Components that share no parent (a mini-cart badge, a product card, the
//! slide-out panel) subscribe once at mount by event name and receive
//! [`CartEvent`]s over their own channel. Publishing fans out to every live
//! subscriber of that name; subscribers whose receiver was dropped are
//! pruned on the next publish. Dropping a [`Subscription`] unsubscribes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::fragments::CartFragments;
use crate::message::ProductId;

pub const EVENT_CART_STATE_UPDATED: &str = "cartStateUpdated";
pub const EVENT_TOGGLE_CART: &str = "toggleCart";
pub const EVENT_ADDED_TO_CART: &str = "addedToCart";

/// Every event that travels on the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "detail")]
pub enum CartEvent {
    /// Full fragment snapshot after any successful cart change.
    #[serde(rename = "cartStateUpdated")]
    StateUpdated(CartFragments),
    /// Request to open or close the slide-out panel.
    #[serde(rename = "toggleCart")]
    TogglePanel { show: bool },
    /// A product was added by this page.
    #[serde(rename = "addedToCart")]
    Added { product_id: ProductId },
}

impl CartEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateUpdated(_) => EVENT_CART_STATE_UPDATED,
            Self::TogglePanel { .. } => EVENT_TOGGLE_CART,
            Self::Added { .. } => EVENT_ADDED_TO_CART,
        }
    }
}

type Registry = HashMap<&'static str, Vec<(u64, mpsc::UnboundedSender<CartEvent>)>>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Registry,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one event name.
    #[must_use]
    pub fn subscribe(&self, name: &'static str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.entry(name).or_default().push((id, tx));
        Subscription { id, name, rx, bus: Arc::downgrade(&self.inner) }
    }

    /// Deliver `event` to every live subscriber of its name. Returns the
    /// number of subscribers reached.
    pub fn publish(&self, event: &CartEvent) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(subscribers) = inner.subscribers.get_mut(event.name()) else {
            return 0;
        };
        subscribers.retain(|(_, tx)| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    #[must_use]
    pub fn subscriber_count(&self, name: &str) -> usize {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.get(name).map_or(0, Vec::len)
    }
}

/// A live subscription. Unsubscribes on drop.
pub struct Subscription {
    id: u64,
    name: &'static str,
    rx: mpsc::UnboundedReceiver<CartEvent>,
    bus: Weak<Mutex<BusInner>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<CartEvent> {
        self.rx.recv().await
    }

    /// Next queued event, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<CartEvent> {
        self.rx.try_recv().ok()
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        let mut inner = bus.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(subscribers) = inner.subscribers.get_mut(self.name) {
            subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
