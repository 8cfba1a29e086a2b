//! The embedded (cross-origin) side of the cart: buttons, requester and
//! reconciler wired together.
//!
//! A click runs the full round trip: the button goes pending, the request
//! is posted to the storefront, and the outcome settles the button. On
//! success the returned snapshot is reconciled and `addedToCart` is
//! published. Broadcasts from the storefront flow through
//! [`EmbeddedClient::handle_event`].
//!
//! LIFECYCLE
//! =========
//! A settled button schedules its own revert to idle. A click whose future
//! is dropped before the outcome arrives settles as a retryable failure,
//! so the control never stays pending.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, info, warn};

use crate::ErrorCode;
use crate::button::{AddButton, ButtonState, SETTLE_REVERT};
use crate::channel::{MessageEvent, Transport};
use crate::events::CartEvent;
use crate::message::{CartAddResult, ProductId};
use crate::reconcile::{CartSurface, Reconciler};
use crate::requester::{CartRequester, Inbound, RequestError};

pub struct EmbeddedClient<T, S> {
    requester: CartRequester<T>,
    reconciler: Reconciler<S>,
    buttons: Arc<Buttons>,
}

type Buttons = Mutex<HashMap<ProductId, AddButton>>;

impl<T: Transport, S: CartSurface> EmbeddedClient<T, S> {
    #[must_use]
    pub fn new(requester: CartRequester<T>, reconciler: Reconciler<S>) -> Self {
        Self { requester, reconciler, buttons: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Handle a click on the add button for `product_id`.
    ///
    /// # Errors
    ///
    /// [`RequestError::InFlight`] when that product's button is already
    /// pending; otherwise whatever the request itself failed with.
    pub async fn click(&self, product_id: ProductId, quantity: u32) -> Result<CartAddResult, RequestError> {
        {
            let mut buttons = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
            if !buttons.entry(product_id).or_default().begin() {
                return Err(RequestError::InFlight(product_id));
            }
        }
        let mut click = ClickGuard { buttons: &self.buttons, product_id, settled: false };

        let result = self.requester.add_to_cart(product_id, quantity).await;

        let outcome = match &result {
            Ok(added) => {
                if let Some(fragments) = added.payload.fragments.clone() {
                    self.reconciler.apply(fragments);
                }
                self.reconciler.bus().publish(&CartEvent::Added { product_id });
                info!(product_id, quantity, "client: added to cart");
                ButtonState::Added
            }
            Err(e) => {
                warn!(product_id, error = %e, code = e.error_code(), "client: add failed");
                ButtonState::Failed { message: e.to_string(), retryable: e.retryable() }
            }
        };
        click.settle(outcome);

        result
    }

    /// Route one inbound `message` event.
    pub fn handle_event(&self, event: &MessageEvent) -> Inbound {
        let inbound = self.requester.handle_event(event);
        match &inbound {
            Inbound::Fragments(fragments) => self.reconciler.apply(fragments.clone()),
            Inbound::Toggle(show) => {
                self.reconciler.toggle_panel(*show);
            }
            Inbound::Resolved(_) | Inbound::Stale | Inbound::Ignored => {}
        }
        inbound
    }

    /// Revert any settled buttons whose display period has elapsed.
    pub fn tick(&self) -> usize {
        let mut buttons = self.buttons.lock().unwrap_or_else(PoisonError::into_inner);
        let mut reverted = 0;
        for button in buttons.values_mut() {
            if button.tick() {
                reverted += 1;
            }
        }
        reverted
    }

    #[must_use]
    pub fn button_state(&self, product_id: ProductId) -> ButtonState {
        self.buttons
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&product_id)
            .map_or(ButtonState::Idle, |b| b.state().clone())
    }

    #[must_use]
    pub fn requester(&self) -> &CartRequester<T> {
        &self.requester
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }
}

/// Settles the button exactly once, as a cancelled failure if the click
/// future is dropped first.
struct ClickGuard<'a> {
    buttons: &'a Arc<Buttons>,
    product_id: ProductId,
    settled: bool,
}

impl ClickGuard<'_> {
    fn settle(&mut self, outcome: ButtonState) {
        self.settled = true;
        settle_button(self.buttons, self.product_id, outcome);
    }
}

impl Drop for ClickGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let cancelled = RequestError::Cancelled;
        debug!(product_id = self.product_id, "client: click abandoned");
        settle_button(
            self.buttons,
            self.product_id,
            ButtonState::Failed { message: cancelled.to_string(), retryable: cancelled.retryable() },
        );
    }
}

fn settle_button(buttons: &Arc<Buttons>, product_id: ProductId, outcome: ButtonState) {
    buttons
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(product_id)
        .or_default()
        .settle(outcome);
    schedule_revert(Arc::downgrade(buttons), product_id);
}

/// Fire-and-forget revert after [`SETTLE_REVERT`]. Without a runtime the
/// button waits for [`EmbeddedClient::tick`].
fn schedule_revert(buttons: Weak<Buttons>, product_id: ProductId) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        debug!(product_id, "client: no runtime, revert left to tick");
        return;
    };
    let due = tokio::time::Instant::now() + SETTLE_REVERT;
    handle.spawn(async move {
        tokio::time::sleep_until(due).await;
        if let Some(buttons) = buttons.upgrade() {
            if let Some(button) = buttons.lock().unwrap_or_else(PoisonError::into_inner).get_mut(&product_id) {
                button.tick();
            }
        }
    });
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
