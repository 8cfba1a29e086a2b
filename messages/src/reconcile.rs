//! Apply cart snapshots to whatever surface renders the cart.
//!
//! DESIGN
//! ======
//! Snapshots are last-write-wins: each one replaces the previous one in
//! full, never merges. The badge text is only touched when the snapshot
//! carries a count. Every applied snapshot is republished on the
//! [`EventBus`] so components without a direct handle stay in sync.
//!
//! The "just updated" indicator is fire-and-forget: it is raised
//! immediately and cleared after [`INDICATOR_DURATION`] by a detached task
//! that holds only a weak handle to the surface.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::events::{CartEvent, EventBus};
use crate::fragments::CartFragments;

/// Class marker on every mini-cart counter element.
pub const MINI_CART_COUNT_MARKER: &str = ".mini-cart-count";
/// Selector of the slide-out cart panel.
pub const CART_PANEL_SELECTOR: &str = ".site-header-cart-side";
/// Class applied to counters for the indicator period.
pub const UPDATED_CLASS: &str = "cart-updated";
pub const INDICATOR_DURATION: Duration = Duration::from_secs(1);

/// The rendering seam: a DOM, a terminal, a test recorder.
pub trait CartSurface: Send + Sync + 'static {
    /// Replace the text of every mini-cart counter. Returns how many
    /// counters were updated.
    fn set_badge_text(&self, text: &str) -> usize;

    /// Raise or clear the "just updated" indicator on every counter.
    fn set_badge_indicator(&self, on: bool);

    /// Open or close the cart panel. Returns `false` when the surface has
    /// no panel.
    fn set_panel_open(&self, open: bool) -> bool;
}

pub struct Reconciler<S> {
    surface: Arc<S>,
    bus: EventBus,
    latest: Mutex<Option<CartFragments>>,
    indicator: Duration,
}

impl<S: CartSurface> Reconciler<S> {
    #[must_use]
    pub fn new(surface: Arc<S>, bus: EventBus) -> Self {
        Self { surface, bus, latest: Mutex::new(None), indicator: INDICATOR_DURATION }
    }

    #[must_use]
    pub fn with_indicator(mut self, duration: Duration) -> Self {
        self.indicator = duration;
        self
    }

    /// Replace the current snapshot and update every counter.
    pub fn apply(&self, fragments: CartFragments) {
        if let Some(text) = fragments.count_text() {
            let updated = self.surface.set_badge_text(&text);
            debug!(count = %text, updated, "reconcile: badge");
            self.flash_indicator();
        }

        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(fragments.clone());
        self.bus.publish(&CartEvent::StateUpdated(fragments));
    }

    /// Open or close the cart panel. A missing panel is a no-op; the toggle
    /// is still published for listeners.
    pub fn toggle_panel(&self, show: bool) -> bool {
        let toggled = self.surface.set_panel_open(show);
        if !toggled {
            debug!(show, "reconcile: no cart panel on this surface");
        }
        self.bus.publish(&CartEvent::TogglePanel { show });
        toggled
    }

    /// The most recently applied snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<CartFragments> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    fn flash_indicator(&self) {
        self.surface.set_badge_indicator(true);

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            info!("reconcile: no runtime, indicator left on");
            return;
        };
        let surface = Arc::downgrade(&self.surface);
        let duration = self.indicator;
        handle.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(surface) = surface.upgrade() {
                surface.set_badge_indicator(false);
            }
        });
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
