//! Per-product add-to-cart button state.
//!
//! Idle → Pending → Added | Failed → Idle. The button is disabled while a
//! request is in flight, so a second click on the same product cannot
//! start a duplicate request. Settled states revert to idle after
//! [`SETTLE_REVERT`].

use std::time::Duration;

use tokio::time::Instant;

pub const SETTLE_REVERT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Pending,
    Added,
    Failed { message: String, retryable: bool },
}

impl ButtonState {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Add to cart",
            Self::Pending => "Adding…",
            Self::Added => "Added!",
            Self::Failed { .. } => "Try again",
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone)]
pub struct AddButton {
    state: ButtonState,
    settled_at: Option<Instant>,
}

impl Default for AddButton {
    fn default() -> Self {
        Self { state: ButtonState::Idle, settled_at: None }
    }
}

impl AddButton {
    #[must_use]
    pub fn state(&self) -> &ButtonState {
        &self.state
    }

    /// Enter `Pending`. Returns `false` if a request is already in flight.
    pub fn begin(&mut self) -> bool {
        if !self.state.is_enabled() {
            return false;
        }
        self.state = ButtonState::Pending;
        self.settled_at = None;
        true
    }

    pub fn settle(&mut self, outcome: ButtonState) {
        self.settle_at(outcome, Instant::now());
    }

    pub fn settle_at(&mut self, outcome: ButtonState, now: Instant) {
        self.state = outcome;
        self.settled_at = Some(now);
    }

    /// Revert a settled button once [`SETTLE_REVERT`] has elapsed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> bool {
        match self.settled_at {
            Some(at) if now.saturating_duration_since(at) >= SETTLE_REVERT => {
                self.state = ButtonState::Idle;
                self.settled_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "button_test.rs"]
mod tests;
