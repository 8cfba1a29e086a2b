//! Embedded-side request/response over the messaging channel.
//!
//! LIFECYCLE
//! =========
//! 1. Register a pending entry and mint a [`RequestId`].
//! 2. Post `addToCart` to the storefront origin.
//! 3. Wait for the correlated `addToCartResponse`, bounded by the deadline.
//! 4. On expiry, tear the entry down and fail soft with a retryable
//!    timeout. Nothing is retried automatically.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::ErrorCode;
use crate::channel::{Channel, MessageEvent, Transport};
use crate::fragments::CartFragments;
use crate::message::{CartAddResult, Message, ProductId, RequestId};
use crate::pending::{PendingRequests, Resolution};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),
    #[error("product {0} is already being added")]
    InFlight(ProductId),
    #[error("the store did not answer within {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("the store could not add the product: {0}")]
    Rejected(String),
    #[error("could not reach the store window: {0}")]
    Transport(String),
    #[error("request was cancelled")]
    Cancelled,
}

impl ErrorCode for RequestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "E_INVALID_QUANTITY",
            Self::InFlight(_) => "E_IN_FLIGHT",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Rejected(_) => "E_REJECTED",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Cancelled => "E_CANCELLED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_) | Self::Cancelled | Self::Rejected(_))
    }
}

/// What an inbound event meant to the embedded client.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A result was delivered to its pending request.
    Resolved(RequestId),
    /// A result that no open request owns. Dropped.
    Stale,
    /// The storefront broadcast a fresh cart snapshot.
    Fragments(CartFragments),
    /// The storefront asked for the cart panel to open or close.
    Toggle(bool),
    /// Untrusted origin, unknown tag, or a message not meant for clients.
    Ignored,
}

pub struct CartRequester<T> {
    channel: Channel<T>,
    pending: PendingRequests,
    timeout: Duration,
}

impl<T: Transport> CartRequester<T> {
    #[must_use]
    pub fn new(channel: Channel<T>) -> Self {
        Self { channel, pending: PendingRequests::new(), timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// Ask the storefront to add `quantity` of `product_id` and wait for the
    /// correlated result.
    ///
    /// # Errors
    ///
    /// [`RequestError::InvalidQuantity`] before anything is sent;
    /// [`RequestError::Timeout`] when no correlated result arrives before
    /// the deadline; [`RequestError::Rejected`] when the storefront reports
    /// failure; [`RequestError::Transport`] when the post itself fails.
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<CartAddResult, RequestError> {
        if quantity == 0 {
            return Err(RequestError::InvalidQuantity(quantity));
        }

        let (request_id, rx) = self.pending.register(product_id);
        let _entry = PendingEntry { pending: &self.pending, request_id };
        if let Err(e) = self.channel.send(&Message::add_to_cart(product_id, quantity, request_id)) {
            warn!(product_id, %request_id, error = %e, "requester: post failed");
            return Err(RequestError::Transport(e.to_string()));
        }
        info!(product_id, quantity, %request_id, "requester: addToCart sent");

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) if result.success => Ok(result),
            Ok(Ok(result)) => {
                let message = result
                    .payload
                    .error
                    .unwrap_or_else(|| "unknown error".to_owned());
                Err(RequestError::Rejected(message))
            }
            Ok(Err(_)) => Err(RequestError::Cancelled),
            Err(_) => {
                warn!(product_id, %request_id, timeout_ms = self.timeout.as_millis(), "requester: timed out");
                Err(RequestError::Timeout(self.timeout))
            }
        }
    }

    /// Feed one inbound `message` event.
    pub fn handle_event(&self, event: &MessageEvent) -> Inbound {
        let Some(message) = self.channel.accept(event) else {
            return Inbound::Ignored;
        };
        match message {
            Message::AddToCartResponse(result) => match self.pending.resolve(result) {
                Resolution::Resolved(id) => Inbound::Resolved(id),
                other => {
                    debug!(?other, "requester: stale addToCartResponse");
                    Inbound::Stale
                }
            },
            Message::CartUpdated { payload } => Inbound::Fragments(payload),
            Message::ToggleCart { payload } => Inbound::Toggle(payload.show),
            Message::AddToCart { .. } => Inbound::Ignored,
        }
    }
}

/// Removes the pending entry however `add_to_cart` exits, including when
/// its future is dropped mid-wait.
struct PendingEntry<'a> {
    pending: &'a PendingRequests,
    request_id: RequestId,
}

impl Drop for PendingEntry<'_> {
    fn drop(&mut self) {
        if self.pending.cancel(self.request_id) {
            debug!(request_id = %self.request_id, "requester: pending entry torn down");
        }
    }
}

#[cfg(test)]
#[path = "requester_test.rs"]
mod tests;
