//! The storefront side of the channel.
//!
//! ARCHITECTURE
//! ============
//! The storefront page owns the session cookie, so it performs the real
//! cart mutation through a [`CartBackend`] and answers the embedded frame:
//!
//! ```text
//! frame ──addToCart{requestId}──▶ bridge ──▶ backend
//! frame ◀──addToCartResponse{requestId}── bridge
//! every frame ◀──cartUpdated── bridge ──▶ own badge + panel
//! ```
//!
//! Inbound events are screened against the same [`OriginPolicy`] the
//! embedded side uses. Replies go back to the exact origin the request came
//! from, never to `*`.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::ErrorCode;
use crate::channel::{MessageEvent, Transport, screen};
use crate::fragments::CartFragments;
use crate::message::{AddToCart, Message, ProductId, RequestId};
use crate::origin::{Origin, OriginPolicy};
use crate::reconcile::{CartSurface, Reconciler};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("cart backend unavailable: {0}")]
    Unavailable(String),
    #[error("cart backend timed out")]
    Timeout,
    #[error("{0}")]
    Rejected(String),
}

impl ErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_BACKEND_UNAVAILABLE",
            Self::Timeout => "E_BACKEND_TIMEOUT",
            Self::Rejected(_) => "E_REJECTED",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Same-origin cart operations available to the storefront page.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Add to the session cart and return the resulting snapshot. The
    /// snapshot may lack a count when the platform does not report one.
    async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<CartFragments, BackendError>;

    /// Fetch a fresh snapshot without mutating the cart.
    async fn refresh(&self) -> Result<CartFragments, BackendError>;
}

/// What the bridge did with one inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Handled {
    Ignored,
    Added { product_id: ProductId, request_id: Option<RequestId>, count: Option<u32> },
    Failed { product_id: ProductId, request_id: Option<RequestId>, error: String },
    Toggled(bool),
    Reconciled,
}

pub struct StorefrontBridge<B, S> {
    backend: B,
    policy: OriginPolicy,
    frames: Mutex<Vec<(Origin, Arc<dyn Transport>)>>,
    reconciler: Reconciler<S>,
}

impl<B: CartBackend, S: CartSurface> StorefrontBridge<B, S> {
    #[must_use]
    pub fn new(backend: B, policy: OriginPolicy, reconciler: Reconciler<S>) -> Self {
        Self { backend, policy, frames: Mutex::new(Vec::new()), reconciler }
    }

    /// Register an embedded frame to receive `cartUpdated` broadcasts.
    /// Frames outside the allow-list are refused.
    pub fn register_frame(&self, origin: Origin, transport: Arc<dyn Transport>) -> bool {
        if !self.policy.contains(&origin) {
            warn!(%origin, "bridge: refusing to register untrusted frame");
            return false;
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((origin, transport));
        true
    }

    #[must_use]
    pub fn reconciler(&self) -> &Reconciler<S> {
        &self.reconciler
    }

    /// Handle one inbound event. `source` is the window that sent it.
    pub async fn handle(&self, event: &MessageEvent, source: &dyn Transport) -> Handled {
        let Some(message) = screen(&self.policy, event) else {
            return Handled::Ignored;
        };
        let Ok(reply_to) = Origin::parse(&event.origin) else {
            return Handled::Ignored;
        };

        match message {
            Message::AddToCart { payload } => self.add_to_cart(&payload, source, &reply_to).await,
            Message::ToggleCart { payload } => {
                self.reconciler.toggle_panel(payload.show);
                Handled::Toggled(payload.show)
            }
            Message::CartUpdated { payload } => {
                self.reconciler.apply(payload);
                Handled::Reconciled
            }
            Message::AddToCartResponse(_) => {
                debug!(origin = %reply_to, "bridge: ignoring addToCartResponse");
                Handled::Ignored
            }
        }
    }

    async fn add_to_cart(&self, request: &AddToCart, source: &dyn Transport, reply_to: &Origin) -> Handled {
        let product_id = request.product_id;
        let request_id = request.request_id;

        let fragments = match self.mutate(request).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(product_id, ?request_id, error = %e, code = e.error_code(), "bridge: add failed");
                let error = e.to_string();
                if let Err(e) = source.post(&Message::failed(request, error.clone()), reply_to) {
                    warn!(%reply_to, error = %e, "bridge: could not deliver failure");
                }
                return Handled::Failed { product_id, request_id, error };
            }
        };

        let count = fragments.cart_count;
        if let Err(e) = source.post(&Message::succeeded(request, Some(fragments.clone())), reply_to) {
            warn!(%reply_to, error = %e, "bridge: could not deliver response");
        }
        info!(product_id, quantity = request.quantity, ?count, "bridge: added to cart");

        self.reconciler.apply(fragments.clone());
        self.reconciler.toggle_panel(true);
        self.broadcast(&Message::cart_updated(fragments));

        Handled::Added { product_id, request_id, count }
    }

    /// Mutate the cart, refreshing when the add response carries no count.
    async fn mutate(&self, request: &AddToCart) -> Result<CartFragments, BackendError> {
        let fragments = self.backend.add_to_cart(request.product_id, request.quantity).await?;
        if fragments.cart_count.is_some() {
            return Ok(fragments);
        }
        debug!(product_id = request.product_id, "bridge: add returned no count, refreshing");
        match self.backend.refresh().await {
            Ok(refreshed) => Ok(refreshed),
            Err(e) => {
                warn!(error = %e, "bridge: refresh failed, keeping add snapshot");
                Ok(fragments)
            }
        }
    }

    /// Post to every registered frame, dropping frames that are gone.
    fn broadcast(&self, message: &Message) {
        let mut frames = self.frames.lock().unwrap_or_else(PoisonError::into_inner);
        frames.retain(|(origin, transport)| match transport.post(message, origin) {
            Ok(()) => true,
            Err(e) => {
                debug!(%origin, error = %e, "bridge: dropping closed frame");
                false
            }
        });
    }
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;
