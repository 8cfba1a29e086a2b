//! Correlation table for in-flight add-to-cart requests.
//!
//! DESIGN
//! ======
//! Each request registers under a fresh [`RequestId`] and receives a
//! oneshot receiver. A result resolves exactly the entry whose id it
//! carries; results with no id, an id this table never issued, or an id
//! whose product does not match are ignored. Entries are removed on
//! resolve or cancel, so a late result after a timeout finds nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::message::{CartAddResult, ProductId, RequestId};

struct Pending {
    product_id: ProductId,
    tx: oneshot::Sender<CartAddResult>,
}

/// What happened to a result fed into [`PendingRequests::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Delivered to the request that owns the id.
    Resolved(RequestId),
    /// No id, or an id not owned by this table (stale or foreign).
    NotOwned,
    /// Id owned, but the product does not match. Left pending.
    ProductMismatch(RequestId),
    /// Id owned, but the waiter already went away.
    Abandoned(RequestId),
}

#[derive(Clone, Default)]
pub struct PendingRequests {
    inner: Arc<Mutex<HashMap<RequestId, Pending>>>,
}

impl PendingRequests {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new request for `product_id`.
    #[must_use]
    pub fn register(&self, product_id: ProductId) -> (RequestId, oneshot::Receiver<CartAddResult>) {
        let id = RequestId::generate();
        let (tx, rx) = oneshot::channel();
        self.lock().insert(id, Pending { product_id, tx });
        (id, rx)
    }

    /// Route a result to the one request sharing its id.
    pub fn resolve(&self, result: CartAddResult) -> Resolution {
        let Some(id) = result.payload.request_id else {
            return Resolution::NotOwned;
        };
        let mut inner = self.lock();
        let Some(pending) = inner.get(&id) else {
            return Resolution::NotOwned;
        };
        if pending.product_id != result.payload.product_id {
            return Resolution::ProductMismatch(id);
        }
        let Some(pending) = inner.remove(&id) else {
            return Resolution::NotOwned;
        };
        drop(inner);

        match pending.tx.send(result) {
            Ok(()) => Resolution::Resolved(id),
            Err(_) => Resolution::Abandoned(id),
        }
    }

    /// Tear down a request. Returns whether it was still open.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.lock().remove(&id).is_some()
    }

    #[must_use]
    pub fn is_pending(&self, id: RequestId) -> bool {
        self.lock().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<RequestId, Pending>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "pending_test.rs"]
mod tests;
