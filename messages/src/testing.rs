//! Test doubles shared across module tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::bridge::{BackendError, CartBackend};
use crate::fragments::CartFragments;
use crate::message::ProductId;
use crate::reconcile::CartSurface;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SurfaceLog {
    pub badge_text: Vec<String>,
    pub indicator: Vec<bool>,
    pub panel: Vec<bool>,
}

/// Surface that records every call.
pub(crate) struct RecordingSurface {
    counters: usize,
    has_panel: bool,
    log: Mutex<SurfaceLog>,
}

impl RecordingSurface {
    pub fn new(counters: usize, has_panel: bool) -> Self {
        Self { counters, has_panel, log: Mutex::new(SurfaceLog::default()) }
    }

    pub fn log(&self) -> SurfaceLog {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CartSurface for RecordingSurface {
    fn set_badge_text(&self, text: &str) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).badge_text.push(text.to_owned());
        self.counters
    }

    fn set_badge_indicator(&self, on: bool) {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).indicator.push(on);
    }

    fn set_panel_open(&self, open: bool) -> bool {
        if self.has_panel {
            self.log.lock().unwrap_or_else(PoisonError::into_inner).panel.push(open);
        }
        self.has_panel
    }
}

/// In-memory cart backend.
pub(crate) struct MockBackend {
    count: Mutex<u32>,
    fail_with: Option<BackendError>,
    refresh_fails_with: Option<BackendError>,
    reports_count: bool,
    pub add_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            count: Mutex::new(0),
            fail_with: None,
            refresh_fails_with: None,
            reports_count: true,
            add_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self { fail_with: Some(error), ..Self::new() }
    }

    /// Add responses carry no count; callers must refresh.
    pub fn without_count() -> Self {
        Self { reports_count: false, ..Self::new() }
    }

    /// Adds succeed without a count and every refresh fails.
    pub fn refresh_failing(error: BackendError) -> Self {
        Self { refresh_fails_with: Some(error), ..Self::without_count() }
    }
}

#[async_trait]
impl CartBackend for MockBackend {
    async fn add_to_cart(&self, _product_id: ProductId, quantity: u32) -> Result<CartFragments, BackendError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        *count += quantity;
        if self.reports_count {
            Ok(CartFragments::with_count(*count))
        } else {
            Ok(CartFragments::default())
        }
    }

    async fn refresh(&self) -> Result<CartFragments, BackendError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_with.as_ref().or(self.refresh_fails_with.as_ref()) {
            return Err(error.clone());
        }
        let count = *self.count.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(CartFragments::with_count(count))
    }
}
