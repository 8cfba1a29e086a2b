//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the parsed config and the commerce client. The proxy keeps no
//! per-session state: cookies live only for the request that carries them.

use std::sync::Arc;

use crate::commerce::CommerceClient;
use crate::config::ProxyConfig;

/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub commerce: Arc<dyn CommerceClient>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ProxyConfig, commerce: Arc<dyn CommerceClient>) -> Self {
        Self { config: Arc::new(config), commerce }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
