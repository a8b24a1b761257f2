//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the remote service configurations and the shared session store that
//! mirrors session material into cookies.

use std::sync::Arc;

use crate::services::auth::AuthConfig;
use crate::services::data::DataConfig;
use crate::services::store::SessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the store is Arc-wrapped, configs are Clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthConfig,
    pub data: DataConfig,
    pub store: Arc<SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(auth: AuthConfig, data: DataConfig) -> Self {
        Self { auth, data, store: Arc::new(SessionStore::new()) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::CookieJar;

    #[test]
    fn state_is_cloneable_and_shares_the_store() {
        let state = test_helpers::test_app_state();
        let clone = state.clone();

        let jar = state.store.set(CookieJar::new(), "auth-storage", "shared");
        assert_eq!(
            clone.store.get(&jar, "auth-storage").as_deref(),
            Some("shared")
        );
    }

    #[test]
    fn test_state_configs_are_local() {
        let state = test_helpers::test_app_state();
        assert!(state.auth.base_url.starts_with("http://localhost"));
        assert!(state.data.base_url.starts_with("http://localhost"));
    }
}
