// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP surface of the CropConnect marketplace.
//!
//! Handlers authenticate the bearer session, hand an explicit `Actor` to the
//! lifecycle manager on the blocking pool and render `{"data": ...}` or
//! `{"error": ApiError}` bodies.

mod config;
mod handlers;
mod request_tracing;
mod router;
mod session;
mod state;

pub use config::{
    ApiConfig, ServerConfig, DEFAULT_BIND, ENV_CROPCONNECT_BIND, ENV_CROPCONNECT_MAX_BODY_BYTES,
    ENV_CROPCONNECT_REQUEST_TIMEOUT_MS, ENV_CROPCONNECT_SESSION_TTL_SECS,
    ENV_CROPCONNECT_SHUTDOWN_DRAIN_MS,
};
pub use router::build_router;
pub use session::{SessionClaims, SessionError, SessionSigner};
pub use state::{AppState, Manager};

pub const CRATE_NAME: &str = "cropconnect-server";

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use cropconnect_core::SystemClock;
    use cropconnect_lifecycle::{ContractLifecycleManager, LifecyclePolicy};
    use cropconnect_store::SqliteStore;

    use crate::{ApiConfig, AppState, SessionSigner};

    pub(crate) fn in_memory_state() -> AppState {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        let manager = ContractLifecycleManager::new(
            Arc::new(store),
            Arc::new(SystemClock),
            LifecyclePolicy::default(),
        );
        AppState::new(
            manager,
            SessionSigner::new(b"test-secret", Duration::from_secs(60)),
            Arc::new(SystemClock),
            ApiConfig::default(),
        )
    }
}
