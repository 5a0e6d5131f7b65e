// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

use cropconnect_core::ClockPort;
use cropconnect_lifecycle::ContractLifecycleManager;
use cropconnect_store::SqliteStore;

use crate::config::ApiConfig;
use crate::session::SessionSigner;

pub type Manager = ContractLifecycleManager<SqliteStore>;

#[derive(Clone)]
pub struct AppState {
    pub manager: Manager,
    pub sessions: Arc<SessionSigner>,
    pub clock: Arc<dyn ClockPort>,
    pub api: ApiConfig,
    pub ready: Arc<AtomicBool>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// Starts not ready; the binary flips `ready` once the listener is bound.
    #[must_use]
    pub fn new(
        manager: Manager,
        sessions: SessionSigner,
        clock: Arc<dyn ClockPort>,
        api: ApiConfig,
    ) -> Self {
        Self {
            manager,
            sessions: Arc::new(sessions),
            clock,
            api,
            ready: Arc::new(AtomicBool::new(false)),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}
