use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::db::{MemoryStore, Store};

/// Shared, immutable per-process handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        Self {
            store,
            tokens: Arc::new(TokenService::new(&config.token)),
            config: Arc::new(config),
        }
    }

    /// Fresh in-memory state with test configuration.
    pub fn for_tests() -> Self {
        Self::new(AppConfig::for_tests(), Arc::new(MemoryStore::new()))
    }
}
