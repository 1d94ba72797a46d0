use crate::config::ServerConfig;
use crate::error::ServerResult;
use std::sync::Arc;
use store::NoteStore;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Note store (shared across requests)
    pub store: NoteStore,
}

impl ServerState {
    /// Open the configured storage backend.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = NoteStore::open(&config.storage.backend_config())?;
        Ok(Self::with_store(config, store))
    }

    /// Use an already opened store.
    pub fn with_store(config: ServerConfig, store: NoteStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
