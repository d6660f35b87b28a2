use std::path::Path;
use std::sync::Arc;

use tracing::info;

use model_registry::ModelRegistry;
use realtime_hub::RealtimeHub;
use shared_config::AppConfig;
use shared_database::{DocumentStore, StoreGateway};
use shared_utils::{AuthState, SessionStore};

/// Shared application state handed to every cell router. Everything in here
/// is cheap to clone or sits behind an `Arc`, so handlers can pull pieces
/// out per request.
pub struct AppState {
    pub config: AppConfig,
    pub gateway: StoreGateway,
    pub sessions: SessionStore,
    pub models: Arc<ModelRegistry>,
    pub hub: RealtimeHub,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(DocumentStore::new(&config));
        let models = ModelRegistry::load_from_dir(Path::new(&config.model_cache_dir));
        info!(loaded = models.loaded_count(), "model registry initialized");

        Self {
            gateway: StoreGateway::new(store),
            sessions: SessionStore::new(),
            models: Arc::new(models),
            hub: RealtimeHub::new(),
            config,
        }
    }

    /// Variant for tests: inject a pre-built store and registry instead of
    /// reading the environment or the model cache directory.
    pub fn with_parts(config: AppConfig, store: DocumentStore, models: ModelRegistry) -> Self {
        Self {
            gateway: StoreGateway::new(Arc::new(store)),
            sessions: SessionStore::new(),
            models: Arc::new(models),
            hub: RealtimeHub::new(),
            config,
        }
    }

    /// The slice of state the session-gate middleware runs on.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            sessions: self.sessions.clone(),
            session_secret: self.config.session_secret.clone(),
        }
    }
}
