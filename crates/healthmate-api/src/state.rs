//! Application state shared by the CLI and the REST API.
//!
//! Holds the process-wide model provider and, for the server, the registry
//! of live chat sessions. Generic over the model loader so tests can run
//! the full router against an in-memory backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use healthmate_core::chat::session::ChatSession;
use healthmate_core::llm::provider::{ModelLoader, ModelProvider};
use healthmate_infra::config::{
    MODEL_DIR_ENV, ModelOverrides, load_config, resolve_data_dir, resolve_model_config,
};
use healthmate_infra::llm::ModelBackend;
use healthmate_types::config::HealthmateConfig;

/// Live sessions keyed by id. Each session is locked for a whole submit.
pub type SessionRegistry = DashMap<Uuid, SessionSlot>;

pub struct SessionSlot {
    handle: Arc<Mutex<ChatSession>>,
    last_used: Instant,
}

/// Bounds on the session registry.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_ttl: Duration,
}

impl SessionLimits {
    pub fn from_config(config: &HealthmateConfig) -> Self {
        Self {
            max_sessions: config.server.max_sessions.max(1),
            idle_ttl: Duration::from_secs(config.server.session_idle_secs),
        }
    }
}

pub struct AppState<L = ModelBackend> {
    pub provider: Arc<ModelProvider<L>>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<HealthmateConfig>,
    pub limits: SessionLimits,
}

impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            sessions: Arc::clone(&self.sessions),
            config: Arc::clone(&self.config),
            limits: self.limits,
        }
    }
}

impl AppState<ModelBackend> {
    /// Load config, apply env and CLI overrides, and wire the configured backend.
    ///
    /// The model itself is not loaded here.
    pub async fn init(overrides: &ModelOverrides) -> Self {
        let data_dir = resolve_data_dir();
        let mut config = load_config(&data_dir).await;
        config.model = resolve_model_config(
            &config.model,
            std::env::var(MODEL_DIR_ENV).ok(),
            overrides,
        );

        let backend = ModelBackend::from_config(&config.model);
        tracing::debug!(backend = %backend.kind(), data_dir = %data_dir.display(), "Application state ready");
        Self::with_loader(backend, config)
    }
}

impl<L: ModelLoader> AppState<L> {
    pub fn with_loader(loader: L, config: HealthmateConfig) -> Self {
        Self {
            provider: Arc::new(ModelProvider::new(loader)),
            sessions: Arc::new(DashMap::new()),
            limits: SessionLimits::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// Register a fresh greeting-seeded session and return it.
    ///
    /// Idle sessions are dropped first; if the registry is still full the
    /// least recently used session is evicted.
    pub fn create_session(&self) -> (Uuid, Arc<Mutex<ChatSession>>) {
        self.evict_idle();
        while self.sessions.len() >= self.limits.max_sessions {
            let Some(oldest) = self.least_recently_used() else {
                break;
            };
            self.sessions.remove(&oldest);
            tracing::info!(session_id = %oldest, "Evicted session at capacity");
        }

        let session = ChatSession::new();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.insert(
            id,
            SessionSlot {
                handle: Arc::clone(&handle),
                last_used: Instant::now(),
            },
        );
        (id, handle)
    }

    /// Look up a live session and mark it as used.
    pub fn session(&self, id: &Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        self.sessions.get_mut(id).map(|mut slot| {
            slot.last_used = Instant::now();
            Arc::clone(&slot.handle)
        })
    }

    pub fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn evict_idle(&self) {
        let before = self.sessions.len();
        let ttl = self.limits.idle_ttl;
        self.sessions.retain(|_, slot| slot.last_used.elapsed() < ttl);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, "Dropped idle sessions");
        }
    }

    fn least_recently_used(&self) -> Option<Uuid> {
        self.sessions
            .iter()
            .min_by_key(|entry| entry.value().last_used)
            .map(|entry| *entry.key())
    }
}

#[cfg(test)]
mod tests {
    use healthmate_core::llm::box_generator::BoxTextGenerator;
    use healthmate_types::error::LoadError;

    use super::*;

    struct NoModel;

    impl ModelLoader for NoModel {
        fn describe(&self) -> String {
            "none".to_string()
        }

        async fn load(&self) -> Result<BoxTextGenerator, LoadError> {
            Err(LoadError::Backend("no model in tests".to_string()))
        }
    }

    fn state(max_sessions: usize, session_idle_secs: u64) -> AppState<NoModel> {
        let mut config = HealthmateConfig::default();
        config.server.max_sessions = max_sessions;
        config.server.session_idle_secs = session_idle_secs;
        AppState::with_loader(NoModel, config)
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let state = state(2, 3600);
        let (first, _) = state.create_session();
        let (second, _) = state.create_session();

        // Touch the first so the second becomes the oldest.
        std::thread::sleep(Duration::from_millis(2));
        assert!(state.session(&first).is_some());
        let (third, _) = state.create_session();

        assert_eq!(state.sessions.len(), 2);
        assert!(state.session(&first).is_some());
        assert!(state.session(&second).is_none());
        assert!(state.session(&third).is_some());
    }

    #[test]
    fn test_idle_sessions_dropped_on_create() {
        let state = state(100, 0);
        let (first, _) = state.create_session();
        let (second, _) = state.create_session();

        assert_eq!(state.sessions.len(), 1);
        assert!(state.session(&first).is_none());
        assert!(state.session(&second).is_some());
    }

    #[test]
    fn test_zero_capacity_still_keeps_new_session() {
        let state = state(0, 3600);
        let (id, _) = state.create_session();
        assert_eq!(state.limits.max_sessions, 1);
        assert!(state.session(&id).is_some());
    }
}
