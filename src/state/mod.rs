/// Card grid and slot visibility.
pub mod board;
/// Normalised creature records.
pub mod creature;
mod sse;
/// Board state machine driving a single game.
pub mod state_machine;

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use dashmap::DashMap;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    catalog::CreatureCatalog, config::AppConfig, services::controller::BoardController,
};

pub use self::sse::SseHub;

/// Handle to the application state shared by every route.
pub type SharedState = Arc<AppState>;

/// Capacity of each session's SSE broadcast channel.
const SESSION_EVENT_CAPACITY: usize = 64;

/// Everything the HTTP layer needs to reach one game session.
#[derive(Clone)]
pub struct SessionHandle {
    /// Owner of the board state machine.
    pub controller: Arc<BoardController>,
    /// Broadcast hub feeding the session's SSE streams.
    pub events: Arc<SseHub>,
    /// Wall-clock creation time reported to clients.
    pub created_at: SystemTime,
    /// Last time a request reached this session.
    pub last_active: Instant,
}

impl SessionHandle {
    /// Whether the session has no listener and has not been used for `timeout`.
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        self.events.subscriber_count() == 0 && now.duration_since(self.last_active) >= timeout
    }
}

/// Central application state: configuration, catalog client and live sessions.
pub struct AppState {
    config: AppConfig,
    catalog: Arc<dyn CreatureCatalog>,
    sessions: DashMap<Uuid, SessionHandle>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, catalog: Arc<dyn CreatureCatalog>) -> SharedState {
        Arc::new(Self {
            config,
            catalog,
            sessions: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared catalog client handed to every session.
    pub fn catalog(&self) -> Arc<dyn CreatureCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Registry of live sessions keyed by their identifier.
    pub fn sessions(&self) -> &DashMap<Uuid, SessionHandle> {
        &self.sessions
    }

    /// Clone the handle of a session, releasing the map shard immediately.
    pub fn session(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Like [`AppState::session`], but also records the access as activity.
    pub fn touch_session(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.get_mut(&id).map(|mut entry| {
            entry.last_active = Instant::now();
            entry.value().clone()
        })
    }

    /// Fresh broadcast hub for a new session.
    pub fn new_event_hub(&self) -> Arc<SseHub> {
        Arc::new(SseHub::new(SESSION_EVENT_CAPACITY))
    }
}
