use std::sync::Arc;

use companion_events::EventBus;
use companion_genai::GenAiClient;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: companion_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub event_bus: Arc<EventBus>,
    pub genai: Arc<GenAiClient>,
}
