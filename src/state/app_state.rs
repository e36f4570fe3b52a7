use crate::config::config_manager::ConfigManager;
use std::sync::Arc;

/// Shared by every request. Holds configuration only; no per-request state
/// lives here.
pub struct AppState {
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        AppState { config_manager }
    }
}
