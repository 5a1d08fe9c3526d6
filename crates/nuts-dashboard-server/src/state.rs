use crate::config::ServerConfig;
use dashboard::Dashboard;
use std::sync::Arc;

/// Shared application state
pub struct AppState<N> {
    pub config: Arc<ServerConfig>,
    pub dashboard: Arc<Dashboard<N>>,
}

impl<N> AppState<N> {
    pub fn new(config: ServerConfig, dashboard: Dashboard<N>) -> Self {
        Self {
            config: Arc::new(config),
            dashboard: Arc::new(dashboard),
        }
    }
}

impl<N> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            dashboard: self.dashboard.clone(),
        }
    }
}
