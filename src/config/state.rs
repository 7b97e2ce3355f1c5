// Application state module
// Shared, immutable-after-startup server state plus the runtime caches

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::handler::ContentResolver;
use crate::logger;
use crate::routing::RouteTable;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub resolver: Arc<ContentResolver>,
    pub shutdown_signal: Arc<Notify>,

    /// Connections currently being served
    pub active_connections: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, routes: RouteTable) -> Self {
        Self {
            config,
            routes,
            resolver: Arc::new(ContentResolver::new()),
            shutdown_signal: Arc::new(Notify::new()),
            active_connections: AtomicU64::new(0),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }

    /// Drop compiled index templates and cached listing filters
    pub fn clear_caches(&self, reason: &str) {
        let templates = self.resolver.templates().len();
        let filters = self.resolver.lister().filters().len();
        self.resolver.clear_templates();
        self.resolver.lister().filters().clear();
        logger::log_cache_cleared(reason, templates, Some(filters));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(toml: &str) -> AppState {
        let config = Config::from_toml_str(toml).unwrap();
        let routes = RouteTable::from_config(&config.routes).unwrap();
        AppState::new(config, routes)
    }

    #[test]
    fn test_access_log_follows_config() {
        assert!(state("").access_log_enabled());
        assert!(!state("[logging]\naccess_log = false\n").access_log_enabled());
    }
}
