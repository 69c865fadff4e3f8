// Application state module
// Holds the loaded configuration and values cached for the request path

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::command::CommandSpec;

/// Application state, built once at startup and shared by every connection
pub struct AppState {
    pub config: Config,
    pub command: CommandSpec,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            command: CommandSpec::from_config(&config.command),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
