// Application state module
// Shared runtime state handed to every connection

use super::types::Config;
use crate::deck::Storage;

/// Application state
pub struct AppState {
    pub config: Config,
    pub storage: Storage,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            storage: Storage::from_config(&config.storage),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
