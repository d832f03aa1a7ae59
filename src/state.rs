use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::InviteDispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Arc<InviteDispatcher>,
}

impl AppState {
    pub fn new(config: Config, dispatcher: InviteDispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }
}
