//! Application state shared across all handlers.

use crate::config::Config;
use crate::services::WebhookDispatcher;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub dispatcher: WebhookDispatcher,
}
