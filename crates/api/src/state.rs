use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// The engine keeps nothing between requests, so this only carries the
/// loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}
