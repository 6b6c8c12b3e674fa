use std::sync::Arc;

use remix_pipeline::Dispatcher;
use remix_storage::ObjectStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Accepts remix jobs and answers status queries.
    pub dispatcher: Arc<Dispatcher>,
    /// Signs client uploads.
    pub storage: ObjectStorage,
}
