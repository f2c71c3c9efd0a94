use std::sync::Arc;

use catalogd_core::engine::CatalogEngine;
use catalogd_db::store::PgCatalogStore;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalogd_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager.
    pub ws_manager: Arc<WsManager>,
    /// Consistency engine over the Postgres store.
    pub engine: Arc<CatalogEngine<PgCatalogStore>>,
}
