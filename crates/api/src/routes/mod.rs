pub mod category;
pub mod health;
pub mod product;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket event feed
///
/// /products                            list, create
/// /products/search                     filtered search
/// /products/batch                      batch create, batch delete
/// /products/{id}                       get, update, delete
/// /products/{id}/clear-categories      detach all categories (POST)
///
/// /categories                          list, create
/// /categories/batch                    batch create, batch delete
/// /categories/{id}                     get, rename, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/products", product::router())
        .nest("/categories", category::router())
}
