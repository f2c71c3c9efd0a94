//! Route definitions for product resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /search                -> search
/// POST   /batch                 -> create_batch
/// DELETE /batch                 -> delete_batch
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
/// POST   /{id}/clear-categories -> clear_categories
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list).post(product::create))
        .route("/search", get(product::search))
        .route(
            "/batch",
            post(product::create_batch).delete(product::delete_batch),
        )
        .route(
            "/{id}",
            get(product::get_by_id)
                .put(product::update)
                .delete(product::delete),
        )
        .route("/{id}/clear-categories", post(product::clear_categories))
}
