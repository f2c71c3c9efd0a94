//! Route definitions for category resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::category;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// POST   /batch  -> create_batch
/// DELETE /batch  -> delete_batch
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(category::list).post(category::create))
        .route(
            "/batch",
            post(category::create_batch).delete(category::delete_batch),
        )
        .route(
            "/{id}",
            get(category::get_by_id)
                .put(category::update)
                .delete(category::delete),
        )
}
