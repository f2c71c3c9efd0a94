//! Handlers for category CRUD and batch operations.
//!
//! Deletes run through the consistency engine, which reassigns affected
//! products to the fallback category before the row disappears.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalogd_core::entity::{CategoryPatch, IdBatch, NewCategory};
use catalogd_core::types::DbId;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::CatalogEvent;

/// GET /api/v1/categories
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = state.engine.list_categories().await?;

    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = state.engine.find_category(id).await?;

    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/categories
///
/// Creating a name that already exists returns the existing category
/// unchanged rather than a conflict.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let category = state.engine.add_category(input).await?;

    tracing::info!(category_id = category.id, "Category created");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::CategoryCreated {
            id: category.id,
            name: category.name.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// POST /api/v1/categories/batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<NewCategory>>,
) -> AppResult<impl IntoResponse> {
    for input in &inputs {
        input.validate()?;
    }

    let categories = state.engine.add_categories(inputs).await?;

    tracing::info!(count = categories.len(), "Categories created in batch");
    for category in &categories {
        state
            .ws_manager
            .broadcast_event(&CatalogEvent::CategoryCreated {
                id: category.id,
                name: category.name.clone(),
            })
            .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: categories })))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<CategoryPatch>,
) -> AppResult<impl IntoResponse> {
    patch.validate()?;

    let category = state.engine.update_category(id, patch).await?;

    tracing::info!(category_id = id, "Category updated");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::CategoryUpdated {
            id: category.id,
            name: category.name.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.delete_category(id).await?;

    tracing::info!(category_id = id, "Category deleted");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::CategoryDeleted { id })
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/categories/batch
pub async fn delete_batch(
    State(state): State<AppState>,
    Json(batch): Json<IdBatch>,
) -> AppResult<impl IntoResponse> {
    batch.validate()?;

    let ids = batch.ids;
    state.engine.delete_categories(ids.clone()).await?;

    tracing::info!(count = ids.len(), "Categories deleted in batch");
    for id in ids {
        state
            .ws_manager
            .broadcast_event(&CatalogEvent::CategoryDeleted { id })
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}
