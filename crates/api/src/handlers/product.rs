//! Handlers for product CRUD, batch operations, and search.
//!
//! Every mutation goes through the consistency engine so the
//! at-least-one-category invariant holds, then broadcasts a change event
//! to WebSocket subscribers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalogd_core::entity::{IdBatch, NewProduct, ProductPatch};
use catalogd_core::filter::{SearchCriteria, SortDir, SortField, SortSpec};
use catalogd_core::types::{DbId, Timestamp};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::CatalogEvent;

/// Sort query parameters shared by list and search endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SortParams {
    pub sort_by: Option<SortField>,
    pub sort_dir: Option<SortDir>,
}

impl SortParams {
    /// `None` when the client asked for no particular order.
    pub fn sort_spec(&self) -> Option<SortSpec> {
        if self.sort_by.is_none() && self.sort_dir.is_none() {
            return None;
        }
        Some(SortSpec {
            field: self.sort_by.unwrap_or(SortField::Id),
            dir: self.sort_dir.unwrap_or(SortDir::Asc),
        })
    }
}

/// Query parameters for product search.
///
/// All fields are optional; omitted fields do not constrain the result.
/// `categories` is a comma-separated list of names, matched as a union.
#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub created_before: Option<Timestamp>,
    pub created_after: Option<Timestamp>,
    pub categories: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_dir: Option<SortDir>,
}

impl ProductSearchParams {
    fn sort_spec(&self) -> Option<SortSpec> {
        if self.sort_by.is_none() && self.sort_dir.is_none() {
            return None;
        }
        Some(SortSpec {
            field: self.sort_by.unwrap_or(SortField::Id),
            dir: self.sort_dir.unwrap_or(SortDir::Asc),
        })
    }

    fn criteria(&self) -> SearchCriteria {
        let category_names = self
            .categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        SearchCriteria {
            name_contains: self.name.clone(),
            description_contains: self.description.clone(),
            price_min: self.price_min,
            price_max: self.price_max,
            created_before: self.created_before,
            created_after: self.created_after,
            category_names,
        }
    }
}

/// GET /api/v1/products
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<SortParams>,
) -> AppResult<impl IntoResponse> {
    let products = state.engine.list_products(params.sort_spec()).await?;

    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchParams>,
) -> AppResult<impl IntoResponse> {
    let products = state
        .engine
        .search_products(&params.criteria(), params.sort_spec())
        .await?;

    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = state.engine.find_product(id).await?;

    Ok(Json(DataResponse { data: product }))
}

/// POST /api/v1/products
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let product = state.engine.add_product(input).await?;

    tracing::info!(product_id = product.id, "Product created");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::ProductCreated {
            id: product.id,
            name: product.name.clone(),
        })
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// POST /api/v1/products/batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<NewProduct>>,
) -> AppResult<impl IntoResponse> {
    for input in &inputs {
        input.validate()?;
    }

    let products = state.engine.add_products(inputs).await?;

    tracing::info!(count = products.len(), "Products created in batch");
    for product in &products {
        state
            .ws_manager
            .broadcast_event(&CatalogEvent::ProductCreated {
                id: product.id,
                name: product.name.clone(),
            })
            .await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: products })))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<ProductPatch>,
) -> AppResult<impl IntoResponse> {
    patch.validate()?;

    let product = state.engine.update_product(id, patch).await?;

    tracing::info!(product_id = id, "Product updated");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::ProductUpdated {
            id: product.id,
            name: product.name.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.delete_product(id).await?;

    tracing::info!(product_id = id, "Product deleted");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::ProductDeleted { id })
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/products/batch
pub async fn delete_batch(
    State(state): State<AppState>,
    Json(batch): Json<IdBatch>,
) -> AppResult<impl IntoResponse> {
    batch.validate()?;

    let ids = batch.ids;
    state.engine.delete_products(ids.clone()).await?;

    tracing::info!(count = ids.len(), "Products deleted in batch");
    for id in ids {
        state
            .ws_manager
            .broadcast_event(&CatalogEvent::ProductDeleted { id })
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/products/{id}/clear-categories
///
/// Detaches every category; the product lands in the fallback category
/// rather than becoming uncategorized.
pub async fn clear_categories(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = state.engine.clear_product_categories(id).await?;

    tracing::info!(product_id = id, "Product categories cleared");
    state
        .ws_manager
        .broadcast_event(&CatalogEvent::ProductUpdated {
            id: product.id,
            name: product.name.clone(),
        })
        .await;

    Ok(Json(DataResponse { data: product }))
}
