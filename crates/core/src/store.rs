//! The persistence contract the consistency engine depends on.
//!
//! The engine never talks to Postgres directly; it goes through
//! [`CatalogStore`] so the whole orchestration layer can be exercised
//! against an in-memory implementation. `catalogd-db` provides the
//! production implementation backed by sqlx.
//!
//! Join-row ownership: association edges are persisted from the **product
//! side** — `save_product` reconciles the join table against
//! `Product::category_ids`. `save_category` persists identity and name only.
//! `purge_category_links` exists for cascade-consistent category deletion,
//! where every join row referencing the category must be gone before the
//! category row itself is removed.

use async_trait::async_trait;

use crate::entity::{Category, Product};
use crate::error::CoreResult;
use crate::filter::{ProductFilter, SortSpec};
use crate::types::DbId;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // -- Point lookups ------------------------------------------------------

    async fn find_product_by_id(&self, id: DbId) -> CoreResult<Option<Product>>;

    async fn find_category_by_id(&self, id: DbId) -> CoreResult<Option<Category>>;

    /// Case-sensitive exact-name lookup.
    async fn find_category_by_name(&self, name: &str) -> CoreResult<Option<Category>>;

    async fn category_exists_by_name(&self, name: &str) -> CoreResult<bool>;

    // -- Bulk lookups -------------------------------------------------------

    /// Resolve the subset of `ids` that exist. Missing ids are simply absent
    /// from the result; callers decide whether that is an error.
    async fn find_products_by_ids(&self, ids: &[DbId]) -> CoreResult<Vec<Product>>;

    async fn find_categories_by_ids(&self, ids: &[DbId]) -> CoreResult<Vec<Category>>;

    async fn list_categories(&self) -> CoreResult<Vec<Category>>;

    // -- Upserts ------------------------------------------------------------

    /// Insert (assigning a surrogate id when `id == UNSAVED`) or update the
    /// product row, and reconcile its join rows against `category_ids`.
    async fn save_product(&self, product: Product) -> CoreResult<Product>;

    async fn save_products(&self, products: Vec<Product>) -> CoreResult<Vec<Product>>;

    /// Insert or update the category row. Does not touch join rows.
    async fn save_category(&self, category: Category) -> CoreResult<Category>;

    async fn save_categories(&self, categories: Vec<Category>) -> CoreResult<Vec<Category>>;

    // -- Deletes ------------------------------------------------------------

    /// Delete the product row and its join rows. Returns `false` when the
    /// row was already gone, which concurrent deletes treat as benign.
    async fn delete_product_by_id(&self, id: DbId) -> CoreResult<bool>;

    /// Delete the category row. Returns `false` when already gone.
    async fn delete_category_by_id(&self, id: DbId) -> CoreResult<bool>;

    /// Remove every join row referencing the category. Returns the number of
    /// rows purged.
    async fn purge_category_links(&self, category_id: DbId) -> CoreResult<u64>;

    // -- Queries ------------------------------------------------------------

    /// Fetch products matching the composed filter (all of them when `None`),
    /// ordered by `sort` (ascending id when `None`).
    async fn query_products(
        &self,
        filter: Option<&ProductFilter>,
        sort: Option<SortSpec>,
    ) -> CoreResult<Vec<Product>>;
}
