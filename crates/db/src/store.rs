//! Postgres implementation of the core `CatalogStore` contract.
//!
//! Row data and join edges live in separate tables; every entity handed
//! back to the engine is hydrated with its edge id-set. Writes that span
//! the row and the join table run in one transaction so a crash cannot
//! leave a product persisted without its edges.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use catalogd_core::entity::{Category, Product, UNSAVED};
use catalogd_core::error::{CoreError, CoreResult};
use catalogd_core::filter::{ProductFilter, SortSpec};
use catalogd_core::store::CatalogStore;
use catalogd_core::types::DbId;

use crate::models::{CategoryRow, ProductRow};
use crate::repositories::{CategoryRepo, ProductRepo};
use crate::DbPool;

/// `CatalogStore` backed by a Postgres pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Hydrate product rows with their join edges, preserving row order.
    async fn hydrate_products(&self, rows: Vec<ProductRow>) -> CoreResult<Vec<Product>> {
        let ids: Vec<DbId> = rows.iter().map(|row| row.id).collect();
        let links = ProductRepo::links_for(&self.pool, &ids)
            .await
            .map_err(map_sqlx_error)?;

        let mut edges: HashMap<DbId, BTreeSet<DbId>> = HashMap::new();
        for (product_id, category_id) in links {
            edges.entry(product_id).or_default().insert(category_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let category_ids = edges.remove(&row.id).unwrap_or_default();
                row.into_entity(category_ids)
            })
            .collect())
    }

    /// Hydrate category rows with their join edges, preserving row order.
    async fn hydrate_categories(&self, rows: Vec<CategoryRow>) -> CoreResult<Vec<Category>> {
        let ids: Vec<DbId> = rows.iter().map(|row| row.id).collect();
        let links = CategoryRepo::links_for(&self.pool, &ids)
            .await
            .map_err(map_sqlx_error)?;

        let mut edges: HashMap<DbId, BTreeSet<DbId>> = HashMap::new();
        for (category_id, product_id) in links {
            edges.entry(category_id).or_default().insert(product_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_ids = edges.remove(&row.id).unwrap_or_default();
                row.into_entity(product_ids)
            })
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_product_by_id(&self, id: DbId) -> CoreResult<Option<Product>> {
        let Some(row) = ProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };
        let category_ids = ProductRepo::category_ids_of(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Some(row.into_entity(category_ids.into_iter().collect())))
    }

    async fn find_category_by_id(&self, id: DbId) -> CoreResult<Option<Category>> {
        let Some(row) = CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };
        let product_ids = CategoryRepo::product_ids_of(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Some(row.into_entity(product_ids.into_iter().collect())))
    }

    async fn find_category_by_name(&self, name: &str) -> CoreResult<Option<Category>> {
        let Some(row) = CategoryRepo::find_by_name(&self.pool, name)
            .await
            .map_err(map_sqlx_error)?
        else {
            return Ok(None);
        };
        let product_ids = CategoryRepo::product_ids_of(&self.pool, row.id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Some(row.into_entity(product_ids.into_iter().collect())))
    }

    async fn category_exists_by_name(&self, name: &str) -> CoreResult<bool> {
        CategoryRepo::exists_by_name(&self.pool, name)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_products_by_ids(&self, ids: &[DbId]) -> CoreResult<Vec<Product>> {
        let rows = ProductRepo::find_by_ids(&self.pool, ids)
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate_products(rows).await
    }

    async fn find_categories_by_ids(&self, ids: &[DbId]) -> CoreResult<Vec<Category>> {
        let rows = CategoryRepo::find_by_ids(&self.pool, ids)
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate_categories(rows).await
    }

    async fn list_categories(&self) -> CoreResult<Vec<Category>> {
        let rows = CategoryRepo::list(&self.pool).await.map_err(map_sqlx_error)?;
        self.hydrate_categories(rows).await
    }

    async fn save_product(&self, product: Product) -> CoreResult<Product> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = if product.id == UNSAVED {
            ProductRepo::insert(&mut *tx, &product)
                .await
                .map_err(map_sqlx_error)?
        } else {
            ProductRepo::update(&mut *tx, &product)
                .await
                .map_err(map_sqlx_error)?
                .ok_or(CoreError::NotFound {
                    entity: "Product",
                    id: product.id,
                })?
        };

        ProductRepo::replace_links(&mut tx, row.id, &product.category_ids)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into_entity(product.category_ids))
    }

    async fn save_products(&self, products: Vec<Product>) -> CoreResult<Vec<Product>> {
        let mut saved = Vec::with_capacity(products.len());
        for product in products {
            saved.push(self.save_product(product).await?);
        }
        Ok(saved)
    }

    async fn save_category(&self, category: Category) -> CoreResult<Category> {
        let row = if category.id == UNSAVED {
            CategoryRepo::insert(&self.pool, &category)
                .await
                .map_err(map_sqlx_error)?
        } else {
            CategoryRepo::update(&self.pool, &category)
                .await
                .map_err(map_sqlx_error)?
                .ok_or(CoreError::NotFound {
                    entity: "Category",
                    id: category.id,
                })?
        };
        Ok(row.into_entity(category.product_ids))
    }

    async fn save_categories(&self, categories: Vec<Category>) -> CoreResult<Vec<Category>> {
        let mut saved = Vec::with_capacity(categories.len());
        for category in categories {
            saved.push(self.save_category(category).await?);
        }
        Ok(saved)
    }

    async fn delete_product_by_id(&self, id: DbId) -> CoreResult<bool> {
        ProductRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_category_by_id(&self, id: DbId) -> CoreResult<bool> {
        CategoryRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn purge_category_links(&self, category_id: DbId) -> CoreResult<u64> {
        CategoryRepo::purge_links(&self.pool, category_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn query_products(
        &self,
        filter: Option<&ProductFilter>,
        sort: Option<SortSpec>,
    ) -> CoreResult<Vec<Product>> {
        let rows = ProductRepo::search(&self.pool, filter, sort.unwrap_or_default())
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate_products(rows).await
    }
}

/// Classify a sqlx error into the core taxonomy.
///
/// Unique violations (PostgreSQL 23505) become conflicts so concurrent
/// inserts of the same category name surface as 409 rather than 500;
/// everything else is an opaque storage error.
fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(format!(
                "Duplicate value violates unique constraint: {constraint}"
            ));
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Storage(err.to_string())
}
