//! Repository for the `categories` table and the category side of the
//! `product_categories` join table.

use catalogd_core::entity::Category;
use catalogd_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::CategoryRow;

/// Column list for `categories` queries.
const COLUMNS: &str = "id, name";

/// Provides row CRUD for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Find a category row by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-sensitive exact-name lookup.
    pub async fn find_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists_by_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await
    }

    /// Resolve the subset of `ids` that exist, ordered by id.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List all categories, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name ASC");
        sqlx::query_as::<_, CategoryRow>(&query).fetch_all(pool).await
    }

    /// Insert a new category row, returning it with its assigned id.
    ///
    /// Duplicate names violate `uq_categories_name`; the caller surfaces the
    /// conflict (the engine's exists-check makes this a concurrency race,
    /// not a normal path).
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        category: &Category,
    ) -> Result<CategoryRow, sqlx::Error> {
        let query = format!("INSERT INTO categories (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&category.name)
            .fetch_one(executor)
            .await
    }

    /// Rename an existing row. Returns `None` when the row is gone.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        category: &Category,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("UPDATE categories SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(category.id)
            .bind(&category.name)
            .fetch_optional(executor)
            .await
    }

    /// Delete a category row. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every join row referencing the category. Returns the purge
    /// count.
    pub async fn purge_links<'e>(
        executor: impl PgExecutor<'e>,
        category_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_categories WHERE category_id = $1")
            .bind(category_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Ids of the products in a category.
    pub async fn product_ids_of<'e>(
        executor: impl PgExecutor<'e>,
        category_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT product_id FROM product_categories WHERE category_id = $1")
            .bind(category_id)
            .fetch_all(executor)
            .await
    }

    /// All (category_id, product_id) edges for the given categories, for
    /// bulk hydration.
    pub async fn links_for<'e>(
        executor: impl PgExecutor<'e>,
        category_ids: &[DbId],
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT category_id, product_id FROM product_categories WHERE category_id = ANY($1)",
        )
        .bind(category_ids)
        .fetch_all(executor)
        .await
    }
}
