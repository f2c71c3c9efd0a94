//! Repository for the `products` table and the product side of the
//! `product_categories` join table, including the dynamic search query.

use std::collections::BTreeSet;

use catalogd_core::entity::Product;
use catalogd_core::filter::{FilterClause, ProductFilter, SortDir, SortField, SortSpec};
use catalogd_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::models::ProductRow;

/// Column list for `products` queries.
const COLUMNS: &str = "id, name, description, price, created_at, updated_at";

/// Provides row CRUD and search for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Find a product row by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the subset of `ids` that exist, ordered by id.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<ProductRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Insert a new product row, returning it with its assigned id.
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        product: &Product,
    ) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (name, description, price, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(executor)
            .await
    }

    /// Update an existing row. `created_at` is immutable and never written.
    /// Returns `None` when the row is gone.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        product: &Product,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET name = $2, description = $3, price = $4, updated_at = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.updated_at)
            .fetch_optional(executor)
            .await
    }

    /// Delete a product row (join rows cascade). Returns `true` if a row was
    /// deleted; `false` means it was already gone, which concurrent deletes
    /// treat as benign.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Ids of the categories a product belongs to.
    pub async fn category_ids_of<'e>(
        executor: impl PgExecutor<'e>,
        product_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT category_id FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(executor)
            .await
    }

    /// All (product_id, category_id) edges for the given products, for bulk
    /// hydration.
    pub async fn links_for<'e>(
        executor: impl PgExecutor<'e>,
        product_ids: &[DbId],
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT product_id, category_id FROM product_categories WHERE product_id = ANY($1)",
        )
        .bind(product_ids)
        .fetch_all(executor)
        .await
    }

    /// Reconcile the join table for one product against its in-memory edge
    /// set. Runs inside the caller's transaction.
    pub async fn replace_links(
        conn: &mut PgConnection,
        product_id: DbId,
        category_ids: &BTreeSet<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(product_id)
            .execute(&mut *conn)
            .await?;
        for category_id in category_ids {
            sqlx::query(
                "INSERT INTO product_categories (product_id, category_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(product_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Run the composed search filter against the store.
    pub async fn search(
        pool: &PgPool,
        filter: Option<&ProductFilter>,
        sort: SortSpec,
    ) -> Result<Vec<ProductRow>, sqlx::Error> {
        let mut query = build_search_query(filter, sort);
        query
            .build_query_as::<ProductRow>()
            .fetch_all(pool)
            .await
    }
}

/// Render the composed filter and sort into a SQL query.
///
/// Each clause becomes one WHERE conjunct; the category union becomes a
/// single EXISTS subquery over the join table with `name = ANY(...)`. No
/// WHERE is emitted at all for an absent filter.
pub fn build_search_query(
    filter: Option<&ProductFilter>,
    sort: SortSpec,
) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<'static, Postgres> = QueryBuilder::new(format!(
        "SELECT {COLUMNS} FROM products p"
    ));

    if let Some(filter) = filter {
        for (i, clause) in filter.clauses().iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            match clause {
                FilterClause::NameContains(needle) => {
                    query.push("p.name ILIKE ");
                    query.push_bind(like_pattern(needle));
                }
                FilterClause::DescriptionContains(needle) => {
                    query.push("p.description ILIKE ");
                    query.push_bind(like_pattern(needle));
                }
                FilterClause::PriceAtLeast(min) => {
                    query.push("p.price >= ");
                    query.push_bind(*min);
                }
                FilterClause::PriceAtMost(max) => {
                    query.push("p.price <= ");
                    query.push_bind(*max);
                }
                FilterClause::CreatedOnOrBefore(bound) => {
                    query.push("p.created_at <= ");
                    query.push_bind(*bound);
                }
                FilterClause::CreatedOnOrAfter(bound) => {
                    query.push("p.created_at >= ");
                    query.push_bind(*bound);
                }
                FilterClause::InAnyCategory(names) => {
                    query.push(
                        "EXISTS (SELECT 1 FROM product_categories pc \
                         JOIN categories c ON c.id = pc.category_id \
                         WHERE pc.product_id = p.id AND c.name = ANY(",
                    );
                    query.push_bind(names.clone());
                    query.push("))");
                }
            }
        }
    }

    query.push(" ORDER BY ");
    query.push(sort_column(sort.field));
    query.push(match sort.dir {
        SortDir::Asc => " ASC",
        SortDir::Desc => " DESC",
    });

    query
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::Id => "p.id",
        SortField::Name => "p.name",
        SortField::Price => "p.price",
        SortField::Created => "p.created_at",
        SortField::Updated => "p.updated_at",
    }
}

/// Wrap a user needle in `%`, escaping LIKE metacharacters so they match
/// literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use catalogd_core::filter::SearchCriteria;

    use super::*;

    fn filter(criteria: SearchCriteria) -> ProductFilter {
        ProductFilter::build(&criteria).expect("criteria should compose")
    }

    #[test]
    fn no_filter_renders_without_where() {
        let query = build_search_query(None, SortSpec::default());
        assert_eq!(
            query.sql(),
            "SELECT id, name, description, price, created_at, updated_at \
             FROM products p ORDER BY p.id ASC"
        );
    }

    #[test]
    fn scalar_clauses_join_with_and() {
        let f = filter(SearchCriteria {
            name_contains: Some("bread".into()),
            price_max: Some(1000),
            ..Default::default()
        });
        let query = build_search_query(Some(&f), SortSpec::default());
        let sql = query.sql();

        assert!(sql.contains("WHERE p.name ILIKE $1"));
        assert!(sql.contains("AND p.price <= $2"));
        assert!(sql.ends_with("ORDER BY p.id ASC"));
    }

    #[test]
    fn category_union_renders_as_exists_subquery() {
        let f = filter(SearchCriteria {
            category_names: vec!["A".into(), "Grocery".into()],
            ..Default::default()
        });
        let query = build_search_query(Some(&f), SortSpec::default());
        let sql = query.sql();

        assert!(sql.contains("EXISTS (SELECT 1 FROM product_categories pc"));
        assert!(sql.contains("c.name = ANY($1)"));
    }

    #[test]
    fn sort_renders_requested_column_and_direction() {
        let query = build_search_query(
            None,
            SortSpec {
                field: SortField::Name,
                dir: SortDir::Desc,
            },
        );
        assert!(query.sql().ends_with("ORDER BY p.name DESC"));
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("br_ad%"), "%br\\_ad\\%%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }
}
