//! Postgres persistence for catalogd.
//!
//! Provides the connection pool, migrations, row models, repositories, and
//! [`store::PgCatalogStore`] — the production implementation of
//! `catalogd_core::store::CatalogStore`.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
