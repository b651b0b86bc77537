use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::api::ApiError;
use crate::models::agreement;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(MIGRATIONS).execute(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Seed demo agreements when the table is empty. Returns the number inserted.
pub async fn seed_agreements(pool: &PgPool) -> Result<usize, ApiError> {
    let existing = agreement::count(pool).await?;
    if existing > 0 {
        log::info!("Database already seeded ({} agreements), skipping", existing);
        return Ok(0);
    }

    let seed = agreement::seed_agreements()
        .map_err(|e| ApiError::Server(format!("Bad agreement seed JSON: {e}")))?;
    for a in &seed {
        agreement::insert(pool, a).await?;
    }
    log::info!("Seeded {} agreements", seed.len());
    Ok(seed.len())
}
