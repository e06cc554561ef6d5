use lapstore_core::{AppConfig, ValidationError};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Resolved from crates/lapstore-db/, i.e. the workspace-root migrations/.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("record not found")]
    NotFound,
    #[error("invalid product: {0}")]
    Invalid(#[from] ValidationError),
    #[error("malformed product row {id}: {reason}")]
    InvalidRow { id: uuid::Uuid, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Opens a Postgres pool sized by `config`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Opens the catalog pool described by the application config.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if the configured URL is blank, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    if config.database_url.trim().is_empty() {
        return Err(DbError::MissingDatabaseUrl);
    }
    connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await
}

/// Applies pending catalog migrations and returns how many were new.
///
/// # Errors
///
/// Returns [`DbError::Migration`] if a migration fails, or [`DbError::Sqlx`]
/// if the migration ledger cannot be read.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, DbError> {
    let before = applied_migrations(pool).await?;
    MIGRATOR.run(pool).await?;
    let after = applied_migrations(pool).await?;
    Ok(usize::try_from(after.saturating_sub(before)).unwrap_or(0))
}

async fn applied_migrations(pool: &PgPool) -> Result<i64, DbError> {
    // Fresh databases have no ledger table until the first run.
    let has_ledger =
        sqlx::query_scalar::<_, bool>("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
            .fetch_one(pool)
            .await?;
    if !has_ledger {
        return Ok(0);
    }
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Confirms the pool can run a query.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the round trip fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}


pub mod products;
pub mod store;

pub use products::{
    create_product, delete_product, get_product, list_products, update_product, ProductFilter,
    ProductRow,
};
pub use store::PgProductStore;
