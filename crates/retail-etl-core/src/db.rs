use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{EtlError, Result};

pub use sqlx::Error as SqlxError;

pub type DbPool = Pool<Postgres>;

pub const SOURCE: &str = "source";
pub const WAREHOUSE: &str = "warehouse";

/// Establish a Postgres connection pool for one side of the pipeline.
///
/// `target` names the side (`source` or `warehouse`) in errors and logs.
pub async fn connect(target: &'static str, config: &DatabaseConfig) -> Result<DbPool> {
    let pool = pool_options(config)
        .connect(&config.url)
        .await
        .map_err(|err| EtlError::connection(target, err))?;

    info!(target_db = target, "database connection pool established");
    Ok(pool)
}

/// Build a pool that opens connections on first use, so an unreachable store
/// surfaces when a stage acquires its connection rather than at startup.
pub fn connect_lazy(target: &'static str, config: &DatabaseConfig) -> Result<DbPool> {
    pool_options(config)
        .connect_lazy(&config.url)
        .map_err(|err| EtlError::connection(target, err))
}

/// Run the embedded warehouse migrations. Safe to call before every load.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
}
