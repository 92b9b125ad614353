pub mod device_repo;

use crate::domain::device::Device;
use crate::error::Result;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub type DbPool = Pool<Postgres>;

/// Initializes the database connection pool.
///
/// # Errors
/// Returns `sqlx::Error` if the connection fails.
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Runs pending database migrations.
///
/// # Errors
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::migrate!().run(pool).await?;
    Ok(())
}

/// Registry of device-to-token mappings.
///
/// The trait seam exists so the subscription flow can be exercised without
/// a live Postgres instance.
#[async_trait]
pub trait DeviceStore: Send + Sync + std::fmt::Debug {
    /// Creates or replaces the record for `device_id`, keyed on `device_id`.
    /// There is no insert/update distinction; the latest token always wins.
    async fn upsert(&self, device_id: &str, push_token: &str) -> Result<Device>;
}
