use crate::domain::device::Device;
use crate::error::Result;
use crate::storage::{DbPool, DeviceStore};
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct PgDeviceStore {
    pool: DbPool,
}

impl PgDeviceStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceStore for PgDeviceStore {
    async fn upsert(&self, device_id: &str, push_token: &str) -> Result<Device> {
        let device = sqlx::query_as::<_, Device>(
            r"
            INSERT INTO devices (device_id, push_token)
            VALUES ($1, $2)
            ON CONFLICT (device_id)
            DO UPDATE SET push_token = EXCLUDED.push_token, updated_at = now()
            RETURNING id, device_id, push_token, updated_at
            ",
        )
        .bind(device_id)
        .bind(push_token)
        .fetch_one(&self.pool)
        .await?;

        Ok(device)
    }
}
