use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// Persisted association between a device identifier and its current push token.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub device_id: String,
    pub push_token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
