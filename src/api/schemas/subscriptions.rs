use crate::domain::device::Device;
use crate::domain::push::PushTicket;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub push_token: String,
    pub device_id: String,
}

impl SubscriptionRequest {
    /// Validates the subscription payload.
    ///
    /// # Errors
    /// Returns an error if a field is empty or excessively large (anti-abuse).
    pub fn validate(&self) -> Result<(), String> {
        if self.device_id.trim().is_empty() {
            return Err("Device id cannot be empty".into());
        }
        if self.device_id.len() > 255 {
            return Err("Device id is too long (max 255 characters)".into());
        }
        if self.push_token.trim().is_empty() {
            return Err("Push token cannot be empty".into());
        }
        if self.push_token.len() > 4096 {
            return Err("Push token is too long (max 4096 characters)".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub message: String,
    pub user: Device,
    pub notification_tickets: Vec<PushTicket>,
}
