use crate::domain::device::Device;
use crate::domain::push::{PushMessage, PushTicket, Recipient};
use crate::error::{AppError, Result};
use crate::services::push::PushDispatcher;
use crate::storage::DeviceStore;
use serde_json::json;
use std::sync::Arc;

/// Registers a device's push token and sends it a welcome notification.
#[derive(Debug, Clone)]
pub struct SubscriptionService {
    devices: Arc<dyn DeviceStore>,
    dispatcher: PushDispatcher,
}

impl SubscriptionService {
    #[must_use]
    pub const fn new(devices: Arc<dyn DeviceStore>, dispatcher: PushDispatcher) -> Self {
        Self { devices, dispatcher }
    }

    /// Upserts the device record and relays a welcome push, returning the
    /// upserted record and the delivery tickets.
    ///
    /// Accepted tickets additionally get a deferred receipt check; its
    /// outcome is never surfaced here.
    ///
    /// # Errors
    /// Returns `AppError::BadRequest` if the token fails provider format
    /// validation, and `AppError::Subscription` if the registry upsert fails.
    pub async fn register(&self, device_id: &str, push_token: &str) -> Result<(Device, Vec<PushTicket>)> {
        if !self.dispatcher.provider().is_push_token(push_token) {
            tracing::error!(push_token = %push_token, "Invalid push token");
            return Err(AppError::BadRequest("Invalid Expo push token".to_string()));
        }

        let device = self
            .devices
            .upsert(device_id, push_token)
            .await
            .map_err(|e| AppError::Subscription(anyhow::anyhow!(e)))?;

        let tickets = self
            .dispatcher
            .send_batch(vec![PushMessage {
                to: Recipient::One(push_token.to_string()),
                sound: Some("default".to_string()),
                title: "Welcome!".to_string(),
                body: "Yay!".to_string(),
                data: Some(json!({ "message": "Welcome" })),
            }])
            .await;

        let receipt_ids = self.dispatcher.schedule_receipt_check(&tickets);
        if !receipt_ids.is_empty() {
            tracing::debug!(count = receipt_ids.len(), "Scheduled deferred receipt check");
        }

        Ok((device, tickets))
    }
}
