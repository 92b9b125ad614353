use crate::api::AppState;
use crate::api::schemas::subscriptions::{SubscriptionRequest, SubscriptionResponse};
use crate::error::{AppError, Result};
use axum::{Json, extract::State, response::IntoResponse};

/// Registers a device for push notifications and relays a welcome push.
///
/// # Errors
/// Returns `AppError::BadRequest` for malformed payloads or tokens, and
/// `AppError::Subscription` if the registry upsert fails.
pub async fn register_subscription(
    State(state): State<AppState>,
    Json(payload): Json<SubscriptionRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!(device_id = %payload.device_id, "Subscription request received");
    payload.validate().map_err(AppError::BadRequest)?;

    let (device, tickets) =
        state.subscription_service.register(&payload.device_id, &payload.push_token).await?;

    Ok(Json(SubscriptionResponse {
        message: "Push notification token registered successfully".to_string(),
        user: device,
        notification_tickets: tickets,
    }))
}
