pub mod expo;
pub mod provider;

use crate::domain::push::{PushMessage, PushReceipt, PushTicket};
use crate::services::push::provider::PushProvider;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Batches outbound messages into provider-sized chunks, submits them, and
/// follows up on accepted tickets with a deferred receipt check.
///
/// Every failure below the validation step is best-effort: logged, never
/// surfaced to the caller, never retried. Push delivery is not critical to
/// the registration flow.
#[derive(Debug, Clone)]
pub struct PushDispatcher {
    provider: Arc<dyn PushProvider>,
    receipt_delay: Duration,
}

impl PushDispatcher {
    #[must_use]
    pub const fn new(provider: Arc<dyn PushProvider>, receipt_delay: Duration) -> Self {
        Self { provider, receipt_delay }
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn PushProvider> {
        &self.provider
    }

    /// Submits `messages` to the provider in batch order.
    ///
    /// Messages with an invalid destination token are dropped up front and
    /// never produce a ticket. Chunks are submitted sequentially; a failed
    /// chunk is logged and skipped, so the returned tickets are exactly the
    /// surviving messages' tickets in submission order.
    pub async fn send_batch(&self, messages: Vec<PushMessage>) -> Vec<PushTicket> {
        let total = messages.len();
        let valid: Vec<PushMessage> = messages
            .into_iter()
            .filter(|message| {
                message
                    .to
                    .primary_token()
                    .is_some_and(|token| self.provider.is_push_token(token))
            })
            .collect();

        if valid.len() < total {
            tracing::warn!(dropped = total - valid.len(), "Dropped messages with invalid push tokens");
        }

        let mut tickets = Vec::with_capacity(valid.len());
        for chunk in valid.chunks(self.provider.message_batch_limit()) {
            match self.provider.submit(chunk).await {
                Ok(chunk_tickets) => {
                    for (ticket, message) in chunk_tickets.iter().zip(chunk) {
                        if let PushTicket::Error { message: error, details } = ticket {
                            tracing::error!(
                                error = %error,
                                ?details,
                                original = ?message,
                                "Provider rejected push message"
                            );
                        }
                    }
                    tickets.extend(chunk_tickets);
                }
                Err(e) => {
                    tracing::error!(error = %e, count = chunk.len(), "Failed to submit push chunk");
                }
            }
        }

        tickets
    }

    /// Queries the provider for delivery receipts and logs the verdicts.
    ///
    /// Receipts with a permanent error code mark their token as stale, but
    /// eviction from the registry is intentionally not wired up yet; the
    /// candidate is only logged.
    pub async fn check_receipts(&self, receipt_ids: &[String]) {
        for chunk in receipt_ids.chunks(self.provider.receipt_batch_limit()) {
            let receipts = match self.provider.fetch_receipts(chunk).await {
                Ok(receipts) => receipts,
                Err(e) => {
                    tracing::error!(error = %e, count = chunk.len(), "Failed to fetch receipt chunk");
                    continue;
                }
            };

            for (receipt_id, receipt) in &receipts {
                let PushReceipt::Error { message, details } = receipt else {
                    continue;
                };

                tracing::error!(
                    receipt_id = %receipt_id,
                    message = message.as_deref().unwrap_or("unknown error"),
                    "Push delivery failed"
                );

                if let Some(code) = details.as_ref().and_then(|d| d.error) {
                    tracing::error!(receipt_id = %receipt_id, ?code, "Receipt error code");
                    if code.is_permanent() {
                        tracing::warn!(
                            receipt_id = %receipt_id,
                            ?code,
                            "Token is stale and eligible for eviction (eviction not implemented)"
                        );
                    }
                }
            }
        }
    }

    /// Schedules a one-shot deferred receipt check for the accepted tickets
    /// and returns their receipt ids immediately.
    ///
    /// Fire-and-forget: the spawned task is not awaited, has no cancellation
    /// handle, and is dropped if the process exits before the delay elapses.
    /// When no ticket was accepted, nothing is scheduled.
    pub fn schedule_receipt_check(&self, tickets: &[PushTicket]) -> Vec<String> {
        let receipt_ids: Vec<String> =
            tickets.iter().filter_map(|ticket| ticket.receipt_id().map(str::to_owned)).collect();

        if receipt_ids.is_empty() {
            return receipt_ids;
        }

        let dispatcher = self.clone();
        let ids = receipt_ids.clone();
        tokio::spawn(
            async move {
                tokio::time::sleep(dispatcher.receipt_delay).await;
                dispatcher.check_receipts(&ids).await;
            }
            .instrument(tracing::info_span!("deferred_receipt_check")),
        );

        receipt_ids
    }
}
