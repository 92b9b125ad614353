use crate::domain::push::{PushMessage, PushReceipt, PushTicket};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Push API error: {0}")]
    Api(String),
    #[error("External service error: {0}")]
    Other(#[from] anyhow::Error),
}

/// The push-delivery provider. Batch limits are owned by the provider;
/// callers must chunk by the advertised limits rather than assume constants.
#[async_trait]
pub trait PushProvider: Send + Sync + std::fmt::Debug {
    /// Whether `token` is syntactically a valid push token for this provider.
    fn is_push_token(&self, token: &str) -> bool;

    /// Maximum number of messages accepted in a single submission.
    fn message_batch_limit(&self) -> usize;

    /// Maximum number of receipt ids accepted in a single lookup.
    fn receipt_batch_limit(&self) -> usize;

    /// Submits one batch of messages. Returns one ticket per message, in
    /// the order the messages were given.
    ///
    /// # Errors
    /// Fails as a whole batch; no tickets are produced for its messages.
    async fn submit(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, ProviderError>;

    /// Fetches delivery receipts for previously accepted tickets, keyed by
    /// receipt id. Ids the provider has no verdict for yet are absent.
    ///
    /// # Errors
    /// Fails as a whole chunk.
    async fn fetch_receipts(
        &self,
        receipt_ids: &[String],
    ) -> Result<HashMap<String, PushReceipt>, ProviderError>;
}
