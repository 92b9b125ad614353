use crate::config::PushConfig;
use crate::domain::push::{PushMessage, PushReceipt, PushTicket};
use crate::services::push::provider::{ProviderError, PushProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Documented Expo limit on messages per send request.
const MESSAGE_BATCH_LIMIT: usize = 100;
/// Documented Expo limit on receipt ids per getReceipts request.
const RECEIPT_BATCH_LIMIT: usize = 300;

/// Client for the Expo push HTTP API.
#[derive(Debug, Clone)]
pub struct ExpoPushProvider {
    client: Client,
    api_url: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    data: Vec<PushTicket>,
}

#[derive(Debug, Serialize)]
struct ReceiptsRequest<'a> {
    ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ReceiptsResponse {
    data: HashMap<String, PushReceipt>,
}

impl ExpoPushProvider {
    #[must_use]
    pub fn new(config: &PushConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{path}", self.api_url));
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl PushProvider for ExpoPushProvider {
    fn is_push_token(&self, token: &str) -> bool {
        let bracketed = (token.starts_with("ExponentPushToken[") || token.starts_with("ExpoPushToken["))
            && token.ends_with(']');
        // The Expo SDK also accepts a bare registration UUID.
        bracketed || Uuid::parse_str(token).is_ok()
    }

    fn message_batch_limit(&self) -> usize {
        MESSAGE_BATCH_LIMIT
    }

    fn receipt_batch_limit(&self) -> usize {
        RECEIPT_BATCH_LIMIT
    }

    async fn submit(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, ProviderError> {
        let response = self.post("/push/send").json(messages).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("push/send returned {status}: {body}")));
        }

        let parsed: SendResponse = response.json().await?;
        Ok(parsed.data)
    }

    async fn fetch_receipts(
        &self,
        receipt_ids: &[String],
    ) -> Result<HashMap<String, PushReceipt>, ProviderError> {
        let response = self
            .post("/push/getReceipts")
            .json(&ReceiptsRequest { ids: receipt_ids })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("push/getReceipts returned {status}: {body}")));
        }

        let parsed: ReceiptsResponse = response.json().await?;
        Ok(parsed.data)
    }
}
