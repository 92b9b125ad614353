use serde::{Deserialize, Serialize};

/// Destination of a push message: a single token or a fan-out list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    One(String),
    Many(Vec<String>),
}

impl Recipient {
    /// The token that gets format-validated before submission.
    ///
    /// For a fan-out list only the first entry is checked. This mirrors the
    /// provider SDK's behavior and is a known under-validation gap: later
    /// entries of a list are submitted unchecked.
    #[must_use]
    pub fn primary_token(&self) -> Option<&str> {
        match self {
            Self::One(token) => Some(token.as_str()),
            Self::Many(tokens) => tokens.first().map(String::as_str),
        }
    }
}

/// One outbound push message in the provider's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: Recipient,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Provider acknowledgment for a single submitted message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushTicket {
    Ok {
        id: String,
    },
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<ErrorDetails>,
    },
}

impl PushTicket {
    /// The receipt id for an accepted ticket, `None` for an error ticket.
    #[must_use]
    pub fn receipt_id(&self) -> Option<&str> {
        match self {
            Self::Ok { id } => Some(id.as_str()),
            Self::Error { .. } => None,
        }
    }
}

/// Provider's final verdict on an accepted message, keyed by receipt id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PushReceipt {
    Ok,
    Error {
        #[serde(default)]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<ErrorDetails>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReceiptErrorCode>,
}

/// Error codes the provider attaches to failed tickets and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptErrorCode {
    DeviceNotRegistered,
    InvalidCredentials,
    MessageTooBig,
    MessageRateExceeded,
    MismatchSenderId,
    #[serde(other)]
    Unknown,
}

impl ReceiptErrorCode {
    /// Whether the code denotes a permanent delivery failure for the token.
    /// Tokens behind these codes are candidates for eviction from the registry.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self, Self::DeviceNotRegistered | Self::InvalidCredentials)
    }
}
