use async_trait::async_trait;
use beacon_server::config::{Config, LogFormat, PushConfig, RateLimitConfig, ServerConfig, TelemetryConfig};
use beacon_server::domain::device::Device;
use beacon_server::domain::push::{ErrorDetails, PushMessage, PushReceipt, PushTicket};
use beacon_server::error::Result;
use beacon_server::services::push::PushDispatcher;
use beacon_server::services::push::provider::{ProviderError, PushProvider};
use beacon_server::services::subscription_service::SubscriptionService;
use beacon_server::storage::DeviceStore;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

static INIT: Once = Once::new();

#[allow(dead_code)]
pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("beacon_server=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

#[allow(dead_code)]
pub fn get_test_config() -> Config {
    Config {
        database_url: "postgres://unused-in-tests".to_string(),
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 0, shutdown_timeout_secs: 10 },
        rate_limit: RateLimitConfig { per_second: 10_000, burst: 10_000 },
        push: PushConfig {
            access_token: None,
            api_url: "https://exp.host/--/api/v2".to_string(),
            receipt_delay_secs: 15,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text },
    }
}

/// In-process push provider that records every submission and receipt
/// lookup, with configurable batch limits and per-call failures.
#[derive(Debug)]
pub struct MockPushProvider {
    message_batch_limit: usize,
    receipt_batch_limit: usize,
    submit_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    failing_submit_calls: HashSet<usize>,
    failing_fetch_calls: HashSet<usize>,
    submitted: Mutex<Vec<Vec<PushMessage>>>,
    fetched: Mutex<Vec<Vec<String>>>,
    receipts: Mutex<HashMap<String, PushReceipt>>,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self {
            message_batch_limit: 100,
            receipt_batch_limit: 300,
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            failing_submit_calls: HashSet::new(),
            failing_fetch_calls: HashSet::new(),
            submitted: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
            receipts: Mutex::new(HashMap::new()),
        }
    }

    #[allow(dead_code)]
    pub fn with_message_batch_limit(mut self, limit: usize) -> Self {
        self.message_batch_limit = limit;
        self
    }

    #[allow(dead_code)]
    pub fn with_receipt_batch_limit(mut self, limit: usize) -> Self {
        self.receipt_batch_limit = limit;
        self
    }

    /// Makes the nth submit call (1-based) fail at the chunk level.
    #[allow(dead_code)]
    pub fn failing_submit_call(mut self, call: usize) -> Self {
        self.failing_submit_calls.insert(call);
        self
    }

    /// Makes the nth receipt fetch (1-based) fail at the chunk level.
    #[allow(dead_code)]
    pub fn failing_fetch_call(mut self, call: usize) -> Self {
        self.failing_fetch_calls.insert(call);
        self
    }

    #[allow(dead_code)]
    pub fn with_receipt(self, id: &str, receipt: PushReceipt) -> Self {
        self.receipts.lock().unwrap().insert(id.to_string(), receipt);
        self
    }

    /// Tokens submitted to the provider, flattened across chunks in order.
    #[allow(dead_code)]
    pub fn submitted_tokens(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .filter_map(|m| m.to.primary_token().map(str::to_owned))
            .collect()
    }

    #[allow(dead_code)]
    pub fn submitted_chunks(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn fetched_chunks(&self) -> Vec<Vec<String>> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    fn is_push_token(&self, token: &str) -> bool {
        token.starts_with("ExponentPushToken[") && token.ends_with(']')
    }

    fn message_batch_limit(&self) -> usize {
        self.message_batch_limit
    }

    fn receipt_batch_limit(&self) -> usize {
        self.receipt_batch_limit
    }

    async fn submit(&self, messages: &[PushMessage]) -> std::result::Result<Vec<PushTicket>, ProviderError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_submit_calls.contains(&call) {
            return Err(ProviderError::Api(format!("submit call {call} failed")));
        }

        self.submitted.lock().unwrap().push(messages.to_vec());

        // A token containing "reject" yields an error ticket; everything
        // else is accepted with a receipt id derived from the token.
        Ok(messages
            .iter()
            .map(|message| {
                let token = message.to.primary_token().unwrap_or_default();
                if token.contains("reject") {
                    PushTicket::Error {
                        message: format!("{token} is not a registered device"),
                        details: Some(ErrorDetails {
                            error: Some(beacon_server::domain::push::ReceiptErrorCode::DeviceNotRegistered),
                        }),
                    }
                } else {
                    PushTicket::Ok { id: format!("receipt-{token}") }
                }
            })
            .collect())
    }

    async fn fetch_receipts(
        &self,
        receipt_ids: &[String],
    ) -> std::result::Result<HashMap<String, PushReceipt>, ProviderError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_fetch_calls.contains(&call) {
            return Err(ProviderError::Api(format!("fetch call {call} failed")));
        }

        self.fetched.lock().unwrap().push(receipt_ids.to_vec());

        let known = self.receipts.lock().unwrap();
        Ok(receipt_ids
            .iter()
            .map(|id| (id.clone(), known.get(id).cloned().unwrap_or(PushReceipt::Ok)))
            .collect())
    }
}

/// Device registry backed by a map, keyed on device id like the real table.
#[derive(Debug, Default)]
pub struct InMemoryDeviceStore {
    devices: Mutex<HashMap<String, Device>>,
}

impl InMemoryDeviceStore {
    #[allow(dead_code)]
    pub fn record_count(&self) -> usize {
        self.devices.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn token_for(&self, device_id: &str) -> Option<String> {
        self.devices.lock().unwrap().get(device_id).map(|d| d.push_token.clone())
    }
}

#[async_trait]
impl DeviceStore for InMemoryDeviceStore {
    async fn upsert(&self, device_id: &str, push_token: &str) -> Result<Device> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .entry(device_id.to_string())
            .and_modify(|d| {
                d.push_token = push_token.to_string();
                d.updated_at = OffsetDateTime::now_utc();
            })
            .or_insert_with(|| Device {
                id: Uuid::new_v4(),
                device_id: device_id.to_string(),
                push_token: push_token.to_string(),
                updated_at: OffsetDateTime::now_utc(),
            });
        Ok(device.clone())
    }
}

/// A registry whose upsert always fails, for the 500 path.
#[derive(Debug, Default)]
pub struct FailingDeviceStore;

#[async_trait]
impl DeviceStore for FailingDeviceStore {
    async fn upsert(&self, _device_id: &str, _push_token: &str) -> Result<Device> {
        Err(beacon_server::error::AppError::Database(sqlx::Error::PoolClosed))
    }
}

#[allow(dead_code)]
pub fn dispatcher_with(provider: Arc<MockPushProvider>) -> PushDispatcher {
    PushDispatcher::new(provider, Duration::from_secs(15))
}

#[allow(dead_code)]
#[must_use]
pub fn subscription_service(
    devices: Arc<dyn DeviceStore>,
    provider: Arc<MockPushProvider>,
) -> SubscriptionService {
    SubscriptionService::new(devices, dispatcher_with(provider))
}
