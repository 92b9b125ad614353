use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Database connection URL
    #[arg(long, env = "BEACON_DATABASE_URL")]
    pub database_url: String,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub push: PushConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "BEACON_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "BEACON_PORT", default_value_t = 3000)]
    pub port: u16,

    /// How long to wait for in-flight requests during shutdown
    #[arg(long, env = "BEACON_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Requests per second allowed per client
    #[arg(long, env = "BEACON_RATE_LIMIT_PER_SECOND", default_value_t = 2)]
    pub per_second: u32,

    /// Burst allowance per client
    #[arg(long, env = "BEACON_RATE_LIMIT_BURST", default_value_t = 10)]
    pub burst: u32,
}

#[derive(Clone, Debug, Args)]
pub struct PushConfig {
    /// Access token for the Expo push API (enhanced push security)
    #[arg(long, env = "BEACON_EXPO_ACCESS_TOKEN")]
    pub access_token: Option<String>,

    /// Base URL of the Expo push API
    #[arg(long, env = "BEACON_EXPO_API_URL", default_value = "https://exp.host/--/api/v2")]
    pub api_url: String,

    /// Delay before checking delivery receipts for accepted tickets
    #[arg(long, env = "BEACON_RECEIPT_DELAY_SECS", default_value_t = 15)]
    pub receipt_delay_secs: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "BEACON_LOG_FORMAT", value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

impl Config {
    pub fn load() -> Self {
        Self::parse()
    }
}
