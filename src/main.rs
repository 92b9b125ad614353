use beacon_server::config::Config;
use beacon_server::services::push::PushDispatcher;
use beacon_server::services::push::expo::ExpoPushProvider;
use beacon_server::services::push::provider::PushProvider;
use beacon_server::services::subscription_service::SubscriptionService;
use beacon_server::storage::device_repo::PgDeviceStore;
use beacon_server::storage::{self, DeviceStore};
use beacon_server::{api, telemetry};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load();
    telemetry::init_telemetry(&config.telemetry)?;

    let pool = storage::init_pool(&config.database_url).await?;
    storage::run_migrations(&pool).await?;

    let provider: Arc<dyn PushProvider> = Arc::new(ExpoPushProvider::new(&config.push));
    let dispatcher =
        PushDispatcher::new(provider, Duration::from_secs(config.push.receipt_delay_secs));
    let devices: Arc<dyn DeviceStore> = Arc::new(PgDeviceStore::new(pool));
    let subscription_service = SubscriptionService::new(devices, dispatcher);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let app = api::app_router(config, subscription_service);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_handler(shutdown_tx);

    tracing::info!(address = %addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut serve_rx = shutdown_rx.clone();
    let server = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            let _ = serve_rx.wait_for(|&s| s).await;
        });

    // A hung in-flight request (e.g. a stuck provider call) must not hold
    // the process open past the configured timeout.
    let mut timeout_rx = shutdown_rx;
    tokio::select! {
        result = server => result?,
        () = async {
            let _ = timeout_rx.wait_for(|&s| s).await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("Timeout waiting for in-flight requests to finish");
        }
    }

    // Deferred receipt checks still pending at this point are dropped.
    tracing::info!("Server stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
