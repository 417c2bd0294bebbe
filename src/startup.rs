//! Application startup and initialization logic.

use anyhow::Result;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::config::Config;
use crate::services::{
    ArchiveTransformer, PartnerApiClient, RequestPipeline, RetryingHttpClient, TokenClient,
    WebhookDispatcher,
};

/// Initialize application services and create the AppState.
pub fn initialize_app(config: &Config) -> Result<AppState> {
    // Single HTTP client shared by the token and partner API clients.
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
    info!("HTTP client initialized");

    let retry_client = RetryingHttpClient::new(config.retry);
    info!(
        max_attempts = config.retry.max_attempts,
        interval_millis = config.retry.interval_millis,
        "Retry client initialized"
    );

    let token_client = TokenClient::new(
        http_client.clone(),
        retry_client.clone(),
        config.oauth.clone(),
    );
    info!("Token client initialized");

    let partner_api = PartnerApiClient::new(
        http_client,
        retry_client,
        token_client,
        config.partner_api.clone(),
    );
    info!("Partner API client initialized");

    let transformer = ArchiveTransformer::new(config.package_root.clone());
    info!(
        package_root = %config.package_root.display(),
        "Archive transformer initialized"
    );

    let pipeline = RequestPipeline::new(partner_api, transformer);
    let dispatcher = WebhookDispatcher::new(config.webhook.secret.clone(), pipeline);
    info!("Webhook dispatcher initialized");

    Ok(AppState {
        config: config.clone(),
        dispatcher,
    })
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
