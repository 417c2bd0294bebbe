use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use tracing::info;

use crate::app_state::AppState;

const SIGNATURE_HEADER: &str = "Elli-Signature";
const ENVIRONMENT_HEADER: &str = "Elli-Environment";

/// POST /api/webhook
///
/// Always answers `200 OK` with an empty body: webhook delivery semantics are
/// fire-and-forget, and the sender never observes pipeline outcomes. The
/// pipeline task spawned by the dispatcher is intentionally detached here.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    info!("POST /api/webhook received");

    // Webhook delivery tolerates empty payloads as no-ops.
    if body.is_empty() {
        return StatusCode::OK;
    }

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let environment = headers
        .get(ENVIRONMENT_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    info!(environment, "webhook headers read");

    let _ = state.dispatcher.accept(&body, signature);

    StatusCode::OK
}
