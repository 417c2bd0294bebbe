use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tokio::task::JoinHandle;
use tracing::{info, warn, Instrument};

use crate::models::WebhookNotification;
use crate::services::{PipelineOutcome, RequestPipeline};

type HmacSha256 = Hmac<Sha256>;

/// Verifies inbound webhook signatures and schedules pipeline runs.
///
/// Exactly one task is scheduled per valid notification; the caller gets the
/// join handle so tests can await completion deterministically, while the
/// HTTP handler simply drops it (fire-and-forget contract).
#[derive(Clone)]
pub struct WebhookDispatcher {
    secret: String,
    pipeline: RequestPipeline,
}

impl WebhookDispatcher {
    pub fn new(secret: String, pipeline: RequestPipeline) -> Self {
        Self { secret, pipeline }
    }

    /// Compute the expected notification token for a payload:
    /// base64(HMAC-SHA256(secret, payload)).
    pub fn notification_token(secret: &[u8], payload: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
        mac.update(payload);
        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Signature header is valid iff it equals the computed token under
    /// case-insensitive ordinal comparison.
    pub fn signature_matches(secret: &[u8], raw_body: &[u8], signature_header: &str) -> bool {
        let expected = Self::notification_token(secret, raw_body);
        signature_header.eq_ignore_ascii_case(&expected)
    }

    pub fn verify_signature(&self, raw_body: &[u8], signature_header: &str) -> bool {
        Self::signature_matches(self.secret.as_bytes(), raw_body, signature_header)
    }

    /// Verify and schedule. Returns the spawned pipeline task for a valid,
    /// parseable notification; `None` otherwise (logged, never retried).
    pub fn accept(
        &self,
        raw_body: &[u8],
        signature_header: &str,
    ) -> Option<JoinHandle<PipelineOutcome>> {
        if !self.verify_signature(raw_body, signature_header) {
            warn!("webhook token is invalid");
            return None;
        }

        let notification: WebhookNotification = match serde_json::from_slice(raw_body) {
            Ok(notification) => notification,
            Err(err) => {
                warn!(error = %err, "webhook payload is malformed");
                return None;
            }
        };

        info!(
            event_id = notification.event_id.as_deref().unwrap_or(""),
            event_type = notification.event_type.as_deref().unwrap_or(""),
            "webhook notification accepted"
        );

        let pipeline = self.pipeline.clone();
        let span = tracing::info_span!("pipeline_run", run_id = %uuid::Uuid::new_v4());
        Some(tokio::spawn(
            async move { pipeline.run(notification).await }.instrument(span),
        ))
    }
}
