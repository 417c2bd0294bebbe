use tracing::{error, info, warn};

use crate::models::{Order, OrderStatusResponse, PartnerRequest, WebhookNotification};
use crate::services::{ArchiveTransformer, PartnerApiClient};

/// Terminal result of one pipeline run. Surfaced to tests through the join
/// handle; the webhook caller never observes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Event type other than CreateRequest; accepted but ignored.
    Ignored,
    /// `meta.resourceId` empty or missing; no partner calls made.
    MissingTransactionId,
    /// GetRequest yielded nothing; run ends without a status submission.
    NoRequestData,
    /// Package materialized; Delivered status submitted.
    Delivered { submitted: bool },
    /// Download or transform failed; Not Delivered status submitted.
    NotDelivered { submitted: bool },
}

/// Per-notification orchestrator.
///
/// All steps within a run are sequential: request fetch, file download,
/// archive transform, status submission. Stage failures short-circuit to the
/// status build so a best-effort "Not Delivered" report still goes out
/// whenever request data was obtainable.
#[derive(Clone)]
pub struct RequestPipeline {
    partner: PartnerApiClient,
    transformer: ArchiveTransformer,
}

impl RequestPipeline {
    pub fn new(partner: PartnerApiClient, transformer: ArchiveTransformer) -> Self {
        Self {
            partner,
            transformer,
        }
    }

    pub async fn run(&self, notification: WebhookNotification) -> PipelineOutcome {
        if !notification.is_create_request() {
            info!(
                event_type = notification.event_type.as_deref().unwrap_or(""),
                "event type does not trigger processing"
            );
            return PipelineOutcome::Ignored;
        }

        let transaction_id = notification.transaction_id().to_string();
        if transaction_id.is_empty() {
            error!("transaction id is empty");
            return PipelineOutcome::MissingTransactionId;
        }
        info!(%transaction_id, "processing CreateRequest notification");

        let Some(request_data) = self.partner.get_request(&transaction_id).await else {
            error!(%transaction_id, "GetRequest data is null, run ends");
            return PipelineOutcome::NoRequestData;
        };

        let delivered = self.materialize_package(&request_data, &transaction_id).await;

        let order = if delivered {
            Order::delivered(request_data.first_order_id())
        } else {
            Order::not_delivered(request_data.first_order_id())
        };
        let response = OrderStatusResponse {
            orders: vec![order],
        };

        let submitted = self.partner.create_response(&response, &transaction_id).await;
        if !submitted {
            warn!(%transaction_id, "create response failed");
        }

        if delivered {
            PipelineOutcome::Delivered { submitted }
        } else {
            PipelineOutcome::NotDelivered { submitted }
        }
    }

    /// Try attachments in order until one downloads and repackages cleanly.
    async fn materialize_package(&self, request: &PartnerRequest, transaction_id: &str) -> bool {
        let Some(attachments) = request
            .product
            .as_ref()
            .and_then(|p| p.attachments.as_ref())
        else {
            warn!(%transaction_id, "attachment node is empty");
            return false;
        };

        for attachment in attachments {
            let Some((bytes, content_type)) = self.partner.get_file_content(&attachment.uri).await
            else {
                warn!(uri = %attachment.uri, "file content is empty");
                continue;
            };

            let transformer = self.transformer.clone();
            let source_url = attachment.uri.clone();
            let credentials = request.credentials.clone();
            let result = tokio::task::spawn_blocking(move || {
                transformer.materialize(&bytes, &content_type, &source_url, credentials.as_ref())
            })
            .await;

            match result {
                Ok(Ok(path)) => {
                    info!(path = %path.display(), "file copied to partner location");
                    return true;
                }
                Ok(Err(err)) => {
                    error!(uri = %attachment.uri, error = %err, "archive transform failed");
                }
                Err(err) => {
                    error!(uri = %attachment.uri, error = %err, "archive task panicked");
                }
            }
        }
        false
    }
}
