// Webhook-processing pipeline services.
// Signature verification, partner API orchestration, archive transformation.

pub mod archive;
pub mod dispatcher;
pub mod http_retry;
pub mod partner_api;
pub mod pipeline;
pub mod token_client;

pub use archive::ArchiveTransformer;
pub use dispatcher::WebhookDispatcher;
pub use http_retry::RetryingHttpClient;
pub use partner_api::PartnerApiClient;
pub use pipeline::{PipelineOutcome, RequestPipeline};
pub use token_client::TokenClient;
