use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::PartnerApiConfig;
use crate::error::AdapterError;
use crate::models::{BearerCredential, OrderStatusResponse, PartnerRequest};
use crate::services::{RetryingHttpClient, TokenClient};

const TRANSACTION_ID_PLACEHOLDER: &str = "{{transactionId}}";

/// Domain operations against the partner API.
///
/// Each operation obtains a fresh bearer credential first and aborts with an
/// empty result when token acquisition fails. Failures are logged here and
/// surfaced to the pipeline as `None`/`false`, never as a crash.
#[derive(Clone)]
pub struct PartnerApiClient {
    http: Client,
    retry: RetryingHttpClient,
    tokens: TokenClient,
    config: PartnerApiConfig,
}

impl PartnerApiClient {
    pub fn new(
        http: Client,
        retry: RetryingHttpClient,
        tokens: TokenClient,
        config: PartnerApiConfig,
    ) -> Self {
        Self {
            http,
            retry,
            tokens,
            config,
        }
    }

    /// Fetch the document package request for a transaction. Any non-200
    /// status or transport failure yields `None`.
    pub async fn get_request(&self, transaction_id: &str) -> Option<PartnerRequest> {
        let credential = self.acquire_token("GetRequest").await?;

        let uri = self
            .config
            .request_uri
            .replace(TRANSACTION_ID_PLACEHOLDER, transaction_id);
        let url = format!("{}{}", self.config.host, uri);

        let response = match self
            .retry
            .execute(self.http.get(&url).bearer_auth(&credential.token))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(%transaction_id, error = %err, "GetRequest transport failure");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            warn!(
                %transaction_id,
                status = %response.status(),
                "GetRequest returned non-OK status"
            );
            return None;
        }

        match response.json::<PartnerRequest>().await {
            Ok(request) => {
                info!(%transaction_id, "GetRequest data retrieved");
                Some(request)
            }
            Err(err) => {
                error!(%transaction_id, error = %err, "GetRequest body unparseable");
                None
            }
        }
    }

    /// Download the package bytes from the media server. The bearer token
    /// gates the call but the media URL itself is pre-authorized, so no
    /// Authorization header is attached.
    pub async fn get_file_content(&self, file_url: &str) -> Option<(Vec<u8>, String)> {
        self.acquire_token("GetFileContent").await?;

        let response = match self.retry.execute(self.http.get(file_url)).await {
            Ok(response) => response,
            Err(err) => {
                error!(%file_url, error = %err, "file download transport failure");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(%file_url, status = %response.status(), "file download returned non-success");
            return None;
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match response.bytes().await {
            Ok(bytes) => Some((bytes.to_vec(), content_type)),
            Err(err) => {
                error!(%file_url, error = %err, "file download body read failed");
                None
            }
        }
    }

    /// Submit the order status report. Returns true iff the final status
    /// is 201.
    pub async fn create_response(
        &self,
        response: &OrderStatusResponse,
        transaction_id: &str,
    ) -> bool {
        let Some(credential) = self.acquire_token("CreateResponse").await else {
            return false;
        };

        let uri = self
            .config
            .response_uri
            .replace(TRANSACTION_ID_PLACEHOLDER, transaction_id);
        let url = format!("{}{}", self.config.host, uri);

        let result = self
            .retry
            .execute(
                self.http
                    .post(&url)
                    .bearer_auth(&credential.token)
                    .json(response),
            )
            .await;

        match result {
            Ok(http_response) => {
                let status = http_response.status();
                if status == reqwest::StatusCode::CREATED {
                    info!(%transaction_id, "CreateResponse accepted");
                    true
                } else {
                    warn!(%transaction_id, status = %status, "CreateResponse rejected");
                    false
                }
            }
            Err(err) => {
                error!(%transaction_id, error = %err, "CreateResponse transport failure");
                false
            }
        }
    }

    async fn acquire_token(&self, operation: &str) -> Option<BearerCredential> {
        match self.tokens.fetch_token().await {
            Ok(credential) => Some(credential),
            Err(AdapterError::Auth(reason)) => {
                error!(operation, %reason, "token acquisition failed, aborting");
                None
            }
            Err(err) => {
                error!(operation, error = %err, "token acquisition failed, aborting");
                None
            }
        }
    }
}
