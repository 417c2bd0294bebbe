use reqwest::Client;
use tracing::info;

use crate::config::OAuthConfig;
use crate::error::{AdapterError, Result};
use crate::models::BearerCredential;
use crate::services::RetryingHttpClient;

/// OAuth client-credentials exchange against the platform token endpoint.
///
/// Tokens are fetched fresh for every partner-API operation and never cached;
/// there is no expiry tracking.
#[derive(Clone)]
pub struct TokenClient {
    http: Client,
    retry: RetryingHttpClient,
    config: OAuthConfig,
}

impl TokenClient {
    pub fn new(http: Client, retry: RetryingHttpClient, config: OAuthConfig) -> Self {
        Self {
            http,
            retry,
            config,
        }
    }

    /// Issue a single client-credentials POST and parse the bearer token out
    /// of the JSON response body.
    pub async fn fetch_token(&self) -> Result<BearerCredential> {
        let url = format!("{}{}", self.config.url, self.config.token_endpoint);
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.config.scope.as_str()),
        ];

        let response = self.retry.execute(self.http.post(&url).form(&form)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Auth(format!(
                "token endpoint returned {status}"
            )));
        }

        let credential: BearerCredential = response
            .json()
            .await
            .map_err(|e| AdapterError::Auth(format!("token response unparseable: {e}")))?;

        if credential.token.is_empty() {
            return Err(AdapterError::Auth("access_token is empty".into()));
        }

        info!(token_type = %credential.token_type, "bearer credential obtained");
        Ok(credential)
    }
}
