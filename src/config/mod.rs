use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub webhook: WebhookConfig,
    pub oauth: OAuthConfig,
    pub partner_api: PartnerApiConfig,
    pub retry: RetryPolicy,
    /// Root directory where repackaged loan archives are written.
    pub package_root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Shared secret used to verify the Elli-Signature header.
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub url: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerApiConfig {
    pub host: String,
    /// Request URI template; `{{transactionId}}` is substituted per run.
    pub request_uri: String,
    /// Response URI template; `{{transactionId}}` is substituted per run.
    pub response_uri: String,
}

/// Bounded retry configuration for outbound partner calls.
///
/// Immutable after startup; every retrying client receives it by value at
/// construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: i32,
    pub interval_millis: u64,
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            interval_millis: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            webhook: WebhookConfig {
                secret: env::var("WEBHOOK_SECRET").map_err(|_| {
                    anyhow::anyhow!("WEBHOOK_SECRET environment variable is required")
                })?,
            },
            oauth: OAuthConfig {
                url: env::var("OAUTH_URL")
                    .map_err(|_| anyhow::anyhow!("OAUTH_URL environment variable is required"))?,
                token_endpoint: env::var("OAUTH_TOKEN_ENDPOINT")
                    .unwrap_or_else(|_| "/oauth2/v1/token".to_string()),
                client_id: env::var("OAUTH_CLIENT_ID").map_err(|_| {
                    anyhow::anyhow!("OAUTH_CLIENT_ID environment variable is required")
                })?,
                client_secret: env::var("OAUTH_CLIENT_SECRET").map_err(|_| {
                    anyhow::anyhow!("OAUTH_CLIENT_SECRET environment variable is required")
                })?,
                scope: env::var("OAUTH_SCOPE").unwrap_or_else(|_| "pc pcapi".to_string()),
            },
            partner_api: PartnerApiConfig {
                host: env::var("PARTNER_API_HOST").map_err(|_| {
                    anyhow::anyhow!("PARTNER_API_HOST environment variable is required")
                })?,
                request_uri: env::var("PARTNER_REQUEST_URI").unwrap_or_else(|_| {
                    "/partner/v1/transactions/{{transactionId}}/request".to_string()
                }),
                response_uri: env::var("PARTNER_RESPONSE_URI").unwrap_or_else(|_| {
                    "/partner/v1/transactions/{{transactionId}}/response".to_string()
                }),
            },
            retry: RetryPolicy {
                max_attempts: env::var("MAX_RETRY_ATTEMPTS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .unwrap_or(3),
                interval_millis: env::var("RETRY_INTERVAL_MILLIS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
            },
            package_root: env::var("PACKAGE_ROOT")
                .map_err(|_| anyhow::anyhow!("PACKAGE_ROOT environment variable is required"))?
                .into(),
        })
    }
}
