use reqwest::{RequestBuilder, Response};
use tracing::{info, warn};

use crate::config::RetryPolicy;
use crate::error::{AdapterError, Result};

/// HTTP client wrapper that retries non-success responses up to a bounded
/// attempt count.
///
/// Every non-(200/201) status is retried identically up to the cap; there is
/// no 4xx/5xx distinction. When attempts are exhausted the last response is
/// returned as-is and the caller inspects the status itself.
#[derive(Clone)]
pub struct RetryingHttpClient {
    policy: RetryPolicy,
}

impl RetryingHttpClient {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Execute the request, retrying until a 200/201 arrives or attempts run
    /// out. Decrement-then-test semantics: `max_attempts <= 0` still performs
    /// exactly one attempt.
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let mut remaining = self.policy.max_attempts;
        loop {
            remaining -= 1;

            let attempt = builder
                .try_clone()
                .ok_or_else(|| AdapterError::Transport("request body is not cloneable".into()))?;

            match attempt.send().await {
                Ok(response) => {
                    let status = response.status();
                    info!(status = %status, url = %response.url(), "partner request attempt");
                    if status == reqwest::StatusCode::OK
                        || status == reqwest::StatusCode::CREATED
                        || remaining <= 0
                    {
                        return Ok(response);
                    }
                    warn!(status = %status, remaining, "non-success status, retrying");
                }
                Err(err) => {
                    if remaining <= 0 {
                        return Err(AdapterError::Transport(err.to_string()));
                    }
                    warn!(error = %err, remaining, "transport failure, retrying");
                }
            }

            tokio::time::sleep(self.policy.interval()).await;
        }
    }
}
