use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Error taxonomy for the webhook-processing pipeline.
///
/// Every pipeline stage catches and logs its own failures; none of these
/// variants ever crosses the webhook HTTP boundary. The webhook sender always
/// receives `200 OK` regardless of pipeline outcome.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Inbound signature header did not match the computed HMAC.
    #[error("webhook signature is invalid")]
    Signature,

    /// OAuth token exchange failed; the run aborts before any partner call.
    #[error("token exchange failed: {0}")]
    Auth(String),

    /// All retries exhausted without a usable transport-level response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-ZIP content, corrupt archive, or filesystem failure during
    /// extraction or repackaging.
    #[error("archive error: {0}")]
    Archive(String),

    /// Malformed or missing partner request fields.
    #[error("data error: {0}")]
    Data(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        AdapterError::Archive(err.to_string())
    }
}

impl From<zip::result::ZipError> for AdapterError {
    fn from(err: zip::result::ZipError) -> Self {
        AdapterError::Archive(err.to_string())
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Data(err.to_string())
    }
}
