use serde::{Deserialize, Serialize};

/// Inbound webhook notification from the document-exchange platform.
///
/// Parsed from the raw body only after the signature has been verified.
/// Immutable and scoped to a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNotification {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub event_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub resource_id: Option<String>,
}

impl WebhookNotification {
    /// Transaction id correlating this notification to a retrievable
    /// document package. Empty when `meta` or `resourceId` is absent.
    pub fn transaction_id(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|m| m.resource_id.as_deref())
            .unwrap_or("")
    }

    /// Only `CreateRequest` events trigger processing; the comparison is
    /// case-insensitive, matching the platform's delivery contract.
    pub fn is_create_request(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("CreateRequest"))
    }
}
