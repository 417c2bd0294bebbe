use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const STATUS_DELIVERED: &str = "Delivered";
pub const STATUS_NOT_DELIVERED: &str = "Not Delivered";
pub const DELIVERED_MESSAGE: &str = "The loan package has been delivered";
pub const NOT_DELIVERED_MESSAGE: &str = "Unable to download loan package";

/// Short-lived OAuth client-credentials token.
///
/// Fetched fresh per partner-API operation and discarded after use. Never
/// logged in full.
#[derive(Debug, Clone, Deserialize)]
pub struct BearerCredential {
    #[serde(rename = "access_token")]
    pub token: String,
    #[serde(rename = "token_type")]
    pub token_type: String,
}

/// Document package request as returned by the partner GetRequest call.
/// Retrieved once per transaction id; read-only downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerRequest {
    #[serde(default)]
    pub product: Option<Product>,
    /// Opaque credentials object passed through to the submission metadata
    /// file untouched.
    #[serde(default)]
    pub credentials: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    pub options: Option<ProductOptions>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptions {
    /// Investor order list. The platform delivers this either as a JSON
    /// array or as a string containing JSON; both forms are accepted.
    #[serde(default)]
    pub investor_options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub uri: String,
}

impl PartnerRequest {
    /// First `OrderId` from the embedded `investorOptions` array, or `None`
    /// when the array is absent, empty, or unparseable.
    pub fn first_order_id(&self) -> Option<String> {
        let raw = self
            .product
            .as_ref()?
            .options
            .as_ref()?
            .investor_options
            .as_ref()?;

        let parsed;
        let array = match raw {
            Value::Array(items) => items,
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text).ok()?;
                match &parsed {
                    Value::Array(_) => parsed.as_array()?,
                    _ => return None,
                }
            }
            _ => return None,
        };

        array
            .first()?
            .get("OrderId")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Outbound order status report, submitted exactly once per run.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub order_date_time: String,
    pub order_status: String,
    pub message: String,
}

impl Order {
    pub fn delivered(id: Option<String>) -> Self {
        Self {
            id,
            order_date_time: chrono::Utc::now().to_rfc3339(),
            order_status: STATUS_DELIVERED.to_string(),
            message: DELIVERED_MESSAGE.to_string(),
        }
    }

    pub fn not_delivered(id: Option<String>) -> Self {
        Self {
            id,
            order_date_time: chrono::Utc::now().to_rfc3339(),
            order_status: STATUS_NOT_DELIVERED.to_string(),
            message: NOT_DELIVERED_MESSAGE.to_string(),
        }
    }
}

/// Body of the `__SubmissionData.txt` companion file written into the
/// repackaged archive.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Value>,
}
