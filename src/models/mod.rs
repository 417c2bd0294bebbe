// Wire models for the webhook and partner API surfaces.

pub mod partner;
pub mod webhook;

pub use partner::{
    Attachment, BearerCredential, Order, OrderStatusResponse, PartnerRequest, Product,
    ProductOptions, SubmissionData, DELIVERED_MESSAGE, NOT_DELIVERED_MESSAGE, STATUS_DELIVERED,
    STATUS_NOT_DELIVERED,
};
pub use webhook::{Meta, WebhookNotification};
