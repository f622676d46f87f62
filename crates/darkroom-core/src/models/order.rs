use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPhoto {
    pub photo_id: String,
}

/// An order placed by a client against a shared gallery.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub gallery_id: String,
    pub client_email: String,
    #[serde(default)]
    pub comment: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub photos: Vec<OrderPhoto>,
}

/// Order submission on the anonymous client path. Validated before the
/// request leaves the process.
#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(email(message = "client email is not a valid address"))]
    pub client_email: String,
    pub comment: String,
    #[validate(length(min = 1, message = "select at least one photo"))]
    pub photo_ids: Vec<String>,
}

/// Response to a successful order submission.
#[derive(Clone, Debug, Deserialize)]
pub struct OrderCreated {
    pub id: String,
}
