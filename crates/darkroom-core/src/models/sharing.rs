use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body for the share and reschedule calls.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareGalleryRequest {
    pub sharing_expiry: DateTime<Utc>,
}

/// An active share issued for a gallery.
///
/// `access_token` is the bearer credential anonymous recipients present;
/// a reschedule keeps it, a stop invalidates it immediately.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub gallery_id: String,
    pub access_token: String,
    pub sharing_expiry: DateTime<Utc>,
    pub share_url: String,
}
