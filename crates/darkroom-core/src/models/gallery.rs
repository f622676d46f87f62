use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sharing state embedded in a gallery record.
///
/// The backend blanks `access_token` on responses served to anonymous
/// recipients; it is populated on owner-facing reads.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sharing {
    #[serde(default)]
    pub sharing_enabled: bool,
    #[serde(default)]
    pub sharing_expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub sharing_url: String,
}

/// Per-gallery processing toggles applied by the backend at upload time.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoOptions {
    #[serde(default)]
    pub downsize: bool,
    #[serde(default)]
    pub watermark: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sharing: Sharing,
    #[serde(default)]
    pub photo_options: PhotoOptions,
}
