use serde::{Deserialize, Serialize};

/// A photo record as served by the backend.
///
/// `url` and `thumbnail_url` are presigned and short-lived; treat them as
/// display-only, not as stable identifiers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub original_filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: String,
}
