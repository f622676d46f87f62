use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One entry in a grant-request batch. The batch is submitted in input
/// order and the backend answers positionally.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub original_filename: String,
}

/// Presigned POST target issued with each grant. The field casing is the
/// backend's, which passes the storage SDK's struct through verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresignedPostRequest {
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Values")]
    pub values: HashMap<String, String>,
}

/// One-time authorization to push a single file to object storage.
///
/// Each grant is tied to a placeholder photo record already created in a
/// pending state; it is consumed by its first storage POST attempt and must
/// never be replayed, successful or not.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadGrant {
    pub id: String,
    pub original_filename: String,
    pub presigned_post_request: PresignedPostRequest,
}
