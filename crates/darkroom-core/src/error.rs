//! Error types module
//!
//! Input violations are caught client-side, before any network call is made.
//! Network-level failures live in `darkroom-client`, which wraps this type.

use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("sharing expiry {expiry} is not in the future")]
    ExpiryNotInFuture { expiry: DateTime<Utc> },

    #[error("sharing expiry {expiry} is past the allowed horizon {horizon}")]
    ExpiryTooFar {
        expiry: DateTime<Utc>,
        horizon: DateTime<Utc>,
    },

    #[error("upload batch is empty")]
    EmptyBatch,

    #[error("original filename is empty")]
    EmptyFilename,

    #[error("gallery {0} has no active share")]
    SharingInactive(String),

    #[error("share URL is malformed: {0}")]
    MalformedShareUrl(String),

    #[error("invalid request payload: {0}")]
    Payload(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        ValidationError::Payload(err.to_string())
    }
}
