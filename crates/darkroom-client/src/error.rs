//! Error types for the Darkroom client.

use serde_json::Value;

/// Failures surfaced by the client.
///
/// 401 handling is internal to the gateway: `Auth` and `SessionExpired`
/// only appear once the refresh path is exhausted.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 with no recovery available (no refresh token, or the request was
    /// already replayed once).
    #[error("unauthorized: {message}")]
    Auth { message: String },

    /// Token refresh failed. The session store has been cleared; the caller
    /// must send the user back through sign-in.
    #[error("session expired, sign in again")]
    SessionExpired,

    /// Input rejected before any network call was made.
    #[error(transparent)]
    Validation(#[from] darkroom_core::ValidationError),

    /// Non-401 HTTP failure, normalized to status + message + raw payload.
    #[error("backend error ({status}): {message}")]
    Backend {
        status: u16,
        message: String,
        data: Option<Value>,
    },

    /// Anonymous-path rejection. Deliberately opaque: an expired token, a
    /// revoked share, and an unknown gallery are indistinguishable to the
    /// recipient.
    #[error("access denied")]
    AccessDenied,
}

impl ApiError {
    /// Status code of the underlying HTTP response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Backend { status, .. } => Some(*status),
            ApiError::Auth { .. } => Some(401),
            _ => None,
        }
    }
}
