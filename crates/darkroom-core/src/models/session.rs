use serde::{Deserialize, Serialize};

/// Credential pair for a photographer session.
///
/// A session is authenticated exactly when an access token is present. A
/// missing refresh token means an expired credential cannot be renewed
/// automatically and the user has to sign in again. The pair is always
/// persisted together; a store must never hold one token without the other
/// half it was issued with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Session {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    pub fn authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}
