//! Account and session lifecycle.
//!
//! Sign-in success and sign-out are, together with the gateway's refresh,
//! the only operations that mutate the session.

use darkroom_core::models::Session;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::DarkroomClient;

/// Plain-message responses from the auth endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct SignInResponse {
    id_token: String,
    #[allow(dead_code)]
    access_token: String,
    refresh_token: String,
    #[allow(dead_code)]
    expires_in: i64,
}

impl DarkroomClient {
    /// Registers a new photographer account. The account must be verified
    /// before sign-in succeeds.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthMessage, ApiError> {
        self.gateway()
            .post("/auth/signup", &json!({ "email": email, "password": password }))
            .await
    }

    /// Confirms a freshly registered account with the emailed code.
    pub async fn verify_account(&self, email: &str, code: &str) -> Result<AuthMessage, ApiError> {
        self.gateway()
            .post("/auth/verify", &json!({ "email": email, "code": code }))
            .await
    }

    /// Signs in and installs the returned credential pair as the active
    /// session. The id token is what the backend expects as the bearer
    /// credential.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let response: SignInResponse = self
            .gateway()
            .post("/auth/signin", &json!({ "email": email, "password": password }))
            .await?;

        self.gateway()
            .install_session(Session::new(response.id_token, response.refresh_token))
            .await;
        tracing::info!("signed in");
        Ok(())
    }

    /// Clears both tokens; the next request carries no bearer credential.
    pub async fn sign_out(&self) {
        self.gateway().clear_session().await;
        tracing::info!("signed out");
    }

    pub async fn authenticated(&self) -> bool {
        self.gateway().authenticated().await
    }
}
