//! Authenticated request gateway.
//!
//! Every backend call is routed through [`Gateway`]. It attaches the bearer
//! credential, normalizes failures to [`ApiError`], and transparently
//! refreshes expired credentials: a 401 triggers one refresh followed by one
//! replay of the original request.
//!
//! Refresh is single-flight. Concurrent 401 recoveries queue on a mutex;
//! whoever enters first performs the refresh, later entrants observe that
//! the access token already rotated away from the one they failed with and
//! reuse it. At most one refresh call is issued per credential generation,
//! which matters because the refresh token itself is single-use.

use std::time::Duration;

use darkroom_core::models::Session;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::error::ApiError;
use crate::session::SessionStore;

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

pub struct Gateway {
    http: Client,
    base_url: String,
    session: RwLock<Session>,
    store: Box<dyn SessionStore>,
    refresh_flight: Mutex<()>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
}

impl Gateway {
    /// Creates a gateway over `base_url`, seeding the in-memory session from
    /// the store.
    pub fn new(
        base_url: String,
        timeout: Duration,
        store: Box<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        let session = store.load();

        Ok(Gateway {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(session),
            store,
            refresh_flight: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw client for requests that must not carry the bearer credential
    /// (storage POSTs go to a different trust domain).
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn authenticated(&self) -> bool {
        self.session.read().await.authenticated()
    }

    /// Installs a freshly issued credential pair (sign-in success).
    pub(crate) async fn install_session(&self, session: Session) {
        self.replace_session(session).await;
    }

    /// Drops both tokens, in memory and on disk. Subsequent requests carry
    /// no Authorization header.
    pub(crate) async fn clear_session(&self) {
        {
            let mut session = self.session.write().await;
            *session = Session::default();
        }
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear persisted session");
        }
    }

    async fn replace_session(&self, next: Session) {
        {
            let mut session = self.session.write().await;
            *session = next.clone();
        }
        if let Err(err) = self.store.save(&next) {
            tracing::warn!(error = %err, "failed to persist session");
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, None::<&()>, None).await?;
        decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::POST, path, Some(body), None).await?;
        decode(response).await
    }

    /// POST with an `Idempotency-Key` header, present on the replay too.
    pub async fn post_idempotent<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        key: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::POST, path, Some(body), Some(key))
            .await?;
        decode(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::PUT, path, Some(body), None).await?;
        decode(response).await
    }

    /// Body-less PUT that decodes a JSON response (e.g. stop-sharing returns
    /// the updated gallery record).
    pub async fn put_fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(Method::PUT, path, None::<&()>, None).await?;
        decode(response).await
    }

    /// Body-less PUT where only the status matters (e.g. upload confirm).
    pub async fn put_unit(&self, path: &str) -> Result<(), ApiError> {
        let response = self.execute(Method::PUT, path, None::<&()>, None).await?;
        expect_success(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.execute(Method::DELETE, path, None::<&()>, None).await?;
        expect_success(response).await
    }

    /// Sends the request, refreshing and replaying once on a 401.
    async fn execute<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> Result<Response, ApiError> {
        let token = self.session.read().await.access_token.clone();
        let response = self
            .issue(method.clone(), path, body, token.as_deref(), idempotency_key)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let refreshable = self.session.read().await.refresh_token.is_some();
        if !refreshable {
            return Ok(response);
        }

        let fresh = self.refresh(token).await?;
        self.issue(method, path, body, Some(&fresh), idempotency_key)
            .await
    }

    async fn issue<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self.http.request(method, self.build_url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(key) = idempotency_key {
            request = request.header(IDEMPOTENCY_HEADER, key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Exchanges the refresh token for a new credential pair.
    ///
    /// `stale` is the access token the caller held when it received the 401.
    /// Callers queue on `refresh_flight`; once inside, a token that no longer
    /// matches `stale` means another caller already refreshed (or failed and
    /// cleared the session), so the result is shared instead of spending the
    /// single-use refresh token again.
    async fn refresh(&self, stale: Option<String>) -> Result<String, ApiError> {
        let _flight = self.refresh_flight.lock().await;

        let refresh_token = {
            let session = self.session.read().await;
            if session.access_token != stale {
                return match &session.access_token {
                    Some(token) => Ok(token.clone()),
                    None => Err(ApiError::SessionExpired),
                };
            }
            match &session.refresh_token {
                Some(token) => token.clone(),
                None => return Err(ApiError::SessionExpired),
            }
        };

        tracing::debug!("refreshing expired access token");
        let result = self
            .http
            .post(self.build_url("/auth/refresh-token"))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let renewed: RefreshResponse = match result {
            Ok(response) if response.status().is_success() => match response.json().await {
                Ok(renewed) => renewed,
                Err(err) => {
                    tracing::warn!(error = %err, "token refresh returned an unreadable body");
                    self.clear_session().await;
                    return Err(ApiError::SessionExpired);
                }
            },
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "token refresh rejected");
                self.clear_session().await;
                return Err(ApiError::SessionExpired);
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed");
                self.clear_session().await;
                return Err(ApiError::SessionExpired);
            }
        };

        let access_token = renewed.id_token.clone();
        self.replace_session(Session::new(renewed.id_token, renewed.refresh_token))
            .await;
        tracing::debug!("access token refreshed");
        Ok(access_token)
    }
}

/// Decodes a JSON response, normalizing failures.
pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    Err(normalize_failure(response).await)
}

pub(crate) async fn expect_success(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(normalize_failure(response).await)
}

/// Maps a non-2xx response to `{status, message, data}`; 401s that reach
/// this point exhausted the refresh path.
pub(crate) async fn normalize_failure(response: Response) -> ApiError {
    let status = response.status();
    let data: Option<Value> = response.json().await.ok();
    let message = data
        .as_ref()
        .and_then(|v| v.get("error").or_else(|| v.get("message")))
        .and_then(Value::as_str)
        .unwrap_or("request failed")
        .to_string();

    if status == StatusCode::UNAUTHORIZED {
        return ApiError::Auth { message };
    }
    ApiError::Backend {
        status: status.as_u16(),
        message,
        data,
    }
}
