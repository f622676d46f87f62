//! Anonymous client access.
//!
//! Recipients of a share URL never sign in. The token embedded in the URL is
//! their only credential, presented as a bearer on the `/client` path; the
//! session store is never involved. Every rejection collapses to
//! [`ApiError::AccessDenied`] so a recipient cannot probe whether a share
//! expired, was revoked, or never existed.

use darkroom_core::models::{Gallery, OrderCreated, OrderRequest, Photo};
use darkroom_core::{Config, ValidationError};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;
use crate::gateway::normalize_failure;

/// Read/order handle over one shared gallery.
pub struct ShareAccess {
    http: Client,
    api_url: String,
    gallery_id: String,
    token: String,
}

impl ShareAccess {
    pub fn new(
        config: &Config,
        gallery_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(ShareAccess {
            http,
            api_url: config.api_url.clone(),
            gallery_id: gallery_id.into(),
            token: token.into(),
        })
    }

    /// Builds access from a share URL of the form
    /// `{origin}/galleries/{galleryId}?token={token}`. The origin is the
    /// frontend's; API calls still go to the configured backend.
    pub fn from_share_url(config: &Config, share_url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(share_url)
            .map_err(|err| ValidationError::MalformedShareUrl(err.to_string()))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        let gallery_id = segments
            .iter()
            .position(|segment| *segment == "galleries")
            .and_then(|idx| segments.get(idx + 1))
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                ValidationError::MalformedShareUrl("no gallery id in path".to_string())
            })?
            .to_string();

        let token = url
            .query_pairs()
            .find(|(key, _)| key.as_ref() == "token")
            .map(|(_, value)| value.into_owned())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ValidationError::MalformedShareUrl("missing token".to_string()))?;

        Self::new(config, gallery_id, token)
    }

    pub fn gallery_id(&self) -> &str {
        &self.gallery_id
    }

    /// Fetches the gallery record (owner fields blanked by the backend).
    pub async fn gallery(&self) -> Result<Gallery, ApiError> {
        let response = self
            .http
            .get(format!(
                "{}/api/v1/client/galleries/{}",
                self.api_url, self.gallery_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode_client(response).await
    }

    /// Fetches the shared photo list.
    pub async fn photos(&self) -> Result<Vec<Photo>, ApiError> {
        let response = self
            .http
            .get(format!(
                "{}/api/v1/client/galleries/{}/photos",
                self.api_url, self.gallery_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;
        decode_client(response).await
    }

    /// Submits a selection order. The email and selection are validated
    /// before anything leaves the process.
    pub async fn submit_order(&self, order: &OrderRequest) -> Result<OrderCreated, ApiError> {
        order.validate().map_err(ValidationError::from)?;

        let response = self
            .http
            .post(format!(
                "{}/api/v1/client/galleries/{}",
                self.api_url, self.gallery_id
            ))
            .bearer_auth(&self.token)
            .json(order)
            .send()
            .await?;
        decode_client(response).await
    }
}

/// Success decodes as JSON; 401/403/404 are all presented as the same
/// opaque denial.
async fn decode_client<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            Err(ApiError::AccessDenied)
        }
        _ => Err(normalize_failure(response).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::with_api_url("http://localhost:8080")
    }

    #[test]
    fn parses_share_url() {
        let access = ShareAccess::from_share_url(
            &test_config(),
            "https://proofs.example.com/galleries/6717f1a01fd0c5eb46b5a3fa?token=u8aG_x",
        )
        .unwrap();
        assert_eq!(access.gallery_id(), "6717f1a01fd0c5eb46b5a3fa");
        assert_eq!(access.token, "u8aG_x");
    }

    #[test]
    fn rejects_urls_without_token_or_gallery() {
        let config = test_config();
        assert!(matches!(
            ShareAccess::from_share_url(&config, "https://proofs.example.com/galleries/abc"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            ShareAccess::from_share_url(&config, "https://proofs.example.com/?token=abc"),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            ShareAccess::from_share_url(&config, "not a url"),
            Err(ApiError::Validation(_))
        ));
    }
}
