//! Gallery sharing control.
//!
//! share/reschedule/stop are transitions of one per-gallery state machine
//! (`Disabled -> Shared -> Shared -> Disabled`), not independent calls: a
//! reschedule is never sent for a gallery with no active share, and a share
//! against an already-active gallery degrades to a reschedule of the same
//! token.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use darkroom_core::models::{Gallery, ShareGalleryRequest, ShareLink};
use darkroom_core::validation::validate_sharing_expiry;
use darkroom_core::ValidationError;
use tokio::sync::Mutex;

use crate::error::ApiError;
use crate::gateway::Gateway;

enum ShareState {
    Disabled,
    Shared(ShareLink),
}

pub struct SharingManager {
    gateway: Arc<Gateway>,
    states: Mutex<HashMap<String, ShareState>>,
}

impl SharingManager {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        SharingManager {
            gateway,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds the per-gallery state from a fetched record, so a fresh process
    /// sees an already-active share as active.
    pub async fn hydrate_from_gallery(&self, gallery: &Gallery) {
        let state = match (&gallery.sharing.sharing_expiry_date, gallery.sharing.sharing_enabled) {
            (Some(expiry), true) if !gallery.sharing.access_token.is_empty() => {
                ShareState::Shared(ShareLink {
                    gallery_id: gallery.id.clone(),
                    access_token: gallery.sharing.access_token.clone(),
                    sharing_expiry: *expiry,
                    share_url: gallery.sharing.sharing_url.clone(),
                })
            }
            _ => ShareState::Disabled,
        };
        self.states.lock().await.insert(gallery.id.clone(), state);
    }

    /// Currently known link for a gallery, if sharing is active.
    pub async fn active_link(&self, gallery_id: &str) -> Option<ShareLink> {
        match self.states.lock().await.get(gallery_id) {
            Some(ShareState::Shared(link)) => Some(link.clone()),
            _ => None,
        }
    }

    /// Enables sharing until `expiry`. When the gallery is already shared
    /// the call reschedules instead, preserving the issued token.
    pub async fn share(
        &self,
        gallery_id: &str,
        expiry: DateTime<Utc>,
    ) -> Result<ShareLink, ApiError> {
        validate_sharing_expiry(expiry, Utc::now())?;
        let request = ShareGalleryRequest {
            sharing_expiry: expiry,
        };

        let mut states = self.states.lock().await;
        let active = matches!(states.get(gallery_id), Some(ShareState::Shared(_)));
        let link: ShareLink = if active {
            tracing::debug!(gallery_id, "share requested while active, rescheduling");
            self.gateway
                .put(
                    &format!("/api/v1/galleries/{}/sharing/reschedule", gallery_id),
                    &request,
                )
                .await?
        } else {
            self.gateway
                .post(
                    &format!("/api/v1/galleries/{}/sharing/share", gallery_id),
                    &request,
                )
                .await?
        };

        tracing::info!(gallery_id, expiry = %link.sharing_expiry, "gallery shared");
        states.insert(gallery_id.to_string(), ShareState::Shared(link.clone()));
        Ok(link)
    }

    /// Moves the expiry of an active share; the access token is unchanged.
    pub async fn reschedule(
        &self,
        gallery_id: &str,
        expiry: DateTime<Utc>,
    ) -> Result<ShareLink, ApiError> {
        validate_sharing_expiry(expiry, Utc::now())?;

        let mut states = self.states.lock().await;
        if !matches!(states.get(gallery_id), Some(ShareState::Shared(_))) {
            return Err(ValidationError::SharingInactive(gallery_id.to_string()).into());
        }

        let link: ShareLink = self
            .gateway
            .put(
                &format!("/api/v1/galleries/{}/sharing/reschedule", gallery_id),
                &ShareGalleryRequest {
                    sharing_expiry: expiry,
                },
            )
            .await?;

        tracing::info!(gallery_id, expiry = %link.sharing_expiry, "sharing rescheduled");
        states.insert(gallery_id.to_string(), ShareState::Shared(link.clone()));
        Ok(link)
    }

    /// Disables sharing. The previous token stops working immediately.
    pub async fn stop(&self, gallery_id: &str) -> Result<Gallery, ApiError> {
        let mut states = self.states.lock().await;
        if !matches!(states.get(gallery_id), Some(ShareState::Shared(_))) {
            return Err(ValidationError::SharingInactive(gallery_id.to_string()).into());
        }

        let gallery: Gallery = self
            .gateway
            .put_fetch(&format!("/api/v1/galleries/{}/sharing/stop", gallery_id))
            .await?;

        tracing::info!(gallery_id, "sharing stopped");
        states.insert(gallery_id.to_string(), ShareState::Disabled);
        Ok(gallery)
    }
}
