//! Shared HTTP client for the Darkroom API.
//!
//! [`DarkroomClient`] is the photographer-facing entry point: it owns the
//! authenticated [`Gateway`] and exposes the session lifecycle, the upload
//! pipeline, gallery sharing, and the remaining typed REST surface.
//! Anonymous recipients hold a [`ShareAccess`] instead, which presents a
//! share token and never touches the session store.

mod api;
mod auth;
mod client_access;
mod error;
mod gateway;
mod session;
mod sharing;
mod upload;

use std::sync::Arc;

pub use auth::AuthMessage;
pub use client_access::ShareAccess;
pub use error::ApiError;
pub use gateway::Gateway;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionStoreError};
pub use sharing::SharingManager;
pub use upload::{BatchOutcome, LocalPhoto, UploadOrchestrator, UploadOutcome, UploadStatus};

// Re-export domain types for convenience.
pub use darkroom_core::models;
pub use darkroom_core::{Config, ValidationError};

/// Authenticated client for the photographer-facing API surface.
pub struct DarkroomClient {
    gateway: Arc<Gateway>,
    sharing: SharingManager,
}

impl DarkroomClient {
    pub fn new(config: &Config, store: Box<dyn SessionStore>) -> Result<Self, ApiError> {
        let gateway = Arc::new(Gateway::new(
            config.api_url.clone(),
            config.request_timeout,
            store,
        )?);
        let sharing = SharingManager::new(gateway.clone());
        Ok(DarkroomClient { gateway, sharing })
    }

    /// Client from environment configuration, persisting the session to the
    /// configured on-disk store.
    pub fn from_env() -> Result<Self, ApiError> {
        let config = Config::from_env();
        let store = FileSessionStore::new(config.session_file.clone());
        Self::new(&config, Box::new(store))
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    /// Handle on the multi-file upload pipeline.
    pub fn uploads(&self) -> UploadOrchestrator {
        UploadOrchestrator::new(self.gateway.clone())
    }

    /// Per-gallery sharing state machine.
    pub fn sharing(&self) -> &SharingManager {
        &self.sharing
    }
}
