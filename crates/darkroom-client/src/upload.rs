//! Multi-file upload pipeline.
//!
//! One grant batch per call, then an independent state machine per file
//! (`pending -> uploading -> uploaded -> confirmed`), so a single bad file
//! never drags the rest of the batch down. The storage POST targets a
//! different trust domain than the API and must not carry the bearer token.

use std::io;
use std::path::Path;
use std::sync::Arc;

use darkroom_core::models::{UploadGrant, UploadRequest};
use darkroom_core::sniff::{sniff, SNIFF_LEN};
use darkroom_core::validation::validate_original_filename;
use darkroom_core::ValidationError;
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gateway::Gateway;

/// Storage POSTs in flight at once. Files queue in input order behind the
/// available slots, which also gives cancellation a window to take effect
/// before a grant is consumed.
const MAX_CONCURRENT_UPLOADS: usize = 4;

/// A file queued for upload.
///
/// Owns its buffered bytes so that dropping the batch releases every local
/// resource, however the upload ended.
#[derive(Clone, Debug)]
pub struct LocalPhoto {
    pub original_filename: String,
    /// Caller-declared MIME type; the sniffer's fallback when the leading
    /// bytes match no known signature.
    pub declared_type: String,
    pub data: Vec<u8>,
}

impl LocalPhoto {
    pub fn from_bytes(
        original_filename: impl Into<String>,
        declared_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        LocalPhoto {
            original_filename: original_filename.into(),
            declared_type: declared_type.into(),
            data,
        }
    }

    /// Reads a file from disk, deriving the declared type from the
    /// extension the way a browser would populate `file.type`.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let original_filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("photo")
            .to_string();

        Ok(LocalPhoto {
            original_filename,
            declared_type: declared_type_for(path),
            data,
        })
    }
}

fn declared_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Terminal state of one file in a batch.
#[derive(Debug)]
pub enum UploadStatus {
    /// Stored and confirmed; the backend record is live.
    Confirmed,
    /// Bytes landed in object storage but the confirm call failed; the
    /// backend still sees the photo as pending.
    UploadedUnconfirmed(ApiError),
    /// Failed before or at the storage write; nothing durable exists.
    Failed(ApiError),
    /// Cancelled before its storage POST; the grant was abandoned unused.
    Aborted,
}

impl UploadStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, UploadStatus::Confirmed)
    }
}

/// Outcome for one input file. Outcomes come back in input order.
#[derive(Debug)]
pub struct UploadOutcome {
    pub original_filename: String,
    /// Backend id of the placeholder photo record tied to this file's grant.
    pub photo_id: String,
    pub status: UploadStatus,
}

/// Aggregated result of [`UploadOrchestrator::upload_batch`].
#[derive(Debug)]
pub struct BatchOutcome {
    pub outcomes: Vec<UploadOutcome>,
}

impl BatchOutcome {
    pub fn fully_confirmed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_confirmed())
    }

    /// Outcomes that did not confirm, for targeted retry.
    pub fn unconfirmed(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_confirmed())
    }
}

/// Drives batches of local files into a gallery.
pub struct UploadOrchestrator {
    gateway: Arc<Gateway>,
    slots: Semaphore,
}

impl UploadOrchestrator {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        UploadOrchestrator {
            gateway,
            slots: Semaphore::new(MAX_CONCURRENT_UPLOADS),
        }
    }

    /// Uploads `photos` into `gallery_id` without external cancellation.
    pub async fn upload_all(
        &self,
        gallery_id: &str,
        photos: Vec<LocalPhoto>,
    ) -> Result<BatchOutcome, ApiError> {
        self.upload_batch(gallery_id, photos, CancellationToken::new())
            .await
    }

    /// Uploads `photos` into `gallery_id`.
    ///
    /// Issues one grant request for the whole batch (the `Idempotency-Key`
    /// header lets the backend dedupe placeholder records when the call is
    /// retried after a lost response), then drives every file independently.
    /// Validation and the grant call itself are the only ways this returns
    /// `Err`; anything after that lands in the per-file outcomes.
    pub async fn upload_batch(
        &self,
        gallery_id: &str,
        photos: Vec<LocalPhoto>,
        cancel: CancellationToken,
    ) -> Result<BatchOutcome, ApiError> {
        if photos.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        for photo in &photos {
            validate_original_filename(&photo.original_filename)?;
        }

        let requests: Vec<UploadRequest> = photos
            .iter()
            .map(|photo| UploadRequest {
                original_filename: photo.original_filename.clone(),
            })
            .collect();

        tracing::info!(gallery_id, files = photos.len(), "requesting upload grants");
        let batch_key = Uuid::new_v4().to_string();
        let grants: Vec<UploadGrant> = self
            .gateway
            .post_idempotent(
                &format!("/api/v1/galleries/{}/photos", gallery_id),
                &requests,
                &batch_key,
            )
            .await?;

        if grants.len() != photos.len() {
            return Err(ApiError::Backend {
                status: 200,
                message: format!(
                    "backend issued {} grants for {} files",
                    grants.len(),
                    photos.len()
                ),
                data: None,
            });
        }

        let tasks = photos
            .into_iter()
            .zip(grants)
            .map(|(photo, grant)| self.process_one(photo, grant, cancel.clone()));
        let outcomes = join_all(tasks).await;

        let confirmed = outcomes.iter().filter(|o| o.status.is_confirmed()).count();
        tracing::info!(
            gallery_id,
            confirmed,
            total = outcomes.len(),
            "upload batch finished"
        );
        Ok(BatchOutcome { outcomes })
    }

    /// Drives one file to a terminal state. The grant is consumed by the
    /// first storage POST attempt and never replayed; a failure after that
    /// point leaves the placeholder pending server-side.
    async fn process_one(
        &self,
        photo: LocalPhoto,
        grant: UploadGrant,
        cancel: CancellationToken,
    ) -> UploadOutcome {
        let original_filename = photo.original_filename.clone();
        let photo_id = grant.id.clone();
        let outcome = |status| UploadOutcome {
            original_filename: original_filename.clone(),
            photo_id: photo_id.clone(),
            status,
        };

        let _slot = match self.slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => return outcome(UploadStatus::Aborted),
        };
        if cancel.is_cancelled() {
            tracing::debug!(photo_id = %grant.id, "upload aborted before storage write");
            return outcome(UploadStatus::Aborted);
        }

        let head = &photo.data[..photo.data.len().min(SNIFF_LEN)];
        let content_type = sniff(head, &photo.declared_type);

        if let Err(err) = self.push_to_storage(photo, &grant, &content_type).await {
            tracing::warn!(photo_id = %grant.id, error = %err, "storage upload failed");
            return outcome(UploadStatus::Failed(err));
        }

        match self
            .gateway
            .put_unit(&format!("/api/v1/photos/{}/confirm", grant.id))
            .await
        {
            Ok(()) => {
                tracing::debug!(photo_id = %grant.id, "upload confirmed");
                outcome(UploadStatus::Confirmed)
            }
            Err(err) => {
                tracing::warn!(photo_id = %grant.id, error = %err, "confirm failed");
                outcome(UploadStatus::UploadedUnconfirmed(err))
            }
        }
    }

    /// POSTs the multipart form to the grant's presigned URL: every grant
    /// field, then the detected content type, then the bytes. No bearer
    /// credential: object storage is not the backend.
    async fn push_to_storage(
        &self,
        photo: LocalPhoto,
        grant: &UploadGrant,
        content_type: &str,
    ) -> Result<(), ApiError> {
        let mut form = Form::new();
        for (key, value) in &grant.presigned_post_request.values {
            form = form.text(key.clone(), value.clone());
        }
        form = form.text("Content-Type", content_type.to_string());
        form = form.part(
            "file",
            Part::bytes(photo.data).file_name(photo.original_filename),
        );

        let response = self
            .gateway
            .http()
            .post(&grant.presigned_post_request.url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Storage errors are XML, not the backend's JSON envelope.
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: if body.is_empty() {
                    "storage upload rejected".to_string()
                } else {
                    body
                },
                data: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_follows_extension() {
        assert_eq!(declared_type_for(Path::new("a/b/shot.JPG")), "image/jpeg");
        assert_eq!(declared_type_for(Path::new("shot.png")), "image/png");
        assert_eq!(declared_type_for(Path::new("scan.raw")), "application/octet-stream");
        assert_eq!(declared_type_for(Path::new("noext")), "application/octet-stream");
    }
}
