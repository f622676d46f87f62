//! Typed pass-through methods for the remaining REST surface.
//!
//! Thin wrappers with no invariants of their own: call the endpoint,
//! deserialize the record, or surface the normalized error. They ride the
//! gateway and therefore inherit refresh-and-retry.

use darkroom_core::models::{Collection, Gallery, Order, OrderStatus, Photo};
use serde_json::json;

use crate::error::ApiError;
use crate::DarkroomClient;

impl DarkroomClient {
    pub async fn collections(&self) -> Result<Vec<Collection>, ApiError> {
        self.gateway().get("/api/v1/collections").await
    }

    pub async fn collection(&self, collection_id: &str) -> Result<Collection, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/collections/{}", collection_id))
            .await
    }

    pub async fn create_collection(&self, name: &str) -> Result<Collection, ApiError> {
        self.gateway()
            .post("/api/v1/collections", &json!({ "name": name }))
            .await
    }

    pub async fn update_collection(
        &self,
        collection_id: &str,
        name: &str,
    ) -> Result<Collection, ApiError> {
        self.gateway()
            .put(
                &format!("/api/v1/collections/{}", collection_id),
                &json!({ "name": name }),
            )
            .await
    }

    pub async fn delete_collection(&self, collection_id: &str) -> Result<(), ApiError> {
        self.gateway()
            .delete(&format!("/api/v1/collections/{}", collection_id))
            .await
    }

    pub async fn gallery_count(&self, collection_id: &str) -> Result<u64, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/collections/{}/galleryCount", collection_id))
            .await
    }

    pub async fn galleries(&self, collection_id: &str) -> Result<Vec<Gallery>, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/collections/{}/galleries", collection_id))
            .await
    }

    pub async fn gallery(&self, gallery_id: &str) -> Result<Gallery, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/galleries/{}", gallery_id))
            .await
    }

    pub async fn create_gallery(
        &self,
        collection_id: &str,
        name: &str,
    ) -> Result<Gallery, ApiError> {
        self.gateway()
            .post(
                &format!("/api/v1/collections/{}/galleries", collection_id),
                &json!({ "name": name }),
            )
            .await
    }

    pub async fn update_gallery(&self, gallery_id: &str, name: &str) -> Result<Gallery, ApiError> {
        self.gateway()
            .put(
                &format!("/api/v1/galleries/{}", gallery_id),
                &json!({ "name": name }),
            )
            .await
    }

    pub async fn delete_gallery(&self, gallery_id: &str) -> Result<(), ApiError> {
        self.gateway()
            .delete(&format!("/api/v1/galleries/{}", gallery_id))
            .await
    }

    pub async fn gallery_photos(&self, gallery_id: &str) -> Result<Vec<Photo>, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/galleries/{}/photos", gallery_id))
            .await
    }

    pub async fn delete_photo(&self, photo_id: &str) -> Result<(), ApiError> {
        self.gateway()
            .delete(&format!("/api/v1/photos/{}", photo_id))
            .await
    }

    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.gateway().get("/api/v1/orders").await
    }

    pub async fn order(&self, order_id: &str) -> Result<Order, ApiError> {
        self.gateway()
            .get(&format!("/api/v1/orders/{}", order_id))
            .await
    }

    /// Updates an order's status and/or comment; omitted fields are left
    /// untouched.
    pub async fn update_order(
        &self,
        order_id: &str,
        status: Option<OrderStatus>,
        comment: Option<&str>,
    ) -> Result<Order, ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(status) = status {
            body.insert(
                "status".to_string(),
                serde_json::Value::String(status.as_str().to_string()),
            );
        }
        if let Some(comment) = comment {
            body.insert(
                "comment".to_string(),
                serde_json::Value::String(comment.to_string()),
            );
        }
        self.gateway()
            .put(&format!("/api/v1/orders/{}", order_id), &body)
            .await
    }

    pub async fn delete_order(&self, order_id: &str) -> Result<(), ApiError> {
        self.gateway()
            .delete(&format!("/api/v1/orders/{}", order_id))
            .await
    }
}
