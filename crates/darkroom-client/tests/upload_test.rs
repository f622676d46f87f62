mod helpers;

use darkroom_client::{ApiError, LocalPhoto, UploadStatus};
use helpers::{client_backed_by, stale_session};
use mockito::Matcher;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const JPEG_HEAD: [u8; 8] = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

fn jpeg_photo(name: &str) -> LocalPhoto {
    LocalPhoto::from_bytes(name, "image/jpeg", JPEG_HEAD.to_vec())
}

fn grant(server_url: &str, id: &str, filename: &str, slot: &str) -> serde_json::Value {
    json!({
        "id": id,
        "originalFilename": filename,
        "presignedPostRequest": {
            "URL": format!("{server_url}/storage/{slot}"),
            "Values": { "key": format!("uploads/{slot}"), "x-amz-signature": "sig" }
        }
    })
}

#[tokio::test]
async fn partial_failure_does_not_abort_the_batch() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .match_header("idempotency-key", Matcher::Regex(".+".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                grant(&url, "p1", "a.jpg", "1"),
                grant(&url, "p2", "b.jpg", "2"),
                grant(&url, "p3", "c.jpg", "3"),
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let _storage_ok_1 = server
        .mock("POST", "/storage/1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let _storage_fail = server
        .mock("POST", "/storage/2")
        .with_status(403)
        .with_body("<Error><Code>AccessDenied</Code></Error>")
        .expect(1)
        .create_async()
        .await;
    let _storage_ok_3 = server
        .mock("POST", "/storage/3")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let confirm_1 = server
        .mock("PUT", "/api/v1/photos/p1/confirm")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;
    let confirm_2 = server
        .mock("PUT", "/api/v1/photos/p2/confirm")
        .expect(0)
        .create_async()
        .await;
    let confirm_3 = server
        .mock("PUT", "/api/v1/photos/p3/confirm")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let batch = client
        .uploads()
        .upload_all("g1", vec![jpeg_photo("a.jpg"), jpeg_photo("b.jpg"), jpeg_photo("c.jpg")])
        .await
        .unwrap();

    assert_eq!(batch.outcomes.len(), 3);
    assert!(matches!(batch.outcomes[0].status, UploadStatus::Confirmed));
    assert!(matches!(batch.outcomes[1].status, UploadStatus::Failed(_)));
    assert!(matches!(batch.outcomes[2].status, UploadStatus::Confirmed));
    assert_eq!(batch.outcomes[1].photo_id, "p2");
    assert!(!batch.fully_confirmed());
    assert_eq!(batch.unconfirmed().count(), 1);

    confirm_1.assert_async().await;
    // The failed file is never confirmed.
    confirm_2.assert_async().await;
    confirm_3.assert_async().await;
}

#[tokio::test]
async fn failed_confirm_is_reported_not_swallowed() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([grant(&url, "p1", "a.jpg", "1")]).to_string())
        .create_async()
        .await;
    let _storage = server
        .mock("POST", "/storage/1")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let _confirm = server
        .mock("PUT", "/api/v1/photos/p1/confirm")
        .with_status(500)
        .with_body(r#"{"error":"queue unavailable"}"#)
        .expect(1)
        .create_async()
        .await;

    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let batch = client
        .uploads()
        .upload_all("g1", vec![jpeg_photo("a.jpg")])
        .await
        .unwrap();

    match &batch.outcomes[0].status {
        UploadStatus::UploadedUnconfirmed(ApiError::Backend { status, .. }) => {
            assert_eq!(*status, 500)
        }
        other => panic!("expected UploadedUnconfirmed, got {other:?}"),
    }
}

#[tokio::test]
async fn storage_post_carries_no_bearer_credential() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([grant(&url, "p1", "a.jpg", "1")]).to_string())
        .create_async()
        .await;
    let storage = server
        .mock("POST", "/storage/1")
        .match_header("authorization", Matcher::Missing)
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let _confirm = server
        .mock("PUT", "/api/v1/photos/p1/confirm")
        .with_status(200)
        .create_async()
        .await;

    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let batch = client
        .uploads()
        .upload_all("g1", vec![jpeg_photo("a.jpg")])
        .await
        .unwrap();

    assert!(batch.fully_confirmed());
    storage.assert_async().await;
}

#[tokio::test]
async fn cancelled_batch_abandons_unposted_grants() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([grant(&url, "p1", "a.jpg", "1"), grant(&url, "p2", "b.jpg", "2")]).to_string(),
        )
        .create_async()
        .await;
    let storage = server
        .mock("POST", Matcher::Regex("^/storage/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let batch = client
        .uploads()
        .upload_batch(
            "g1",
            vec![jpeg_photo("a.jpg"), jpeg_photo("b.jpg")],
            cancel,
        )
        .await
        .unwrap();

    assert!(batch
        .outcomes
        .iter()
        .all(|outcome| matches!(outcome.status, UploadStatus::Aborted)));
    storage.assert_async().await;
}

#[tokio::test]
async fn empty_batch_is_rejected_before_any_network_call() {
    let mut server = mockito::Server::new_async().await;
    let grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .expect(0)
        .create_async()
        .await;

    let (client, _store) = client_backed_by(&server.url(), Some(stale_session()));
    let err = client.uploads().upload_all("g1", vec![]).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    grants.assert_async().await;
}

#[tokio::test]
async fn grant_count_mismatch_is_a_batch_error() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([grant(&url, "p1", "a.jpg", "1")]).to_string())
        .create_async()
        .await;

    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let err = client
        .uploads()
        .upload_all("g1", vec![jpeg_photo("a.jpg"), jpeg_photo("b.jpg")])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Backend { .. }));
}

#[tokio::test]
async fn detected_content_type_overrides_the_declared_one() {
    let mut server = mockito::Server::new_async().await;
    let url = server.url();

    let _grants = server
        .mock("POST", "/api/v1/galleries/g1/photos")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([grant(&url, "p1", "mislabeled.png", "1")]).to_string())
        .create_async()
        .await;
    // The multipart body must carry the sniffed type, not the declared one.
    // GIF bytes keep the whole multipart payload valid UTF-8 for the regex.
    let storage = server
        .mock("POST", "/storage/1")
        .match_body(Matcher::Regex("image/gif".to_string()))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let _confirm = server
        .mock("PUT", "/api/v1/photos/p1/confirm")
        .with_status(200)
        .create_async()
        .await;

    // GIF bytes declared as PNG.
    let photo = LocalPhoto::from_bytes("mislabeled.png", "image/png", b"GIF87a-frame".to_vec());
    let (client, _store) = client_backed_by(&url, Some(stale_session()));
    let batch = client.uploads().upload_all("g1", vec![photo]).await.unwrap();

    assert!(batch.fully_confirmed());
    storage.assert_async().await;
}
