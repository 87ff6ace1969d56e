//! Request/response contract of the API access layer

mod helpers;

use axum::http::{Method, StatusCode};
use helpers::{alice, unreachable_address, MockBackend, Reply};
use serde_json::json;
use staybook_api::{ApiClient, FileTokenStore, MemoryTokenStore, RequestOptions, TokenStore};
use staybook_core::{
    ApiError, ClientConfig, Credentials, FieldError, Registration, UploadFile,
    NETWORK_ERROR_MESSAGE, UNEXPECTED_RESPONSE_MESSAGE,
};
use std::sync::Arc;

fn credentials(login: &str) -> Credentials {
    Credentials {
        login: login.to_string(),
        password: "x".to_string(),
    }
}

#[tokio::test]
async fn attaches_bearer_token_only_when_present() {
    let backend = MockBackend::spawn().await;
    backend.on_json(Method::GET, "/hotels", StatusCode::OK, json!([]));
    let client = backend.client();

    client.request("/hotels", RequestOptions::get()).await.unwrap();
    assert_eq!(backend.last_request().authorization, None);

    client.tokens().set_token("abc");
    client.request("/hotels", RequestOptions::get()).await.unwrap();
    assert_eq!(
        backend.last_request().authorization.as_deref(),
        Some("Bearer abc")
    );

    client.tokens().remove_token();
    client.request("/hotels", RequestOptions::get()).await.unwrap();
    assert_eq!(backend.last_request().authorization, None);
}

#[tokio::test]
async fn sends_json_body_and_returns_payload_unchanged() {
    let backend = MockBackend::spawn().await;
    let payload = json!({ "id": 5, "name": "Seaside", "extra": { "nested": [1, 2] } });
    backend.on_json(Method::POST, "/hotels", StatusCode::CREATED, payload.clone());
    let client = backend.client();

    let result = client
        .request(
            "/hotels",
            RequestOptions::post(&json!({ "name": "Seaside" })).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(result, Some(payload));
    let request = backend.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(request.json(), json!({ "name": "Seaside" }));
}

#[tokio::test]
async fn caller_headers_override_defaults() {
    let backend = MockBackend::spawn().await;
    backend.on_json(Method::GET, "/hotels", StatusCode::OK, json!([]));
    let client = backend.client();
    client.tokens().set_token("abc");

    client
        .request(
            "/hotels",
            RequestOptions::get().with_header("Authorization", "Bearer override"),
        )
        .await
        .unwrap();

    assert_eq!(
        backend.last_request().authorization.as_deref(),
        Some("Bearer override")
    );
}

#[tokio::test]
async fn no_content_is_an_empty_success() {
    let backend = MockBackend::spawn().await;
    backend.on(
        Method::DELETE,
        "/hotels/3",
        Reply::Empty(StatusCode::NO_CONTENT),
    );
    let client = backend.client();

    let result = client
        .request("/hotels/3", RequestOptions::delete())
        .await
        .unwrap();
    assert_eq!(result, None);

    client.hotels().delete(3).await.unwrap();
}

#[tokio::test]
async fn non_success_maps_to_application_error_with_http_status() {
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::PUT,
        "/rooms/8",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({
            "message": "Validation failed",
            "errors": [{ "field": "price", "message": "must be positive" }]
        }),
    );
    backend.on(
        Method::GET,
        "/rooms/9",
        Reply::Raw(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
    );
    let client = backend.client();

    let error = client
        .request("/rooms/8", RequestOptions::put(&json!({ "price": -1 })).unwrap())
        .await
        .unwrap_err();
    match &error {
        ApiError::Application {
            status,
            message,
            errors,
        } => {
            assert_eq!(*status, 422);
            assert_eq!(message, "Validation failed");
            assert_eq!(errors, &vec![FieldError::new(Some("price"), "must be positive")]);
        }
        other => panic!("Expected Application error, got {:?}", other),
    }

    let error = client
        .request("/rooms/9", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(error.status(), 502);
    assert_eq!(error.message(), "Request failed");

    let error = client
        .request("/unknown", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(error.status(), 404);
    assert_eq!(error.message(), "Route not found");
}

#[tokio::test]
async fn transport_failure_is_network_error_with_status_zero() {
    let config = ClientConfig::default().with_api_url(unreachable_address().await);
    let client = ApiClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap();

    let error = client
        .request("/hotels", RequestOptions::get())
        .await
        .unwrap_err();

    assert!(error.is_network());
    assert_eq!(error.status(), 0);
    assert_eq!(error.message(), NETWORK_ERROR_MESSAGE);
    assert!(error.field_errors().is_empty());
}

#[tokio::test]
async fn malformed_success_body_is_network_error() {
    let backend = MockBackend::spawn().await;
    backend.on(Method::GET, "/hotels", Reply::Raw(StatusCode::OK, "{not json"));
    let client = backend.client();

    let error = client
        .request("/hotels", RequestOptions::get())
        .await
        .unwrap_err();
    assert!(error.is_network());
    assert_eq!(error.status(), 0);
    assert_eq!(error.message(), UNEXPECTED_RESPONSE_MESSAGE);

    backend.on_json(Method::GET, "/hotels/3", StatusCode::OK, json!(["not", "a", "hotel"]));
    let error = client.hotels().get(3).await.unwrap_err();
    assert_eq!(error.status(), 0);
    assert_eq!(error.message(), UNEXPECTED_RESPONSE_MESSAGE);
}

#[tokio::test]
async fn login_persists_token_before_returning() {
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::POST,
        "/auth/login",
        StatusCode::OK,
        json!({ "accessToken": "tok-1", "user": alice() }),
    );
    let client = backend.client();

    let response = client.auth().login(&credentials("alice")).await.unwrap();

    assert_eq!(response.user.login, "alice");
    assert_eq!(client.tokens().token().as_deref(), Some("tok-1"));
    assert_eq!(
        backend.last_request().json(),
        json!({ "login": "alice", "password": "x" })
    );
}

#[tokio::test]
async fn failed_login_persists_nothing() {
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::POST,
        "/auth/login",
        StatusCode::BAD_REQUEST,
        json!({ "message": "invalid credentials" }),
    );
    let client = backend.client();

    let error = client.auth().login(&credentials("bob")).await.unwrap_err();

    assert_eq!(error.status(), 400);
    assert_eq!(error.to_string(), "invalid credentials");
    assert_eq!(client.tokens().token(), None);
}

#[tokio::test]
async fn login_response_without_user_persists_nothing() {
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::POST,
        "/auth/register",
        StatusCode::CREATED,
        json!({ "accessToken": "tok-2" }),
    );
    let client = backend.client();

    let registration = Registration {
        login: "dave".to_string(),
        email: "dave@example.com".to_string(),
        password: "secret".to_string(),
    };
    let error = client.auth().register(&registration).await.unwrap_err();

    assert!(error.is_network());
    assert_eq!(client.tokens().token(), None);
}

#[tokio::test]
async fn logout_removes_persisted_token() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::POST,
        "/auth/login",
        StatusCode::OK,
        json!({ "accessToken": "tok-3", "user": alice() }),
    );

    let store = Arc::new(FileTokenStore::open(&path, "accessToken").unwrap());
    let client = backend.client_with_store(store);
    client.auth().login(&credentials("alice")).await.unwrap();
    assert_eq!(
        FileTokenStore::open(&path, "accessToken").unwrap().token().as_deref(),
        Some("tok-3")
    );

    client.auth().logout();
    assert!(!client.has_token());
    assert_eq!(FileTokenStore::open(&path, "accessToken").unwrap().token(), None);
}

#[tokio::test]
async fn upload_sends_multipart_without_json_content_type() {
    let backend = MockBackend::spawn().await;
    backend.on_json(
        Method::POST,
        "/photos/hotel/4",
        StatusCode::CREATED,
        json!({ "id": 11, "url": "/uploads/lobby.jpg", "hotelId": 4 }),
    );
    let client = backend.client();
    client.tokens().set_token("abc");

    let file = UploadFile::new("lobby.jpg", b"JPEGDATA".to_vec()).with_mime_type("image/jpeg");
    let photo = client.photos().upload_hotel(4, file).await.unwrap().unwrap();
    assert_eq!(photo.id, 11);
    assert_eq!(photo.hotel_id, Some(4));

    let request = backend.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
    let content_type = request.content_type.unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"lobby.jpg\""));
    assert!(body.contains("JPEGDATA"));
}

#[tokio::test]
async fn upload_uses_custom_field_and_upload_fallback_message() {
    let backend = MockBackend::spawn().await;
    backend.on(
        Method::POST,
        "/photos/user",
        Reply::Raw(StatusCode::PAYLOAD_TOO_LARGE, ""),
    );
    let client = backend.client();

    let error = client
        .upload_file(
            "/photos/user",
            UploadFile::new("me.png", vec![0u8; 16]),
            "avatar",
        )
        .await
        .unwrap_err();

    assert_eq!(error.status(), 413);
    assert_eq!(error.message(), "Upload failed");
    let body = String::from_utf8_lossy(&backend.last_request().body).to_string();
    assert!(body.contains("name=\"avatar\""));
}
