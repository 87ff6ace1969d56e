//! In-process backend used by the integration tests
//!
//! Every request is recorded; responses come from a route table keyed by
//! method and path (query string included). Unknown routes answer 404.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use staybook_api::{ApiClient, MemoryTokenStore, TokenStore};
use staybook_core::ClientConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Raw(StatusCode, &'static str),
    Empty(StatusCode),
}

#[derive(Default)]
struct BackendState {
    routes: Mutex<HashMap<(Method, String), Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockBackend {
    pub address: String,
    state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend crashed");
        });

        Self {
            address: format!("http://127.0.0.1:{}/api", port),
            state,
        }
    }

    pub fn on(&self, method: Method, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), reply);
    }

    pub fn on_json(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.on(method, path, Reply::Json(status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request was recorded")
    }

    /// Client with an empty in-memory token store
    pub fn client(&self) -> ApiClient {
        self.client_with_store(Arc::new(MemoryTokenStore::new()))
    }

    pub fn client_with_store(&self, store: Arc<dyn TokenStore>) -> ApiClient {
        let config = ClientConfig::default().with_api_url(self.address.clone());
        ApiClient::new(&config, store).expect("Failed to build client")
    }
}

async fn handle(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let path = path.strip_prefix("/api").unwrap_or(&path).to_string();

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    let reply = state.routes.lock().unwrap().get(&(method, path)).cloned();

    match reply {
        Some(Reply::Json(status, body)) => (status, axum::Json(body)).into_response(),
        Some(Reply::Raw(status, text)) => (status, text).into_response(),
        Some(Reply::Empty(status)) => status.into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "message": "Route not found" })),
        )
            .into_response(),
    }
}

/// Address of a port nothing is listening on
pub async fn unreachable_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

pub fn alice() -> Value {
    json!({
        "id": 1,
        "login": "alice",
        "email": "alice@example.com",
        "role": "client",
        "createdAt": "2024-03-01T09:30:00Z"
    })
}
