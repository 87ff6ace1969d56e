//! Minimal in-process backend for session tests

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use staybook_api::{ApiClient, TokenStore};
use staybook_core::ClientConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct BackendState {
    routes: Mutex<HashMap<(Method, String), (StatusCode, Value)>>,
    authorizations: Mutex<Vec<Option<String>>>,
}

pub struct Backend {
    pub address: String,
    state: Arc<BackendState>,
}

impl Backend {
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("backend crashed");
        });

        Self {
            address: format!("http://127.0.0.1:{}/api", port),
            state,
        }
    }

    pub fn on(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
    }

    /// `Authorization` header of every request, in order
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.state.authorizations.lock().unwrap().clone()
    }

    pub fn client(&self, store: Arc<dyn TokenStore>) -> Arc<ApiClient> {
        let config = ClientConfig::default().with_api_url(self.address.clone());
        Arc::new(ApiClient::new(&config, store).expect("Failed to build client"))
    }
}

async fn handle(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_string();
    state.authorizations.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    );

    match state.routes.lock().unwrap().get(&(method, path)).cloned() {
        Some((status, body)) => (status, axum::Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "message": "Route not found" })),
        )
            .into_response(),
    }
}

pub fn user(id: i64, login: &str, role: &str) -> Value {
    json!({ "id": id, "login": login, "email": format!("{}@example.com", login), "role": role })
}
