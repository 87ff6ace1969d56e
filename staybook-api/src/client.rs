//! HTTP client shared by every resource operation
//!
//! [`ApiClient::request`] is the single chokepoint for backend traffic. It
//! attaches the bearer token, encodes the body as JSON and normalizes every
//! outcome into a payload or an [`ApiError`].

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use staybook_core::{
    ApiError, ApiResult, ClientConfig, ErrorContext, StaybookError, StaybookResult, UploadFile,
    REQUEST_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::token::TokenStore;

/// Field name used for uploads when the caller does not pick one
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Method, body and extra headers for a single request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Applied after the defaults, so they override `Content-Type` and
    /// `Authorization`
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn post<T: Serialize + ?Sized>(body: &T) -> ApiResult<Self> {
        Self::new(Method::POST).with_json(body)
    }

    pub fn put<T: Serialize + ?Sized>(body: &T) -> ApiResult<Self> {
        Self::new(Method::PUT).with_json(body)
    }

    /// Encode `body` as the JSON request body
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::encoding)?);
        Ok(self)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for the booking backend
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.tokens.token().is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client from configuration and a token store
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> StaybookResult<Self> {
        config.validate()?;

        let http = create_http_client(config)?;
        debug!("Created API client for {}", config.api_url);

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Token store shared by every request
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Whether a bearer token is currently stored
    pub fn has_token(&self) -> bool {
        self.tokens.token().is_some()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Headers common to JSON and multipart requests
    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(token) = self.tokens.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value; sending without it"),
            }
        }

        headers
    }

    /// Send a JSON request to `path`
    ///
    /// Returns `Ok(None)` for an empty response (204 or a 2xx without a body)
    /// and the decoded payload otherwise.
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Option<Value>> {
        let url = self.url(path);

        let mut headers = self.base_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        apply_custom_headers(&mut headers, &options.headers);

        debug!(method = %options.method, path = path, "Sending API request");

        let mut builder = self.http.request(options.method.clone(), &url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(serde_json::to_vec(body).map_err(ApiError::encoding)?);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %options.method, path = path, error = %e, "API request failed to send");
            ApiError::network(e)
        })?;

        settle(response, REQUEST_FAILED_MESSAGE).await
    }

    /// Send a JSON request and decode the payload into `T`
    ///
    /// An empty response decodes from `null`, so `Option<_>` and
    /// [`serde::de::IgnoredAny`] targets accept it.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let payload = self.request(path, options).await?;
        decode(path, payload)
    }

    /// Send a JSON request whose success may carry no body
    ///
    /// Writes answered with 204 (or an empty 2xx) yield `Ok(None)`; a body,
    /// when present, must decode into `T`.
    pub async fn request_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        let payload = self.request(path, options).await?;
        decode_present(path, payload)
    }

    /// Upload `file` as multipart form data under `field_name`
    ///
    /// Always a POST. No JSON content type is set; reqwest supplies the
    /// multipart boundary header.
    pub async fn upload_file(
        &self,
        path: &str,
        file: UploadFile,
        field_name: &str,
    ) -> ApiResult<Option<Value>> {
        let url = self.url(path);
        let size = file.bytes.len();

        let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime_type) = &file.mime_type {
            part = part.mime_str(mime_type).map_err(ApiError::network)?;
        }
        let form = reqwest::multipart::Form::new().part(field_name.to_string(), part);

        debug!(path = path, field = field_name, bytes = size, "Uploading file");

        let response = self
            .http
            .post(&url)
            .headers(self.base_headers())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(path = path, error = %e, "Upload failed to send");
                ApiError::network(e)
            })?;

        settle(response, UPLOAD_FAILED_MESSAGE).await
    }

    /// Upload a file and decode the payload into `T`
    pub async fn upload_json<T: DeserializeOwned>(
        &self,
        path: &str,
        file: UploadFile,
        field_name: &str,
    ) -> ApiResult<T> {
        let payload = self.upload_file(path, file, field_name).await?;
        decode(path, payload)
    }

    /// Upload a file; an empty success yields `Ok(None)`
    pub async fn upload_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        file: UploadFile,
        field_name: &str,
    ) -> ApiResult<Option<T>> {
        let payload = self.upload_file(path, file, field_name).await?;
        decode_present(path, payload)
    }
}

/// Turn a response into the envelope: payload, empty result or error
async fn settle(response: reqwest::Response, fallback: &str) -> ApiResult<Option<Value>> {
    let status = response.status();

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response.bytes().await;

    if !status.is_success() {
        let parsed = body
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());
        let error = ApiError::from_response_body(status.as_u16(), parsed.as_ref(), fallback);
        debug!(status = status.as_u16(), message = error.message(), "API request rejected");
        return Err(error);
    }

    let bytes = body.map_err(ApiError::network)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        warn!(status = status.as_u16(), error = %e, "Response body is not valid JSON");
        ApiError::unexpected_response(e)
    })
}

fn decode<T: DeserializeOwned>(path: &str, payload: Option<Value>) -> ApiResult<T> {
    serde_json::from_value(payload.unwrap_or(Value::Null)).map_err(|e| {
        warn!(path = path, error = %e, "Response payload has an unexpected shape");
        ApiError::unexpected_response(e)
    })
}

fn decode_present<T: DeserializeOwned>(path: &str, payload: Option<Value>) -> ApiResult<Option<T>> {
    match payload {
        Some(value) => decode(path, Some(value)).map(Some),
        None => Ok(None),
    }
}

fn apply_custom_headers(headers: &mut HeaderMap, custom: &[(String, String)]) {
    for (name, value) in custom {
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .ok()
            .zip(HeaderValue::from_str(value).ok());

        match parsed {
            Some((name, value)) => {
                headers.insert(name, value);
            }
            None => warn!(header = %name, "Skipping invalid request header"),
        }
    }
}

/// Helper function to create HTTP client with common configuration
fn create_http_client(config: &ClientConfig) -> StaybookResult<reqwest::Client> {
    let mut headers = HeaderMap::new();

    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| StaybookError::Config {
            message: format!("Invalid user agent: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| StaybookError::Config {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}
