//! Unified error handling system
//!
//! Two error families live here:
//!
//! - [`ApiError`]: the only failures the API access layer ever surfaces. A
//!   `Network` error means no response was received and always reports status
//!   `0`; an `Application` error carries the real HTTP status of a non-2xx
//!   response together with the backend's message and field-level details.
//! - [`StaybookError`]: everything else (configuration, token storage, I/O),
//!   carrying an [`ErrorContext`] with recovery suggestions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

pub type StaybookResult<T> = Result<T, StaybookError>;
pub type ApiResult<T> = Result<T, ApiError>;

/// Message reported for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";

/// Message reported when a 2xx body is not JSON or has the wrong shape.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

/// Fallback message when a failed response carries no `message` field.
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Fallback message when a failed upload carries no `message` field.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// A single field-level validation error reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field, when the backend names one
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: &str) -> Self {
        Self {
            field: field.map(str::to_string),
            message: message.to_string(),
        }
    }

    /// Parse the `errors` member of an error body.
    ///
    /// Accepts a list of strings, a list of objects (`field`/`path`/`param`
    /// with `message`/`msg`), or an object mapping field names to a message
    /// or a list of messages. Anything else yields no field errors.
    pub fn parse_list(value: &Value) -> Vec<FieldError> {
        match value {
            Value::Array(items) => items.iter().filter_map(Self::parse_item).collect(),
            Value::Object(map) => map
                .iter()
                .flat_map(|(field, messages)| match messages {
                    Value::String(message) => vec![Self::new(Some(field), message)],
                    Value::Array(list) => list
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|message| Self::new(Some(field), message))
                        .collect(),
                    _ => Vec::new(),
                })
                .collect(),
            Value::String(message) => vec![Self::new(None, message)],
            _ => Vec::new(),
        }
    }

    fn parse_item(item: &Value) -> Option<FieldError> {
        match item {
            Value::String(message) => Some(Self::new(None, message)),
            Value::Object(map) => {
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))?;
                let field = ["field", "path", "param", "property"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str));
                Some(Self::new(field, message))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Failure surfaced by the API access layer
#[derive(Error, Debug)]
pub enum ApiError {
    /// No usable response was received (DNS, refused connection, offline,
    /// unreadable body)
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },
}

impl ApiError {
    /// Create a network error wrapping the transport failure
    pub fn network<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: NETWORK_ERROR_MESSAGE.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for a successful response whose body could not be
    /// decoded. Reported with status `0` like a transport failure.
    pub fn unexpected_response(source: serde_json::Error) -> Self {
        Self::Network {
            message: UNEXPECTED_RESPONSE_MESSAGE.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an error for a request body that could not be encoded.
    ///
    /// Nothing was sent, so this is reported like a transport failure.
    pub fn encoding(source: serde_json::Error) -> Self {
        Self::Network {
            message: format!("Failed to encode request body: {}", source),
            source: Some(Box::new(source)),
        }
    }

    /// Create an application error
    pub fn application<S: Into<String>>(status: u16, message: S, errors: Vec<FieldError>) -> Self {
        Self::Application {
            status,
            message: message.into(),
            errors,
        }
    }

    /// Build an application error from a failed response's decoded body.
    ///
    /// `body` is `None` when the response had no JSON body at all.
    pub fn from_response_body(status: u16, body: Option<&Value>, fallback: &str) -> Self {
        let message = body
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(fallback);

        let errors = body
            .and_then(|body| body.get("errors"))
            .map(FieldError::parse_list)
            .unwrap_or_default();

        Self::application(status, message, errors)
    }

    /// HTTP status of the failure; `0` when no response was received
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Network { .. } => 0,
            ApiError::Application { status, .. } => *status,
        }
    }

    /// Message suitable for showing to an end user
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network { message, .. } | ApiError::Application { message, .. } => message,
        }
    }

    /// Field-level validation errors, empty when the backend sent none
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::Network { .. } => &[],
            ApiError::Application { errors, .. } => errors,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    /// Whether the backend rejected the credentials (401 or 403)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), 401 | 403)
    }
}

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for everything outside the API boundary
#[derive(Error, Debug)]
pub enum StaybookError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Permission error: {message}")]
    Permission { message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StaybookError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            StaybookError::Config { context, .. } => Some(context),
            StaybookError::Storage { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            StaybookError::Api(api_error) if api_error.is_network() => {
                warn!(error = %self, "Backend unreachable");
            }
            StaybookError::Api(api_error) => {
                warn!(status = api_error.status(), error = %self, "Backend rejected request");
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::StaybookError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check staybook.toml and STAYBOOK_* environment variables"),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::StaybookError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::StaybookError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}
