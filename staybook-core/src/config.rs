//! Client configuration
//!
//! Values resolve in order: built-in defaults, an optional `staybook.toml`,
//! then `STAYBOOK_*` environment variables (`STAYBOOK_API_URL` being the one
//! most deployments set).

use crate::error::{ErrorContext, StaybookError, StaybookResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TOKEN_STORAGE_KEY: &str = "accessToken";
pub const DEFAULT_CONFIG_FILE: &str = "staybook.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every resource path is appended to
    pub api_url: String,
    /// User agent string
    pub user_agent: String,
    /// Key the bearer token is stored under
    pub token_storage_key: String,
    /// Token file location; `None` uses the platform data directory
    pub token_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("staybook/{}", env!("CARGO_PKG_VERSION")),
            token_storage_key: DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            token_file: None,
        }
    }
}

impl ClientConfig {
    /// Load from `staybook.toml` in the working directory (if present) and
    /// the environment
    pub fn load() -> StaybookResult<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE), false)
    }

    /// Load from an explicit file; `required` controls whether it must exist
    pub fn load_from(path: &Path, required: bool) -> StaybookResult<Self> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("api_url", defaults.api_url.clone())
            .and_then(|builder| builder.set_default("user_agent", defaults.user_agent.clone()))
            .and_then(|builder| {
                builder.set_default("token_storage_key", defaults.token_storage_key.clone())
            })
            .map_err(|e| config_failure("set_defaults", e))?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(Environment::with_prefix("STAYBOOK").try_parsing(false))
            .build()
            .map_err(|e| config_failure("build", e))?;

        let config: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| config_failure("deserialize", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Override the API base URL
    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Override the token file location
    pub fn with_token_file<P: Into<PathBuf>>(mut self, token_file: P) -> Self {
        self.token_file = Some(token_file.into());
        self
    }

    /// Resolved token file path
    pub fn token_file_path(&self) -> StaybookResult<PathBuf> {
        if let Some(path) = &self.token_file {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join("staybook").join("session.json"))
            .ok_or_else(|| StaybookError::Config {
                message: "No platform data directory available for the token file".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("token_file_path")
                    .with_suggestion("Set STAYBOOK_TOKEN_FILE to an explicit path"),
            })
    }

    /// Validate configuration
    pub fn validate(&self) -> StaybookResult<()> {
        let parsed = url::Url::parse(&self.api_url).map_err(|e| StaybookError::Config {
            message: format!("Invalid API URL '{}': {}", self.api_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Set STAYBOOK_API_URL to an absolute http(s) URL"),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StaybookError::Config {
                message: format!("API URL must use http or https, got '{}'", parsed.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set STAYBOOK_API_URL to an absolute http(s) URL"),
            });
        }

        if self.token_storage_key.trim().is_empty() {
            return Err(crate::config_error!(
                "Token storage key must not be empty",
                "config"
            ));
        }

        Ok(())
    }

    /// Render as TOML, e.g. for `staybook config --show`
    pub fn to_toml(&self) -> StaybookResult<String> {
        toml::to_string_pretty(self).map_err(|e| StaybookError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })
    }
}

fn config_failure(operation: &str, error: config::ConfigError) -> StaybookError {
    StaybookError::Config {
        message: format!("Failed to load configuration: {}", error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("config")
            .with_operation(operation)
            .with_suggestion("Check TOML syntax in staybook.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_storage_key, "accessToken");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_relative_or_foreign_urls() {
        let relative = ClientConfig::default().with_api_url("/api");
        assert!(matches!(
            relative.validate(),
            Err(StaybookError::Config { .. })
        ));

        let ftp = ClientConfig::default().with_api_url("ftp://example.com/api");
        assert!(ftp.validate().is_err());
    }

    #[test]
    fn rejects_blank_storage_key() {
        let config = ClientConfig {
            token_storage_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_values_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_url = \"https://booking.example.com/api\"").unwrap();
        writeln!(file, "token_file = \"/tmp/staybook-test/session.json\"").unwrap();

        let config = ClientConfig::load_from(file.path(), true).unwrap();
        assert_eq!(config.api_url, "https://booking.example.com/api");
        assert_eq!(
            config.token_file_path().unwrap(),
            PathBuf::from("/tmp/staybook-test/session.json")
        );
        assert_eq!(config.token_storage_key, DEFAULT_TOKEN_STORAGE_KEY);
    }

    #[test]
    fn missing_optional_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("absent.toml"), false).unwrap();
        assert_eq!(config.token_storage_key, DEFAULT_TOKEN_STORAGE_KEY);
    }

    #[test]
    fn renders_as_toml() {
        let rendered = ClientConfig::default().to_toml().unwrap();
        assert!(rendered.contains("api_url"));
    }
}
