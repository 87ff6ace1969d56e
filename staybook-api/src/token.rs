//! Bearer token persistence
//!
//! The token is the only state shared between requests. Stores behave like
//! browser local storage: reads and writes never fail from the caller's point
//! of view, and a write that cannot reach disk still updates the in-process
//! value.

use serde_json::{Map, Value};
use staybook_core::{storage_error, StaybookResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Storage for the credential token
pub trait TokenStore: Send + Sync {
    /// Current token, if one is stored
    fn token(&self) -> Option<String>;

    /// Store `token`, replacing any previous value
    fn set_token(&self, token: &str);

    /// Forget the stored token
    fn remove_token(&self);
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with an existing token
    pub fn with_token<S: Into<String>>(token: S) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
    }

    fn remove_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Token store backed by a small JSON document on disk
///
/// The document maps storage keys to values, so the token lives under a
/// fixed key (`accessToken` by default) next to anything else written there.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
    document: RwLock<Map<String, Value>>,
}

impl FileTokenStore {
    /// Open the store at `path`, loading any token already persisted
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// ignored with a warning and replaced on the next write.
    pub fn open<P: AsRef<Path>>(path: P, key: &str) -> StaybookResult<Self> {
        let path = path.as_ref().to_path_buf();

        let document = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!("Ignoring unreadable token file at {}", path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(storage_error!(
                    format!("Failed to read token file {}: {}", path.display(), e),
                    "file_token_store",
                    e
                ))
            }
        };

        debug!("Token store opened at {}", path.display());

        Ok(Self {
            path,
            key: key.to_string(),
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, document: &Map<String, Value>) -> StaybookResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(document)?;
        if self.path.exists() {
            restrict_permissions(&self.path)?;
        }

        let mut file = private_file_options().open(&self.path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut Map<String, Value>),
    {
        let mut document = self.document.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut document);

        if let Err(e) = self.persist(&document) {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist token file; keeping the value in memory"
            );
        }
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        self.document
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&self.key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn set_token(&self, token: &str) {
        self.update(|document| {
            document.insert(self.key.clone(), Value::String(token.to_string()));
        });
    }

    fn remove_token(&self) {
        self.update(|document| {
            document.remove(&self.key);
        });
    }
}

/// Open for writing; a newly created file is owner-only from the start
fn private_file_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
