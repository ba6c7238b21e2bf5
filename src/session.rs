// Session token handling: the in-memory `Session` value handed out by
// login, and the single-entry file store that mirrors it to disk.

use crate::error::{ApiError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the persisted token entry.
pub const TOKEN_KEY: &str = "bhiv_token";

/// Bearer credential issued by the backend on login.
///
/// The value is opaque: it is never decoded or checked locally. An expired
/// token only shows up as a `401` from the next authenticated call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Session { token: token.into() }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

/// Durable store holding at most one session token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store the token as `<dir>/bhiv_token`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        TokenStore {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    /// Platform location: local data dir, then home, then the working dir.
    pub fn default_location() -> Self {
        let dir = dirs::data_local_dir()
            .map(|d| d.join("bhiv"))
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::in_dir(dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored token with `session`.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| self.storage_err(source))?;
        }
        std::fs::write(&self.path, session.token()).map_err(|source| self.storage_err(source))?;
        info!(path = %self.path.display(), "session token persisted");
        Ok(())
    }

    /// Read the stored token back. A missing or blank entry is `None`.
    pub fn load(&self) -> Result<Option<Session>> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => {
                let token = data.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Session::new(token)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored session token");
                Ok(None)
            }
            Err(source) => Err(self.storage_err(source)),
        }
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.storage_err(source)),
        }
    }

    fn storage_err(&self, source: std::io::Error) -> ApiError {
        ApiError::Storage {
            path: self.path.clone(),
            source,
        }
    }
}
