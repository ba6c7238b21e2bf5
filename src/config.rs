// Client configuration.
// Values come from, lowest precedence first: built-in defaults, the TOML
// file at `<config dir>/bhiv/config.toml`, and `BHIV_*` environment
// variables. The API key has no default and must be supplied by one of
// the two external sources.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Hosted backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://prompt-to-json-backend.onrender.com";

pub const ENV_BASE_URL: &str = "BHIV_BASE_URL";
pub const ENV_API_KEY: &str = "BHIV_API_KEY";
pub const ENV_TOKEN_DIR: &str = "BHIV_TOKEN_DIR";

/// On-disk shape of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub token_dir: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Resolved configuration for [`crate::api::ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// Directory holding the persisted token; `None` uses the platform default.
    pub token_dir: Option<PathBuf>,
    /// Request timeout; `None` leaves the HTTP stack's default in place.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("token_dir", &self.token_dir)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Config with an explicit key and the default backend.
    pub fn new(api_key: impl Into<String>) -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            token_dir: None,
            timeout_secs: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.token_dir = Some(dir.into());
        self
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("bhiv").join("config.toml"))
            .context("Could not determine config directory")
    }

    /// Load from the default config file (if present) and the process
    /// environment.
    pub fn load() -> Result<Self> {
        let file = match Self::config_path() {
            Ok(path) => Self::read_file(&path)?,
            Err(_) => None,
        };
        Self::resolve(file.unwrap_or_default(), |key| std::env::var(key).ok())
    }

    /// Parse a config file. A missing file is `None`, not an error.
    pub fn read_file(path: &Path) -> Result<Option<FileConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let parsed = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(Some(parsed))
    }

    /// Merge file values with environment lookups. Environment wins.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = match non_empty(ENV_API_KEY).or(file.api_key) {
            Some(key) => key,
            None => bail!(
                "API key not configured. Set {} or add api_key to the config file.",
                ENV_API_KEY
            ),
        };
        let base_url = non_empty(ENV_BASE_URL)
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let token_dir = non_empty(ENV_TOKEN_DIR).map(PathBuf::from).or(file.token_dir);

        Ok(ClientConfig {
            base_url,
            api_key,
            token_dir,
            timeout_secs: file.timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = ClientConfig::resolve(FileConfig::default(), env(&[])).unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let cfg = ClientConfig::resolve(FileConfig::default(), env(&[(ENV_API_KEY, "k")])).unwrap();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.api_key, "k");
        assert!(cfg.token_dir.is_none());
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileConfig {
            base_url: Some("http://file".into()),
            api_key: Some("file-key".into()),
            token_dir: Some(PathBuf::from("/file/dir")),
            timeout_secs: Some(5),
        };
        let cfg = ClientConfig::resolve(
            file,
            env(&[(ENV_BASE_URL, "http://env"), (ENV_API_KEY, "env-key")]),
        )
        .unwrap();
        assert_eq!(cfg.base_url, "http://env");
        assert_eq!(cfg.api_key, "env-key");
        assert_eq!(cfg.token_dir, Some(PathBuf::from("/file/dir")));
        assert_eq!(cfg.timeout_secs, Some(5));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let file = FileConfig {
            api_key: Some("file-key".into()),
            ..FileConfig::default()
        };
        let cfg = ClientConfig::resolve(file, env(&[(ENV_API_KEY, "  ")])).unwrap();
        assert_eq!(cfg.api_key, "file-key");
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"http://localhost:8000\"\napi_key = \"abc\"\ntimeout_secs = 10\n").unwrap();

        let file = ClientConfig::read_file(&path).unwrap().unwrap();
        assert_eq!(file.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(file.api_key.as_deref(), Some("abc"));
        assert_eq!(file.timeout_secs, Some(10));
    }

    #[test]
    fn missing_file_reads_as_none_and_bad_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::read_file(&dir.path().join("absent.toml")).unwrap().is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "base_url = ").unwrap();
        assert!(ClientConfig::read_file(&bad).is_err());
    }

    #[test]
    fn debug_hides_api_key() {
        let cfg = ClientConfig::new("super-secret");
        assert!(!format!("{:?}", cfg).contains("super-secret"));
    }
}
