//! Config module - storage root resolution and the optional config file.
//!
//! The storage root is resolved from, highest precedence first:
//! 1. the `--storage` flag
//! 2. the `GRANOLA_SYNC_FOLDER` environment variable
//! 3. `storage` in `~/.config/granola/config.json`
//! 4. `~/Documents/granola-meetings`

use crate::error::{GranolaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the storage root
pub const STORAGE_ENV: &str = "GRANOLA_SYNC_FOLDER";

/// Granola API base URL
pub const DEFAULT_API_BASE: &str = "https://api.granola.ai/v1";

/// Per-request timeout when the config file does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of `config.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Storage root for synced meetings
    #[serde(default)]
    pub storage: Option<PathBuf>,

    /// Override for the API base URL
    #[serde(default)]
    pub api_base: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Default config directory (~/.config/granola/)
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".config").join("granola"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default config file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.json")
}

/// Default storage root (~/Documents/granola-meetings)
pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Documents").join("granola-meetings"))
        .unwrap_or_else(|| PathBuf::from("./granola-meetings"))
}

impl Config {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GranolaError::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            GranolaError::Config(format!("Cannot parse config file {}: {}", path.display(), e))
        })
    }

    /// Load config from the default path; a missing file means defaults.
    pub fn load_default() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .map(|b| b.trim_end_matches('/'))
            .unwrap_or(DEFAULT_API_BASE)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Which layer the storage root came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSource {
    Flag,
    Env,
    ConfigFile,
    Default,
}

/// A resolved storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    pub path: PathBuf,
    pub source: StorageSource,
}

/// Resolve the storage root: the first layer that has a value wins.
pub fn resolve_storage(
    flag: Option<&Path>,
    env: Option<&str>,
    config: &Config,
) -> Result<StorageRoot> {
    let layers = [
        (StorageSource::Flag, flag.map(Path::to_path_buf)),
        (
            StorageSource::Env,
            env.map(str::trim).filter(|v| !v.is_empty()).map(PathBuf::from),
        ),
        (StorageSource::ConfigFile, config.storage.clone()),
    ];

    let (source, raw) = layers
        .into_iter()
        .find_map(|(source, value)| value.map(|path| (source, path)))
        .unwrap_or_else(|| (StorageSource::Default, default_storage_path()));

    let path = expand_tilde(&raw);
    if path.as_os_str().is_empty() {
        return Err(GranolaError::Config("Storage path is empty".to_string()));
    }
    if path.exists() && !path.is_dir() {
        return Err(GranolaError::Config(format!(
            "Storage path is not a directory: {}",
            path.display()
        )));
    }

    tracing::debug!(?source, path = %path.display(), "resolved storage root");
    Ok(StorageRoot { path, source })
}

/// Resolve the storage root reading the real environment.
pub fn resolve_storage_from_env(flag: Option<&Path>, config: &Config) -> Result<StorageRoot> {
    let env = std::env::var(STORAGE_ENV).ok();
    resolve_storage(flag, env.as_deref(), config)
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
