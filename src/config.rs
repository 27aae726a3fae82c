use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Default base URL for the GitHub API (REST and GraphQL)
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Number of tag refs requested per GraphQL page
pub const PAGE_SIZE: u32 = 100;

/// Timeout for a single API request (60 seconds)
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for establishing a connection (20 seconds)
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default tag cache max age in seconds (24 hours)
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 24 * 60 * 60;

/// Environment variable consulted when no token is configured
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Application configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub repository: RepositoryConfig,
    pub cache: CacheConfig,
    pub api: ApiConfig,
    pub ordering: OrderingConfig,
    pub notes: NotesConfig,
}

/// Repository whose tags are consolidated
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RepositoryConfig {
    pub owner: String,
    pub name: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: "vaadin".to_string(),
            name: "platform".to_string(),
        }
    }
}

/// Tag cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub enabled: bool,
    /// Maximum age of the tag cache in seconds
    pub max_age_seconds: u64,
    /// Directory holding one cache file per repository
    pub directory: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_seconds: DEFAULT_CACHE_MAX_AGE_SECS,
            directory: cache_dir(),
        }
    }
}

/// Remote API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    pub url: String,
    /// Bearer token; unauthenticated calls get tighter rate limits
    pub token: Option<String>,
    pub retry: RetryConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            token: None,
            retry: RetryConfig::default(),
        }
    }
}

/// Backoff applied when the API reports an exceeded quota.
/// `max_retries == 0` disables retrying.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OrderingConfig {
    /// Compare missing trailing components as zero instead of ignoring them
    pub strict: bool,
}

/// Release notes cache configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NotesConfig {
    pub capacity: usize,
    pub max_age_seconds: u64,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            max_age_seconds: 60 * 60,
        }
    }
}

impl Config {
    /// Loads the configuration from a JSON file.
    ///
    /// A missing file yields the defaults. The API token falls back to
    /// `$GITHUB_TOKEN` when the file doesn't set one.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => {
                serde_json::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        config.api.token = resolve_token(config.api.token, std::env::var(TOKEN_ENV_VAR).ok());
        Ok(config)
    }
}

fn resolve_token(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|t| !t.is_empty())
        .or_else(|| from_env.filter(|t| !t.is_empty()))
}

/// Returns the path to the data directory for tag-history.
/// Uses $XDG_DATA_HOME/tag-history if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/tag-history,
/// or ./tag-history if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default config file path.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the default tag cache directory.
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("tag-history.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("tag-history")
}
