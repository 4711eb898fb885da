use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::update::github::{DEFAULT_API_BASE_URL, DEFAULT_DOWNLOAD_BASE_URL};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default cache time-to-live in milliseconds (15 minutes)
pub const DEFAULT_CACHE_TTL_MS: i64 = 15 * 60 * 1000;

/// Timeout for upstream fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: i64 = 30_000;

/// Default listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Server configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub listen_addr: String,
    pub upstream: UpstreamConfig,
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a JSON file; missing fields use defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Upstream release host configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpstreamConfig {
    /// Base URL of the releases API
    pub api_base_url: String,
    /// Base URL release downloads and RELEASES manifests are served from
    pub download_base_url: String,
    /// Bearer token forwarded to the releases API
    pub token: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            token: None,
        }
    }
}

/// Cache backend selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Cache time-to-live in milliseconds
    pub ttl: i64,
    /// SQLite database path, defaults to [`db_path`]
    pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl: DEFAULT_CACHE_TTL_MS,
            path: None,
        }
    }
}

/// Returns the path to the data directory for release-updates.
/// Uses $XDG_DATA_HOME/release-updates if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-updates,
/// or ./release-updates if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the cache database file.
pub fn db_path() -> PathBuf {
    data_dir().join("cache.db")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-updates")
}
