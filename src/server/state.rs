//! Shared server state

use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, ServerConfig, db_path};
use crate::update::cache::{Cache, MemoryCache, SqliteCache};
use crate::update::fetcher::ReleaseFetcher;
use crate::update::github::GitHubSource;
use crate::update::platform::PlatformMatcher;
use crate::update::resolver::UpdateResolver;
use crate::update::source::ReleaseSource;

/// State shared by every request handler
pub struct AppState {
    pub resolver: UpdateResolver,
}

impl AppState {
    pub fn new(resolver: UpdateResolver) -> Self {
        Self { resolver }
    }

    /// Wire the GitHub source and the configured cache backend
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let source: Arc<dyn ReleaseSource> = Arc::new(GitHubSource::new(
            &config.upstream.api_base_url,
            &config.upstream.download_base_url,
            config.upstream.token.clone(),
        )?);

        let ttl_ms = config.cache.ttl.max(0);
        let cache: Arc<dyn Cache> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::with_ttl(Duration::from_millis(
                ttl_ms as u64,
            ))),
            CacheBackend::Sqlite => {
                let path = config.cache.path.clone().unwrap_or_else(db_path);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Arc::new(SqliteCache::new(&path, ttl_ms)?)
            }
        };

        let fetcher = ReleaseFetcher::new(source, cache);
        Ok(Self::new(UpdateResolver::new(fetcher, PlatformMatcher::default())))
    }
}
