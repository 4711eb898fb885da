//! Cache-backed release fetching with single-flight deduplication
//!
//! Concurrent misses for the same key share one upstream request: the first caller
//! starts it, later callers await the same pending result. The request runs on its
//! own task, so it completes and fills the cache even if every caller goes away.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::update::cache::Cache;
use crate::update::error::FetchError;
use crate::update::source::ReleaseSource;
use crate::update::types::{Release, RepositoryId};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;
type PendingMap<T> = Arc<Mutex<HashMap<String, SharedFetch<T>>>>;

/// Pending upstream requests keyed by cache key
struct InFlight<T> {
    pending: PendingMap<T>,
}

/// Removes a pending entry when the fetch task ends, including by panic
struct PendingGuard<T> {
    pending: PendingMap<T>,
    key: String,
}

impl<T> Drop for PendingGuard<T> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<T> InFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Await the pending request for `key`, starting `fetch` if there is none.
    ///
    /// Waiters receive the result before `persist` runs; the entry is dropped only
    /// after `persist` finishes, so a later caller finds either the entry or the cache.
    async fn run<F, P, PF>(&self, key: String, fetch: F, persist: P) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
        P: FnOnce(T) -> PF + Send + 'static,
        PF: Future<Output = ()> + Send + 'static,
    {
        let shared = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

            match pending.get(&key) {
                Some(existing) => {
                    debug!("Joining in-flight fetch: {}", key);
                    existing.clone()
                }
                None => {
                    let (tx, rx) = oneshot::channel();
                    let guard = PendingGuard {
                        pending: Arc::clone(&self.pending),
                        key: key.clone(),
                    };

                    tokio::spawn(async move {
                        let _guard = guard;
                        let result = fetch.await;
                        let _ = tx.send(result.clone());
                        if let Ok(value) = result {
                            persist(value).await;
                        }
                    });

                    let shared = async move {
                        rx.await.unwrap_or_else(|_| {
                            Err(FetchError::Network("fetch task ended without a result".to_string()))
                        })
                    }
                    .boxed()
                    .shared();
                    pending.insert(key, shared.clone());
                    shared
                }
            }
        };

        shared.await
    }
}

/// Fetches releases and manifests through a [`Cache`]
pub struct ReleaseFetcher {
    source: Arc<dyn ReleaseSource>,
    cache: Arc<dyn Cache>,
    releases_in_flight: InFlight<Arc<Vec<Release>>>,
    manifests_in_flight: InFlight<String>,
}

impl ReleaseFetcher {
    pub fn new(source: Arc<dyn ReleaseSource>, cache: Arc<dyn Cache>) -> Self {
        Self {
            source,
            cache,
            releases_in_flight: InFlight::new(),
            manifests_in_flight: InFlight::new(),
        }
    }

    pub fn source(&self) -> &Arc<dyn ReleaseSource> {
        &self.source
    }

    /// Returns the releases of `repo`, newest first
    ///
    /// Only successful fetches are cached, so a missing repository is asked for again
    /// on the next request.
    pub async fn fetch_releases(
        &self,
        repo: &RepositoryId,
    ) -> Result<Arc<Vec<Release>>, FetchError> {
        let key = repo.releases_key();

        if let Some(raw) = lookup(self.cache.as_ref(), &key).await {
            match serde_json::from_str::<Vec<Release>>(&raw) {
                Ok(releases) => return Ok(Arc::new(releases)),
                Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
            }
        }

        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let repo = repo.clone();
        let cache_key = key.clone();

        self.releases_in_flight
            .run(
                key,
                async move {
                    let releases = source.fetch_releases(&repo).await?;
                    debug!("Fetched {} releases for {}", releases.len(), repo);
                    Ok(Arc::new(releases))
                },
                move |releases: Arc<Vec<Release>>| async move {
                    store_json(cache.as_ref(), &cache_key, releases.as_slice()).await;
                },
            )
            .await
    }

    /// Returns the raw RELEASES manifest of `repo` at `tag`
    pub async fn fetch_manifest(&self, repo: &RepositoryId, tag: &str) -> Result<String, FetchError> {
        let key = repo.manifest_key(tag);

        if let Some(manifest) = lookup(self.cache.as_ref(), &key).await {
            return Ok(manifest);
        }

        let source = Arc::clone(&self.source);
        let cache = Arc::clone(&self.cache);
        let repo = repo.clone();
        let tag = tag.to_string();
        let cache_key = key.clone();

        self.manifests_in_flight
            .run(
                key,
                async move { source.fetch_manifest(&repo, &tag).await },
                move |manifest: String| async move {
                    store(cache.as_ref(), &cache_key, manifest).await;
                },
            )
            .await
    }
}

/// Cache read where a failing backend counts as a miss
async fn lookup(cache: &dyn Cache, key: &str) -> Option<String> {
    match cache.get(key).await {
        Ok(Some(value)) => {
            debug!("Cache hit: {}", key);
            Some(value)
        }
        Ok(None) => {
            debug!("Cache miss: {}", key);
            None
        }
        Err(e) => {
            warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

/// Cache write whose failure never reaches the caller
async fn store(cache: &dyn Cache, key: &str, value: String) {
    if let Err(e) = cache.set(key, value).await {
        warn!("Cache write failed for {}: {}", key, e);
    }
}

async fn store_json<T: Serialize + ?Sized>(cache: &dyn Cache, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store(cache, key, raw).await,
        Err(e) => warn!("Failed to encode cache entry {}: {}", key, e),
    }
}
