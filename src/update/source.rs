//! Source trait for fetching releases and RELEASES manifests from upstream

#[cfg(test)]
use mockall::automock;

use crate::update::error::FetchError;
use crate::update::types::{Release, RepositoryId};

/// Trait for talking to a release-hosting service
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches the releases of a repository
    ///
    /// # Returns
    /// * `Ok(Vec<Release>)` - Releases ordered from newest to oldest, possibly empty
    /// * `Err(FetchError::NotFound)` - The repository does not exist
    /// * `Err(FetchError)` - Any other upstream failure
    async fn fetch_releases(&self, repo: &RepositoryId) -> Result<Vec<Release>, FetchError>;

    /// Fetches the raw RELEASES manifest published under `tag`
    async fn fetch_manifest(&self, repo: &RepositoryId, tag: &str) -> Result<String, FetchError>;

    /// Absolute download URL of `file_name` published under `tag`
    fn download_url(&self, repo: &RepositoryId, tag: &str, file_name: &str) -> String;
}
