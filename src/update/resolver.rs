//! Update resolution for a single client request
//!
//! Validation happens before any upstream call:
//!
//! 1. platform key must be registered
//! 2. client version must be SemVer
//! 3. architecture must be known, if the platform rule uses one
//! 4. releases are fetched (through the cache)
//! 5. the first release is the candidate
//! 6. the candidate must be newer than the client version
//! 7. the platform rule picks the asset

use std::sync::Arc;

use tracing::{debug, warn};

use crate::update::error::{FetchError, UpdateError};
use crate::update::fetcher::ReleaseFetcher;
use crate::update::manifest::rewrite_manifest;
use crate::update::platform::PlatformMatcher;
use crate::update::semver::{is_newer, parse_version};
use crate::update::types::{Release, RepositoryId, Update, UpdateDecision};

/// Resolves update checks and RELEASES requests. Holds no per-request state.
pub struct UpdateResolver {
    fetcher: ReleaseFetcher,
    platforms: PlatformMatcher,
}

impl UpdateResolver {
    pub fn new(fetcher: ReleaseFetcher, platforms: PlatformMatcher) -> Self {
        Self { fetcher, platforms }
    }

    pub fn platforms(&self) -> &PlatformMatcher {
        &self.platforms
    }

    /// Decide whether a client of `repo` on `platform` at `version` should update
    pub async fn check_update(
        &self,
        repo: &RepositoryId,
        platform: &str,
        version: &str,
        arch: Option<&str>,
    ) -> Result<UpdateDecision, UpdateError> {
        let rule = self.platforms.rule(platform)?;
        let current = parse_version(version)?;
        let arch = rule.arch(arch)?;

        let releases = self.fetch_releases(repo).await?;
        let candidate = latest_release(&releases)?;

        let latest = match parse_version(&candidate.tag) {
            Ok(latest) => latest,
            Err(_) => {
                warn!("Ignoring non-SemVer release tag {:?} of {}", candidate.tag, repo);
                return Ok(UpdateDecision::UpToDate);
            }
        };

        if !is_newer(&latest, &current) {
            debug!("{} {} is up to date ({})", repo, version, candidate.tag);
            return Ok(UpdateDecision::UpToDate);
        }

        let asset = rule
            .select(&candidate.assets, arch)
            .ok_or_else(|| UpdateError::NoMatchingAsset(rule.describe(arch)))?;

        Ok(UpdateDecision::Available(Update {
            name: candidate.name.clone(),
            url: asset.download_url.clone(),
            notes: candidate.notes.clone(),
        }))
    }

    /// RELEASES manifest of the latest release with absolute package URLs
    ///
    /// Served whether or not the client is current: differential updaters read the
    /// index to decide for themselves.
    pub async fn releases_manifest(
        &self,
        repo: &RepositoryId,
        platform: &str,
        version: &str,
    ) -> Result<String, UpdateError> {
        self.platforms.rule(platform)?;
        parse_version(version)?;

        let releases = self.fetch_releases(repo).await?;
        let candidate = latest_release(&releases)?;

        let manifest = self
            .fetcher
            .fetch_manifest(repo, &candidate.tag)
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => UpdateError::ManifestNotFound,
                other => UpdateError::Upstream(other),
            })?;

        let source = self.fetcher.source();
        Ok(rewrite_manifest(&manifest, |file_name| {
            source.download_url(repo, &candidate.tag, file_name)
        }))
    }

    async fn fetch_releases(&self, repo: &RepositoryId) -> Result<Arc<Vec<Release>>, UpdateError> {
        self.fetcher
            .fetch_releases(repo)
            .await
            .map_err(|e| match e {
                FetchError::NotFound(_) => UpdateError::RepositoryNotFound,
                other => UpdateError::Upstream(other),
            })
    }
}

/// Upstream lists newest first; the first entry is taken as-is without re-sorting.
fn latest_release(releases: &[Release]) -> Result<&Release, UpdateError> {
    releases.first().ok_or(UpdateError::NoReleases)
}
