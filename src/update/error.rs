use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache task failed: {0}")]
    Task(String),
}

/// Upstream failure. `Clone` so concurrent callers can share one in-flight result.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        FetchError::Network(error.to_string())
    }
}

/// Everything an update request can fail with.
///
/// Display strings of client errors are shown to end users verbatim.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Invalid SemVer: \"{0}\"")]
    InvalidVersion(String),

    #[error("Unsupported platform: \"{platform}\". Supported: {supported}.")]
    UnsupportedPlatform { platform: String, supported: String },

    #[error("Unsupported architecture: \"{arch}\". Supported: {supported}.")]
    UnsupportedArch { arch: String, supported: String },

    #[error("Repository not found")]
    RepositoryNotFound,

    #[error("No releases found")]
    NoReleases,

    #[error("No updates found ({0})")]
    NoMatchingAsset(String),

    #[error("RELEASES manifest not found")]
    ManifestNotFound,

    #[error("Upstream request failed")]
    Upstream(#[source] FetchError),
}

impl UpdateError {
    /// Only upstream failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, UpdateError::Upstream(_))
    }
}
