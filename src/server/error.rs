//! HTTP mapping of update errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::update::error::UpdateError;

impl UpdateError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidVersion(_) | Self::UnsupportedArch { .. } => StatusCode::BAD_REQUEST,
            Self::UnsupportedPlatform { .. }
            | Self::RepositoryNotFound
            | Self::NoReleases
            | Self::NoMatchingAsset(_)
            | Self::ManifestNotFound => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        if let Self::Upstream(source) = &self {
            error!("Upstream request failed: {}", source);
        }

        (self.status_code(), self.to_string()).into_response()
    }
}
