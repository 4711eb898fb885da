//! Request handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::server::state::AppState;
use crate::update::error::UpdateError;
use crate::update::types::{RepositoryId, UpdateDecision};

/// Path of update routes: `/:owner/:repo/:platform/:version`
type UpdatePath = Path<(String, String, String, String)>;

/// Known query parameters; anything else is ignored
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    pub arch: Option<String>,
}

/// Liveness check
pub async fn health() -> &'static str {
    "OK"
}

/// `GET /:owner/:repo/:platform/:version`
pub async fn check_update(
    State(state): State<Arc<AppState>>,
    Path((owner, name, platform, version)): UpdatePath,
    Query(query): Query<UpdateQuery>,
) -> Result<Response, UpdateError> {
    let repo = RepositoryId::new(owner, name);

    let response = match state
        .resolver
        .check_update(&repo, &platform, &version, query.arch.as_deref())
        .await?
    {
        UpdateDecision::Available(update) => Json(update).into_response(),
        UpdateDecision::UpToDate => StatusCode::NO_CONTENT.into_response(),
    };

    Ok(response)
}

/// `GET /:owner/:repo/:platform/:version/RELEASES`
pub async fn releases_manifest(
    State(state): State<Arc<AppState>>,
    Path((owner, name, platform, version)): UpdatePath,
) -> Result<String, UpdateError> {
    let repo = RepositoryId::new(owner, name);

    state
        .resolver
        .releases_manifest(&repo, &platform, &version)
        .await
}
