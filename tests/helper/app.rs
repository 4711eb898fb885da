//! Router construction and request utilities

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use release_updates::server::create_router;
use release_updates::server::state::AppState;
use release_updates::update::cache::MemoryCache;
use release_updates::update::fetcher::ReleaseFetcher;
use release_updates::update::github::GitHubSource;
use release_updates::update::platform::PlatformMatcher;
use release_updates::update::resolver::UpdateResolver;

/// Create a router whose upstream API and download host are `upstream_url`
pub fn create_test_app(upstream_url: &str) -> Router {
    let source = GitHubSource::new(upstream_url, upstream_url, Some("token".to_string())).unwrap();
    let fetcher = ReleaseFetcher::new(Arc::new(source), Arc::new(MemoryCache::new()));
    let resolver = UpdateResolver::new(fetcher, PlatformMatcher::default());

    create_router(Arc::new(AppState::new(resolver)))
}

/// Issue a GET request and return the status and body text
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(body.to_vec()).unwrap())
}
