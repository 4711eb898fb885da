//! GitHub Releases API source implementation

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::update::error::FetchError;
use crate::update::source::ReleaseSource;
use crate::update::types::{Release, RepositoryId};

/// Default base URL for GitHub API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default host serving release downloads
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// Source implementation for GitHub Releases
pub struct GitHubSource {
    client: reqwest::Client,
    api_base_url: String,
    download_base_url: String,
    token: Option<String>,
}

impl GitHubSource {
    /// Creates a new GitHubSource against custom hosts
    pub fn new(
        api_base_url: &str,
        download_base_url: &str,
        token: Option<String>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("release-updates/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS as u64))
            .build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            download_base_url: download_base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

/// Map a non-success status to the matching fetch error
fn status_error(response: &reqwest::Response, what: &str) -> Option<FetchError> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Some(FetchError::NotFound(what.to_string()));
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Some(FetchError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !status.is_success() {
        warn!("Upstream returned status {}: {}", status, response.url());
        return Some(FetchError::InvalidResponse(format!(
            "Unexpected status: {}",
            status
        )));
    }

    None
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubSource {
    async fn fetch_releases(&self, repo: &RepositoryId) -> Result<Vec<Release>, FetchError> {
        let url = format!("{}/repos/{}/releases?per_page=100", self.api_base_url, repo);
        info!("Fetching releases for {}", repo);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if let Some(error) = status_error(&response, &repo.to_string()) {
            return Err(error);
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse releases response for {}: {}", repo, e);
            FetchError::InvalidResponse(e.to_string())
        })
    }

    async fn fetch_manifest(&self, repo: &RepositoryId, tag: &str) -> Result<String, FetchError> {
        let url = self.download_url(repo, tag, "RELEASES");
        info!("Fetching RELEASES manifest for {}@{}", repo, tag);

        // The download host gets no credential
        let response = self.client.get(&url).send().await?;

        if let Some(error) = status_error(&response, &format!("{}@{}", repo, tag)) {
            return Err(error);
        }

        Ok(response.text().await?)
    }

    fn download_url(&self, repo: &RepositoryId, tag: &str, file_name: &str) -> String {
        format!(
            "{}/{}/releases/download/{}/{}",
            self.download_base_url, repo, tag, file_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn source(server: &mockito::ServerGuard, token: Option<&str>) -> GitHubSource {
        GitHubSource::new(&server.url(), &server.url(), token.map(str::to_string)).unwrap()
    }

    #[tokio::test]
    async fn fetch_releases_returns_releases_in_upstream_order() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"name": "two", "tag_name": "v2.0.0", "body": "b", "assets": []},
                    {"name": "one", "tag_name": "v1.0.0", "body": null, "assets": [
                        {"name": "mac.zip", "browser_download_url": "https://dl/mac.zip"}
                    ]}
                ]"#,
            )
            .create_async()
            .await;

        let releases = source(&server, None)
            .fetch_releases(&RepositoryId::new("owner", "repo"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            releases.iter().map(|r| r.tag.as_str()).collect::<Vec<_>>(),
            vec!["v2.0.0", "v1.0.0"]
        );
        assert_eq!(releases[1].notes, "");
        assert_eq!(releases[1].assets[0].download_url, "https://dl/mac.zip");
    }

    #[tokio::test]
    async fn fetch_releases_forwards_bearer_token() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let releases = source(&server, Some("secret"))
            .fetch_releases(&RepositoryId::new("owner", "repo"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(releases.is_empty());
    }

    #[tokio::test]
    async fn fetch_releases_returns_not_found_for_nonexistent_repo() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/not-exist/releases")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let result = source(&server, None)
            .fetch_releases(&RepositoryId::new("owner", "not-exist"))
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_releases_returns_rate_limited_for_429() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "60")
            .create_async()
            .await;

        let result = source(&server, None)
            .fetch_releases(&RepositoryId::new("owner", "repo"))
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(FetchError::RateLimited {
                retry_after_secs: Some(60)
            })
        ));
    }

    #[tokio::test]
    async fn fetch_releases_returns_invalid_response_for_server_error() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/owner/repo/releases")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let result = source(&server, None)
            .fetch_releases(&RepositoryId::new("owner", "repo"))
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn fetch_manifest_reads_tag_scoped_path_without_credentials() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/owner/repo/releases/download/v1.0.0/RELEASES")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("HASH name.nupkg 123")
            .create_async()
            .await;

        let manifest = source(&server, Some("secret"))
            .fetch_manifest(&RepositoryId::new("owner", "repo"), "v1.0.0")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(manifest, "HASH name.nupkg 123");
    }

    #[test]
    fn download_url_points_at_tag_scoped_path() {
        let source = GitHubSource::new(DEFAULT_API_BASE_URL, "https://github.com/", None).unwrap();

        assert_eq!(
            source.download_url(&RepositoryId::new("owner", "repo"), "v1.0.0", "app.nupkg"),
            "https://github.com/owner/repo/releases/download/v1.0.0/app.nupkg"
        );
    }

    #[tokio::test]
    async fn fetch_manifest_returns_not_found_for_missing_manifest() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/owner/repo/releases/download/v1.0.0/RELEASES")
            .with_status(404)
            .create_async()
            .await;

        let result = source(&server, None)
            .fetch_manifest(&RepositoryId::new("owner", "repo"), "v1.0.0")
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }
}
