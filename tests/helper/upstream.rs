//! Mock upstream release host

use mockito::{Matcher, Server, ServerGuard};
use serde_json::{Value, json};

/// Build one upstream release entry
pub fn release_json(tag: &str, assets: &[&str]) -> Value {
    json!({
        "name": "name",
        "tag_name": tag,
        "body": "notes",
        "assets": assets
            .iter()
            .map(|name| json!({ "name": name, "browser_download_url": name }))
            .collect::<Vec<_>>(),
    })
}

/// Start a mock upstream serving both the releases API and the download host
pub async fn start_upstream() -> ServerGuard {
    let mut server = Server::new_async().await;

    let repos = [
        ("repo", json!([release_json("1.0.0", &["mac.zip", "win.exe"])])),
        ("repo-with-v", json!([release_json("v1.0.0", &["mac.zip"])])),
        ("repo-without-releases", json!([])),
        ("repo-darwin", json!([release_json("v1.0.0", &["darwin.zip"])])),
        (
            "repo-win32-zip",
            json!([release_json("v1.0.0", &["win32-ia32.zip", "win32-x64.zip"])]),
        ),
        (
            "repo-no-releases",
            json!([release_json("v1.0.0", &["win32-ia32.zip", "win32-x64.zip"])]),
        ),
    ];

    for (repo, releases) in repos {
        server
            .mock("GET", format!("/repos/owner/{}/releases", repo).as_str())
            .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(releases.to_string())
            .create_async()
            .await;
    }

    server
        .mock("GET", "/repos/owner/not-exist/releases")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;

    server
        .mock("GET", "/owner/repo/releases/download/1.0.0/RELEASES")
        .with_status(200)
        .with_body("HASH name.nupkg NUMBER")
        .create_async()
        .await;

    for repo in ["repo-with-v", "repo-darwin", "repo-win32-zip", "repo-no-releases"] {
        server
            .mock(
                "GET",
                format!("/owner/{}/releases/download/v1.0.0/RELEASES", repo).as_str(),
            )
            .with_status(404)
            .create_async()
            .await;
    }

    server
}
