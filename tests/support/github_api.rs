//! Wiremock stand-ins for the GitHub endpoints a publish run touches.

use marginalia::{CommentPublisher, HttpTransport, MarginaliaConfig, PublishError};
use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "comment-bot";
pub const TOKEN: &str = "ghp_integration";
pub const PULL_NUMBER: u64 = 12;

/// Which step the fake API should refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    None,
    Merge(u16),
    FileCommit,
    PullRequest,
}

/// Mounts every publish endpoint, failing the step named by `rejection`.
///
/// All mocks require the bot's basic-auth credentials and user agent, so a
/// request without them falls through to Wiremock's 404.
pub async fn mount_github(server: &MockServer, rejection: Rejection) {
    let merge = match rejection {
        Rejection::Merge(status) => {
            ResponseTemplate::new(status).set_body_json(json!({ "message": "Merge conflict" }))
        }
        _ => ResponseTemplate::new(201).set_body_json(json!({ "sha": "merge-sha" })),
    };
    authenticated("POST", "/repos/comment-bot/blog/merges")
        .respond_with(merge)
        .mount(server)
        .await;

    authenticated("GET", "/repos/comment-bot/blog/git/refs/heads/master")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/master",
            "object": { "sha": "base-sha", "type": "commit" }
        })))
        .mount(server)
        .await;

    authenticated("POST", "/repos/comment-bot/blog/git/refs")
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/comment-branch",
            "object": { "sha": "base-sha", "type": "commit" }
        })))
        .mount(server)
        .await;

    let content = if rejection == Rejection::FileCommit {
        ResponseTemplate::new(409).set_body_json(json!({ "message": "sha mismatch" }))
    } else {
        ResponseTemplate::new(201).set_body_json(json!({
            "content": { "path": "_data/comments/sqlite/entry.json", "sha": "blob-sha" },
            "commit": { "sha": "commit-sha", "html_url": "https://github.com/comment-bot/blog/commit/commit-sha" }
        }))
    };
    Mock::given(method("PUT"))
        .and(path_regex(
            r"^/repos/comment-bot/blog/contents/_data/comments/sqlite/entry[0-9a-f-]+\.json$",
        ))
        .and(basic_auth(USERNAME, TOKEN))
        .respond_with(content)
        .mount(server)
        .await;

    let pull = if rejection == Rejection::PullRequest {
        ResponseTemplate::new(422).set_body_json(json!({ "message": "Validation Failed" }))
    } else {
        ResponseTemplate::new(201).set_body_json(json!({
            "number": PULL_NUMBER,
            "html_url": format!("https://github.com/octocat/blog/pull/{PULL_NUMBER}")
        }))
    };
    authenticated("POST", "/repos/octocat/blog/pulls")
        .respond_with(pull)
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"^/repos/comment-bot/blog/git/refs/heads/comment-"))
        .and(basic_auth(USERNAME, TOKEN))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
}

fn authenticated(verb: &str, route: &str) -> wiremock::MockBuilder {
    Mock::given(method(verb))
        .and(path(route.to_owned()))
        .and(basic_auth(USERNAME, TOKEN))
        .and(header("user-agent", USERNAME))
}

/// Builds a publisher through the same configuration path the binary uses.
///
/// # Errors
///
/// Returns the configuration or transport error if the publisher cannot be
/// built.
pub fn publisher_for(api_base: &str) -> Result<CommentPublisher<HttpTransport>, PublishError> {
    let config = MarginaliaConfig {
        token: Some(TOKEN.to_owned()),
        username: Some(USERNAME.to_owned()),
        source_owner: Some("comment-bot".to_owned()),
        source_repo: Some("blog".to_owned()),
        destination_owner: Some("octocat".to_owned()),
        destination_repo: Some("blog".to_owned()),
        api_base: api_base.to_owned(),
        request_timeout_seconds: 5,
        ..MarginaliaConfig::default()
    };
    config.publish_settings()?.publisher()
}

/// `METHOD path` for every request the fake API received, in order.
pub async fn received_lines(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| format!("{} {}", request.method, request.url.path()))
        .collect()
}
