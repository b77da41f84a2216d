//! Scripted transport and canned GitHub responses for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use http::StatusCode;
use serde_json::json;

use super::error::PublishError;
use super::transport::{ApiRequest, ApiResponse, Transport};

/// Transport that replays queued responses and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, PublishError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    /// Queues `responses` to be returned in order.
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = Result<ApiResponse, PublishError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `METHOD path` for each request received so far.
    #[must_use]
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PublishError> {
        let line = format!("{} {}", request.method, request.path);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(PublishError::Network {
                    message: format!("no scripted response for {line}"),
                })
            })
    }
}

/// `201 Created` from the merges endpoint.
#[must_use]
pub fn merged() -> ApiResponse {
    ApiResponse::new(StatusCode::CREATED, json!({ "sha": "merge-sha" }).to_string())
}

/// `204 No Content` from the merges endpoint.
#[must_use]
pub fn already_up_to_date() -> ApiResponse {
    ApiResponse::new(StatusCode::NO_CONTENT, "")
}

/// Reference lookup for `refs/heads/master` pointing at `sha`.
#[must_use]
pub fn base_ref(sha: &str) -> ApiResponse {
    ApiResponse::new(
        StatusCode::OK,
        json!({
            "ref": "refs/heads/master",
            "object": { "sha": sha, "type": "commit" }
        })
        .to_string(),
    )
}

/// Reference creation echoing a generic branch.
#[must_use]
pub fn ref_created(sha: &str) -> ApiResponse {
    ApiResponse::new(
        StatusCode::CREATED,
        json!({
            "ref": "refs/heads/comment",
            "object": { "sha": sha, "type": "commit" }
        })
        .to_string(),
    )
}

/// Content creation for an arbitrary path.
#[must_use]
pub fn content_created() -> ApiResponse {
    ApiResponse::new(
        StatusCode::CREATED,
        json!({
            "content": { "path": "_data/comments/entry.json", "sha": "blob-sha" },
            "commit": { "sha": "commit-sha", "html_url": "https://github.com/commit" }
        })
        .to_string(),
    )
}

/// Pull request creation with the given number.
#[must_use]
pub fn pull_created(number: u64) -> ApiResponse {
    ApiResponse::new(
        StatusCode::CREATED,
        json!({
            "number": number,
            "html_url": format!("https://github.com/upstream/site/pull/{number}")
        })
        .to_string(),
    )
}

/// `204 No Content` from a reference deletion.
#[must_use]
pub fn ref_deleted() -> ApiResponse {
    ApiResponse::new(StatusCode::NO_CONTENT, "")
}

/// A GitHub error envelope with `status` and `message`.
#[must_use]
pub fn github_error(status: StatusCode, message: &str) -> ApiResponse {
    ApiResponse::new(status, json!({ "message": message }).to_string())
}
