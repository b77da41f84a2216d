//! Error mapping helpers for the comment gateway.

use http::StatusCode;

use crate::github::error::PublishError;
use crate::github::schema::GitHubErrorBody;
use crate::github::transport::ApiResponse;

/// Checks if a GitHub error status indicates an authentication failure.
pub(super) const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks whether a 403/429 is GitHub throttling rather than a credential
/// problem, based on the message and documentation URL.
pub(super) fn is_rate_limit_error(status: StatusCode, body: &GitHubErrorBody) -> bool {
    let is_rate_limit_status = matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = body
        .message
        .as_deref()
        .is_some_and(|message| message.to_lowercase().contains("rate limit"))
        || body
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn extract_github_error(body: &str) -> GitHubErrorBody {
    serde_json::from_str(body).unwrap_or_default()
}

/// Maps a non-success response from one publish step onto an error.
///
/// Credential failures become [`PublishError::Authentication`] whatever the
/// step; everything else is wrapped by `step_error` so callers can tell
/// which stage GitHub refused.
pub(super) fn map_step_failure(
    operation: &str,
    response: &ApiResponse,
    step_error: fn(String) -> PublishError,
) -> PublishError {
    let github_error = extract_github_error(&response.body);
    let status = response.status;
    let message = github_error
        .message
        .clone()
        .unwrap_or_else(|| "unknown error".to_owned());

    if is_auth_failure(status) && !is_rate_limit_error(status, &github_error) {
        PublishError::Authentication {
            message: format!("{operation} failed: GitHub returned {status} {message}"),
        }
    } else {
        step_error(format!("{operation} failed with status {status}: {message}"))
    }
}

pub(super) const fn merge_failed(message: String) -> PublishError {
    PublishError::MergeFailed { message }
}

pub(super) const fn branch_create_failed(message: String) -> PublishError {
    PublishError::BranchCreateFailed { message }
}

pub(super) const fn file_commit_failed(message: String) -> PublishError {
    PublishError::FileCommitFailed { message }
}

pub(super) const fn pull_request_create_failed(message: String) -> PublishError {
    PublishError::PullRequestCreateFailed { message }
}

pub(super) const fn api_failed(message: String) -> PublishError {
    PublishError::Api { message }
}
