//! Typed request payloads and response schemas for the endpoints used while
//! publishing a comment.

use serde::{Deserialize, Serialize};

/// Body of `POST /repos/{owner}/{repo}/merges`.
#[derive(Debug, Clone, Serialize)]
pub struct MergeRequest<'a> {
    /// Branch receiving the merge.
    pub base: &'a str,
    /// Branch or `owner:branch` being merged in.
    pub head: &'a str,
    /// Message for the merge commit, when one is needed.
    pub commit_message: &'a str,
}

/// Successful merge (201). A 204 carries no body.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeResult {
    /// The merge commit.
    pub sha: String,
}

/// Git reference returned by `GET .../git/refs/heads/{branch}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    /// Fully qualified reference name.
    #[serde(rename = "ref")]
    pub name: String,
    /// Object the reference points at.
    pub object: GitObject,
}

/// Commit object a reference points at.
#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    /// Commit hash.
    pub sha: String,
}

/// Body of `POST /repos/{owner}/{repo}/git/refs`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRefRequest<'a> {
    /// Fully qualified reference name (`refs/heads/...`).
    #[serde(rename = "ref")]
    pub name: &'a str,
    /// Commit the new reference points at.
    pub sha: &'a str,
}

/// Body of `PUT /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateContentRequest<'a> {
    /// Commit message.
    pub message: &'a str,
    /// Base64-encoded file content.
    pub content: String,
    /// Branch the commit lands on.
    pub branch: &'a str,
}

/// Response to a content create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentCreated {
    /// The stored file.
    pub content: ContentEntry,
    /// The commit that stored it.
    pub commit: CommitEntry,
}

/// File metadata within [`ContentCreated`].
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    /// Repository-relative path.
    pub path: String,
    /// Blob hash.
    pub sha: String,
}

/// Commit metadata within [`ContentCreated`].
#[derive(Debug, Clone, Deserialize)]
pub struct CommitEntry {
    /// Commit hash.
    pub sha: String,
    /// Browser URL of the commit.
    pub html_url: Option<String>,
}

/// Body of `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePullRequest {
    /// Pull request title.
    pub title: String,
    /// Markdown description.
    pub body: String,
    /// `owner:branch` holding the changes.
    pub head: String,
    /// Branch the changes should be merged into.
    pub base: String,
}

/// Response to pull request creation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestCreated {
    /// Pull request number in the destination repository.
    pub number: u64,
    /// Browser URL of the pull request.
    pub html_url: Option<String>,
}

/// Error envelope GitHub returns with 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubErrorBody {
    /// Human readable failure.
    pub message: Option<String>,
    /// Link to the relevant API documentation.
    pub documentation_url: Option<String>,
}
