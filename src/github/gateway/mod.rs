//! GitHub operations needed to publish a comment.
//!
//! Each method performs exactly one API step, checks the status code the
//! endpoint documents for success, and decodes the body against a typed
//! schema. A rejected step surfaces as the matching [`PublishError`] variant
//! instead of being passed along as an unread body.

mod error_mapping;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;

use crate::comment::BranchName;
use crate::github::error::PublishError;
use crate::github::locator::{RepositoryPair, RepositoryRef};
use crate::github::schema::{
    ContentCreated, CreateContentRequest, CreatePullRequest, CreateRefRequest, GitRef,
    MergeRequest, MergeResult, PullRequestCreated,
};
use crate::github::transport::{ApiRequest, ApiResponse, Transport, encode_path};

use error_mapping::{
    api_failed, branch_create_failed, file_commit_failed, map_step_failure, merge_failed,
    pull_request_create_failed,
};

/// Default branch comments are based on and merged into.
pub const DEFAULT_BASE_BRANCH: &str = "master";

/// Outcome of syncing the source repository with the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastForward {
    /// GitHub recorded a merge commit.
    Merged {
        /// The merge commit.
        sha: String,
    },
    /// The source already contained the destination's base branch.
    UpToDate,
}

/// Publishes comment branches, files and pull requests over a [`Transport`].
#[derive(Debug)]
pub struct CommentGateway<T> {
    transport: T,
    repositories: RepositoryPair,
    base_branch: String,
}

impl<T> CommentGateway<T>
where
    T: Transport,
{
    /// Creates a gateway for `repositories`, branching from `base_branch`.
    #[must_use]
    pub fn new(transport: T, repositories: RepositoryPair, base_branch: impl Into<String>) -> Self {
        Self {
            transport,
            repositories,
            base_branch: base_branch.into(),
        }
    }

    /// The source and destination repositories.
    #[must_use]
    pub const fn repositories(&self) -> &RepositoryPair {
        &self.repositories
    }

    /// Branch comments start from and pull requests target.
    #[must_use]
    pub const fn base_branch(&self) -> &str {
        self.base_branch.as_str()
    }

    /// Merges the destination's base branch into the source's base branch.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MergeFailed`] for any status other than
    /// 201 or 204 (for example a 409 merge conflict).
    pub async fn fast_forward(&self) -> Result<FastForward, PublishError> {
        const OPERATION: &str = "fast-forward";
        let head = format!(
            "{}:{}",
            self.repositories.destination.owner().as_str(),
            self.base_branch
        );
        let commit_message = format!("Sync {} from {}", self.base_branch, head);
        let payload = MergeRequest {
            base: &self.base_branch,
            head: &head,
            commit_message: &commit_message,
        };
        let path = repo_path(&self.repositories.source, &["merges"])?;
        let response = self
            .transport
            .send(ApiRequest::post_json(path, &payload)?)
            .await?;

        match response.status {
            StatusCode::NO_CONTENT => Ok(FastForward::UpToDate),
            StatusCode::CREATED => {
                let merged: MergeResult = response.json(OPERATION)?;
                Ok(FastForward::Merged { sha: merged.sha })
            }
            _ => Err(map_step_failure(OPERATION, &response, merge_failed)),
        }
    }

    /// Reads the commit the source repository's base branch points at.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::BranchCreateFailed`] when the lookup is
    /// rejected and [`PublishError::MalformedResponse`] when the reference
    /// carries no `object.sha`.
    pub async fn base_sha(&self) -> Result<String, PublishError> {
        const OPERATION: &str = "base branch lookup";
        let path = repo_path(
            &self.repositories.source,
            &["git", "refs", "heads", &self.base_branch],
        )?;
        let response = self.transport.send(ApiRequest::get(path)).await?;
        let reference: GitRef = expect_success(
            OPERATION,
            &response,
            branch_create_failed,
        )?;
        Ok(reference.object.sha)
    }

    /// Creates `branch` in the source repository at `sha`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::BranchCreateFailed`] for any status other
    /// than 201 (for example because the reference already exists), and
    /// [`PublishError::MalformedResponse`] when a 201 body cannot be read
    /// back. In the latter case the branch exists.
    pub async fn create_branch(&self, branch: &BranchName, sha: &str) -> Result<(), PublishError> {
        const OPERATION: &str = "branch creation";
        let ref_name = branch.ref_path();
        let payload = CreateRefRequest {
            name: &ref_name,
            sha,
        };
        let path = repo_path(&self.repositories.source, &["git", "refs"])?;
        let response = self
            .transport
            .send(ApiRequest::post_json(path, &payload)?)
            .await?;
        if response.status != StatusCode::CREATED {
            return Err(map_step_failure(OPERATION, &response, branch_create_failed));
        }
        let created: GitRef = response.json(OPERATION)?;
        tracing::debug!(reference = %created.name, sha = %created.object.sha, "branch created");
        Ok(())
    }

    /// Commits `content` at `file_path` on `branch` in the source repository.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::FileCommitFailed`] when GitHub refuses the
    /// content write.
    pub async fn create_comment_file(
        &self,
        branch: &BranchName,
        file_path: &str,
        message: &str,
        content: &[u8],
    ) -> Result<ContentCreated, PublishError> {
        const OPERATION: &str = "comment file commit";
        let payload = CreateContentRequest {
            message,
            content: STANDARD.encode(content),
            branch: branch.as_str(),
        };
        let mut segments = vec!["contents"];
        segments.extend(file_path.split('/'));
        let path = repo_path(&self.repositories.source, &segments)?;
        let response = self
            .transport
            .send(ApiRequest::put_json(path, &payload)?)
            .await?;
        expect_success(OPERATION, &response, file_commit_failed)
    }

    /// Opens a pull request from `branch` in the source repository into the
    /// destination's base branch.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::PullRequestCreateFailed`] when GitHub refuses
    /// the pull request.
    pub async fn create_pull_request(
        &self,
        branch: &BranchName,
        title: &str,
        body: &str,
    ) -> Result<PullRequestCreated, PublishError> {
        const OPERATION: &str = "pull request creation";
        let payload = CreatePullRequest {
            title: title.to_owned(),
            body: body.to_owned(),
            head: format!(
                "{}:{}",
                self.repositories.source.owner().as_str(),
                branch.as_str()
            ),
            base: self.base_branch.clone(),
        };
        let path = repo_path(&self.repositories.destination, &["pulls"])?;
        let response = self
            .transport
            .send(ApiRequest::post_json(path, &payload)?)
            .await?;
        expect_success(OPERATION, &response, pull_request_create_failed)
    }

    /// Deletes `branch` from the source repository.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Api`] when GitHub refuses the deletion.
    pub async fn delete_branch(&self, branch: &BranchName) -> Result<(), PublishError> {
        let path = repo_path(
            &self.repositories.source,
            &["git", "refs", "heads", branch.as_str()],
        )?;
        let response = self.transport.send(ApiRequest::delete(path)).await?;
        if response.status.is_success() {
            Ok(())
        } else {
            Err(map_step_failure("branch deletion", &response, api_failed))
        }
    }
}

fn repo_path(repository: &RepositoryRef, rest: &[&str]) -> Result<String, PublishError> {
    encode_path(repository.segments().into_iter().chain(rest.iter().copied()))
}

fn expect_success<R>(
    operation: &str,
    response: &ApiResponse,
    step_error: fn(String) -> PublishError,
) -> Result<R, PublishError>
where
    R: serde::de::DeserializeOwned,
{
    if response.status.is_success() {
        response.json(operation)
    } else {
        Err(map_step_failure(operation, response, step_error))
    }
}

#[cfg(test)]
mod tests;
