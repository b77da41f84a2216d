//! The publish sequence that turns a submission into a pull request.
//!
//! Steps run strictly in order, each waiting for the previous round trip:
//! fast-forward the source repository, branch from its base, commit the
//! comment file, open the pull request. A failure before the branch exists
//! simply aborts. A failure after it, or a branch creation whose outcome is
//! unknown, deletes the branch again so that no orphan is left behind in the
//! source repository.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::Instrument;

use crate::comment::{BranchName, Comment, CommentInput};
use crate::github::error::PublishError;
use crate::github::gateway::{CommentGateway, FastForward};
use crate::github::transport::Transport;

/// States of one publish run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    /// The submission passed validation.
    Validated,
    /// The comment record exists locally.
    Constructed,
    /// The source repository is level with the destination.
    FastForwarded,
    /// The comment branch exists in the source repository.
    Branched,
    /// The comment file is committed on the branch.
    FileCommitted,
    /// The pull request is open. Terminal.
    PullRequestCreated,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Validated => "validated",
            Self::Constructed => "constructed",
            Self::FastForwarded => "fast_forwarded",
            Self::Branched => "branched",
            Self::FileCommitted => "file_committed",
            Self::PullRequestCreated => "pull_request_created",
        };
        formatter.write_str(label)
    }
}

/// Publishes comments through a [`CommentGateway`].
#[derive(Debug)]
pub struct CommentPublisher<T> {
    gateway: CommentGateway<T>,
}

impl<T> CommentPublisher<T>
where
    T: Transport,
{
    /// Creates a publisher over `gateway`.
    #[must_use]
    pub const fn new(gateway: CommentGateway<T>) -> Self {
        Self { gateway }
    }

    /// The gateway used for every API step.
    #[must_use]
    pub const fn gateway(&self) -> &CommentGateway<T> {
        &self.gateway
    }

    /// Validates `input`, then publishes it as a pull request.
    ///
    /// Returns the committed [`Comment`]; the pull request URL is logged.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidComment`] before any network call when
    /// a required field is missing. Otherwise returns the error of the first
    /// step that failed; see [`CommentGateway`] for the per-step variants.
    pub async fn add_comment(&self, input: CommentInput) -> Result<Comment, PublishError> {
        let valid = input.validate()?;
        let comment = Comment::new(valid, Utc::now());

        let span = tracing::info_span!(
            "add_comment",
            comment_id = %comment.id(),
            subdir = comment.subdir(),
        );
        self.publish(comment).instrument(span).await
    }

    async fn publish(&self, comment: Comment) -> Result<Comment, PublishError> {
        tracing::debug!(stage = %PublishStage::Constructed, "comment constructed");

        let content = comment.to_pretty_json()?;
        let title = comment.commit_message();
        let body = pull_request_body(&comment)?;
        let branch = comment.branch_name();

        match self.gateway.fast_forward().await? {
            FastForward::Merged { sha } => {
                tracing::info!(stage = %PublishStage::FastForwarded, %sha, "source synced with destination");
            }
            FastForward::UpToDate => {
                tracing::info!(stage = %PublishStage::FastForwarded, "source already up to date");
            }
        }

        let sha = self.gateway.base_sha().await?;
        if let Err(error) = self.gateway.create_branch(&branch, &sha).await {
            return Err(if branch_may_exist(&error) {
                self.roll_back(&branch, PublishStage::FastForwarded, error)
                    .await
            } else {
                error
            });
        }
        tracing::info!(stage = %PublishStage::Branched, %branch, %sha, "comment branch created");

        if let Err(error) = self
            .gateway
            .create_comment_file(&branch, &comment.file_path(), &title, content.as_bytes())
            .await
        {
            return Err(self.roll_back(&branch, PublishStage::Branched, error).await);
        }
        tracing::info!(
            stage = %PublishStage::FileCommitted,
            path = %comment.file_path(),
            "comment file committed"
        );

        let pull_request = match self.gateway.create_pull_request(&branch, &title, &body).await {
            Ok(created) => created,
            Err(error) => {
                return Err(self.roll_back(&branch, PublishStage::FileCommitted, error).await);
            }
        };
        tracing::info!(
            stage = %PublishStage::PullRequestCreated,
            number = pull_request.number,
            url = pull_request.html_url.as_deref().unwrap_or("unknown"),
            "pull request opened"
        );

        Ok(comment)
    }

    /// Deletes the comment branch after a later step failed and hands the
    /// original error back.
    async fn roll_back(
        &self,
        branch: &BranchName,
        reached: PublishStage,
        error: PublishError,
    ) -> PublishError {
        tracing::warn!(stage = %reached, %branch, %error, "publish failed; deleting comment branch");
        match self.gateway.delete_branch(branch).await {
            Ok(()) => tracing::info!(%branch, "comment branch deleted"),
            Err(rollback_error) => {
                tracing::warn!(%branch, error = %rollback_error, "failed to delete comment branch");
            }
        }
        error
    }
}

/// A 201 whose body could not be read, or a request that died in flight,
/// may still have created the branch.
const fn branch_may_exist(error: &PublishError) -> bool {
    matches!(
        error,
        PublishError::MalformedResponse { .. } | PublishError::Network { .. }
    )
}

#[derive(Debug, Serialize)]
struct PullRequestSummary<'a> {
    name: &'a str,
    message: &'a str,
    date: String,
}

/// Markdown body of the pull request: an intro line and the comment as a
/// fenced JSON block.
///
/// # Errors
///
/// Returns [`PublishError::Io`] if the summary cannot be serialised.
pub fn pull_request_body(comment: &Comment) -> Result<String, PublishError> {
    let summary = PullRequestSummary {
        name: comment.name(),
        message: comment.comment(),
        date: comment
            .created_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    let json = serde_json::to_string_pretty(&summary).map_err(|error| PublishError::Io {
        message: format!("pull request summary serialisation failed: {error}"),
    })?;

    Ok(format!(
        "New comment on `{}` from {}.\n\n```json\n{json}\n```\n",
        comment.subdir(),
        comment.name()
    ))
}
