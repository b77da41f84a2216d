//! Error types exposed by the comment publishing pipeline.

use thiserror::Error;

/// Errors surfaced while validating a comment or talking to GitHub.
///
/// The step variants (`MergeFailed`, `BranchCreateFailed`, `FileCommitFailed`,
/// `PullRequestCreateFailed`) identify which stage of the publish sequence
/// GitHub rejected, so callers never have to guess from a message string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The submitted comment failed validation.
    #[error("invalid comment: {message}")]
    InvalidComment {
        /// Which field was rejected and why.
        message: String,
    },

    /// The inbound event body was not valid JSON for a comment.
    #[error("invalid event body: {message}")]
    InvalidEvent {
        /// Decoder error detail.
        message: String,
    },

    /// The authentication token was missing.
    #[error("GitHub token is required")]
    MissingToken,

    /// Configuration could not be loaded or is incomplete.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL (API base or request path) could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The credentials were rejected by GitHub.
    #[error("GitHub rejected the credentials: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned an error outside the publish steps (e.g. rollback).
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A 2xx response did not match the expected schema.
    #[error("{operation} returned an unexpected response: {message}")]
    MalformedResponse {
        /// The API step whose response could not be decoded.
        operation: String,
        /// Decoder error detail.
        message: String,
    },

    /// Syncing the source repository with the destination failed.
    #[error("fast-forward failed: {message}")]
    MergeFailed {
        /// Status and GitHub message.
        message: String,
    },

    /// Looking up the base branch or creating the comment branch failed.
    #[error("branch creation failed: {message}")]
    BranchCreateFailed {
        /// Status and GitHub message.
        message: String,
    },

    /// Committing the comment file failed.
    #[error("comment file commit failed: {message}")]
    FileCommitFailed {
        /// Status and GitHub message.
        message: String,
    },

    /// Opening the pull request failed.
    #[error("pull request creation failed: {message}")]
    PullRequestCreateFailed {
        /// Status and GitHub message.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}
