//! Comment input, validated comment and the committed record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::hash::gravatar_hash;
use crate::github::error::PublishError;

/// Directory, relative to the content repository root, holding comment data.
pub const COMMENTS_ROOT: &str = "_data/comments";

/// A comment as submitted by a reader.
///
/// Every field is optional on the wire so that a missing field is reported
/// by [`CommentInput::validate`] rather than as a JSON decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    /// Site section the comment belongs to (e.g. a post slug).
    pub subdir: Option<String>,
    /// Comment text.
    pub comment: Option<String>,
    /// Optional email, only ever stored as its avatar hash.
    pub email: Option<String>,
    /// Display name of the commenter.
    pub name: Option<String>,
}

impl CommentInput {
    /// Convenience constructor used by the CLI and tests.
    #[must_use]
    pub fn new(
        subdir: impl Into<String>,
        comment: impl Into<String>,
        name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            subdir: Some(subdir.into()),
            comment: Some(comment.into()),
            email,
            name: Some(name.into()),
        }
    }

    /// Checks the required fields and the shape of `subdir`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidComment`] when `comment`, `name` or
    /// `subdir` is absent or blank, or when `subdir` would leave the
    /// comments directory.
    pub fn validate(self) -> Result<ValidComment, PublishError> {
        let comment = require("comment", self.comment)?;
        let name = require("name", self.name)?;
        let subdir = require("subdir", self.subdir)?.trim().to_owned();
        check_subdir(&subdir)?;

        let email = self.email.filter(|value| !value.trim().is_empty());

        Ok(ValidComment {
            subdir,
            comment,
            email,
            name,
        })
    }
}

fn require(field: &str, value: Option<String>) -> Result<String, PublishError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(PublishError::InvalidComment {
            message: format!("{field} is required"),
        }),
    }
}

fn check_subdir(subdir: &str) -> Result<(), PublishError> {
    let escapes = subdir.contains('\\')
        || subdir
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if escapes {
        return Err(PublishError::InvalidComment {
            message: format!("subdir {subdir:?} is not a relative directory path"),
        });
    }
    Ok(())
}

/// A submission whose required fields are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComment {
    subdir: String,
    comment: String,
    email: Option<String>,
    name: String,
}

impl ValidComment {
    /// Site section the comment belongs to.
    #[must_use]
    pub const fn subdir(&self) -> &str {
        self.subdir.as_str()
    }

    /// Display name of the commenter.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Comment identifier: `<epoch-millis>-<uuid>`.
///
/// Only digits, lowercase hex and hyphens appear, so the identifier is safe
/// in branch names and file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    /// Generates a fresh identifier for a comment created at `now`.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", now.timestamp_millis(), Uuid::new_v4()))
    }

    /// Borrow the identifier.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Branch created for this comment.
    #[must_use]
    pub fn branch_name(&self) -> BranchName {
        BranchName(format!("comment-{}", self.0))
    }

    /// Name of the data file holding this comment.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("entry{}.json", self.0)
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Name of the branch carrying one comment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Borrow the short branch name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Fully qualified reference name.
    #[must_use]
    pub fn ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// The record committed to the content repository.
///
/// Field order matches the committed JSON: `subdir`, `comment`, `email`,
/// `name`, `date`, `_id`. `email` holds the avatar hash, never the address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    subdir: String,
    comment: String,
    email: Option<String>,
    name: String,
    #[serde(rename = "date", with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(rename = "_id")]
    id: CommentId,
}

impl Comment {
    /// Stamps a validated submission with an identifier and creation time.
    #[must_use]
    pub fn new(valid: ValidComment, now: DateTime<Utc>) -> Self {
        let ValidComment {
            subdir,
            comment,
            email,
            name,
        } = valid;
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);

        Self {
            subdir,
            comment,
            email: email.as_deref().map(gravatar_hash),
            name,
            created_at,
            id: CommentId::generate(created_at),
        }
    }

    /// Comment identifier.
    #[must_use]
    pub const fn id(&self) -> &CommentId {
        &self.id
    }

    /// Site section the comment belongs to.
    #[must_use]
    pub const fn subdir(&self) -> &str {
        self.subdir.as_str()
    }

    /// Comment text.
    #[must_use]
    pub const fn comment(&self) -> &str {
        self.comment.as_str()
    }

    /// Display name of the commenter.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Avatar hash of the commenter's email, when one was given.
    #[must_use]
    pub fn email_hash(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Branch created for this comment.
    #[must_use]
    pub fn branch_name(&self) -> BranchName {
        self.id.branch_name()
    }

    /// Repository-relative path of the data file.
    #[must_use]
    pub fn file_path(&self) -> String {
        format!("{COMMENTS_ROOT}/{}/{}", self.subdir, self.id.file_name())
    }

    /// Commit message, reused as the pull request title.
    #[must_use]
    pub fn commit_message(&self) -> String {
        format!("New comment on {} from {}", self.subdir, self.name)
    }

    /// Pretty-printed JSON committed as the data file.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] if serialisation fails.
    pub fn to_pretty_json(&self) -> Result<String, PublishError> {
        serde_json::to_string_pretty(self).map_err(|error| PublishError::Io {
            message: format!("comment serialisation failed: {error}"),
        })
    }
}
