//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach. The result is turned into an
//! immutable [`PublishSettings`] once at start-up; nothing downstream reads
//! the environment.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.marginalia.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `MARGINALIA_*`, plus the legacy
//!    `GITHUB_TOKEN` for the token
//! 4. **Command-line arguments**
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! username = "comment-bot"
//! source_owner = "comment-bot"
//! source_repo = "blog"
//! destination_owner = "octocat"
//! destination_repo = "blog"
//! base_branch = "master"
//! ```

use std::env;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::comment::CommentInput;
use crate::github::error::PublishError;
use crate::github::gateway::{CommentGateway, DEFAULT_BASE_BRANCH};
use crate::github::locator::{
    Credentials, DEFAULT_API_BASE, PersonalAccessToken, RepositoryPair, RepositoryRef,
};
use crate::github::transport::HttpTransport;
use crate::publish::CommentPublisher;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `MARGINALIA_TOKEN`, `GITHUB_TOKEN`, or `--token`: GitHub token
/// - `MARGINALIA_USERNAME` or `--username`: GitHub login (also the user agent)
/// - `MARGINALIA_SOURCE_OWNER` / `MARGINALIA_SOURCE_REPO`: the fork that
///   receives comment branches
/// - `MARGINALIA_DESTINATION_OWNER` / `MARGINALIA_DESTINATION_REPO`: the
///   repository pull requests are opened against
///
/// # Example
///
/// ```no_run
/// use marginalia::MarginaliaConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = MarginaliaConfig::load().expect("failed to load configuration");
/// let settings = config.publish_settings().expect("incomplete configuration");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "MARGINALIA",
    discovery(
        dotfile_name = ".marginalia.toml",
        config_file_name = "marginalia.toml",
        app_name = "marginalia"
    )
)]
pub struct MarginaliaConfig {
    /// Personal access token used as the basic-auth password.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `MARGINALIA_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// GitHub login used for basic auth and as the `User-Agent`.
    ///
    /// Can be provided via:
    /// - CLI: `--username <LOGIN>` or `-u <LOGIN>`
    /// - Environment: `MARGINALIA_USERNAME`
    /// - Config file: `username = "..."`
    #[ortho_config(cli_short = 'u')]
    pub username: Option<String>,

    /// Owner of the repository comment branches are pushed to.
    #[ortho_config(cli_short = 'o')]
    pub source_owner: Option<String>,

    /// Name of the repository comment branches are pushed to.
    #[ortho_config(cli_short = 'r')]
    pub source_repo: Option<String>,

    /// Owner of the repository pull requests are opened against.
    #[ortho_config(cli_short = 'O')]
    pub destination_owner: Option<String>,

    /// Name of the repository pull requests are opened against.
    #[ortho_config(cli_short = 'R')]
    pub destination_repo: Option<String>,

    /// GitHub API base URL. Override for GitHub Enterprise
    /// (`https://host/api/v3`).
    #[ortho_config(cli_short = 'a')]
    pub api_base: String,

    /// Branch comments start from and pull requests target.
    #[ortho_config(cli_short = 'b')]
    pub base_branch: String,

    /// Per-request timeout in seconds; `0` disables it.
    #[ortho_config(cli_short = 'T')]
    pub request_timeout_seconds: u64,

    /// Site section for a one-shot comment.
    #[ortho_config(cli_short = 's')]
    pub subdir: Option<String>,

    /// Text of a one-shot comment.
    #[ortho_config(cli_short = 'c')]
    pub comment: Option<String>,

    /// Display name for a one-shot comment.
    #[ortho_config(cli_short = 'n')]
    pub name: Option<String>,

    /// Email for a one-shot comment; stored only as its avatar hash.
    #[ortho_config(cli_short = 'e')]
    pub email: Option<String>,

    /// Raw HTTP event body to handle instead of a one-shot comment.
    ///
    /// When set, the binary behaves like the serverless handler: it decodes
    /// the body, publishes the comment and prints the event response.
    #[ortho_config(cli_short = 'E')]
    pub event: Option<String>,
}

impl Default for MarginaliaConfig {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            source_owner: None,
            source_repo: None,
            destination_owner: None,
            destination_repo: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            base_branch: DEFAULT_BASE_BRANCH.to_owned(),
            request_timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
            subdir: None,
            comment: None,
            name: None,
            email: None,
            event: None,
        }
    }
}

impl MarginaliaConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, PublishError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(PublishError::MissingToken)
    }

    /// Validates the identity and repository settings and freezes them.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingToken`] without a token and
    /// [`PublishError::Configuration`] naming the first other missing or
    /// blank setting.
    pub fn publish_settings(&self) -> Result<PublishSettings, PublishError> {
        let token = PersonalAccessToken::new(self.resolve_token()?)?;
        let username = require(self.username.as_deref(), "username")?;
        let credentials = Credentials::new(username, token)?;

        let source = RepositoryRef::new(
            require(self.source_owner.as_deref(), "source_owner")?,
            require(self.source_repo.as_deref(), "source_repo")?,
        )?;
        let destination = RepositoryRef::new(
            require(self.destination_owner.as_deref(), "destination_owner")?,
            require(self.destination_repo.as_deref(), "destination_repo")?,
        )?;

        let base_branch = require(Some(self.base_branch.as_str()), "base_branch")?;
        let api_base = require(Some(self.api_base.as_str()), "api_base")?;
        let request_timeout = (self.request_timeout_seconds > 0)
            .then(|| Duration::from_secs(self.request_timeout_seconds));

        Ok(PublishSettings {
            credentials,
            repositories: RepositoryPair {
                source,
                destination,
            },
            api_base: api_base.to_owned(),
            base_branch: base_branch.to_owned(),
            request_timeout,
        })
    }

    /// The one-shot comment assembled from the `subdir`, `comment`, `name`
    /// and `email` settings. Validation happens when it is published.
    #[must_use]
    pub fn comment_input(&self) -> CommentInput {
        CommentInput {
            subdir: self.subdir.clone(),
            comment: self.comment.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

fn require<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, PublishError> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .ok_or_else(|| PublishError::Configuration {
            message: format!(
                "{field} is required (use --{flag} or MARGINALIA_{env})",
                flag = field.replace('_', "-"),
                env = field.to_uppercase()
            ),
        })
}

/// Validated settings for one process, built once and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Basic-auth identity.
    pub credentials: Credentials,
    /// Source fork and destination repository.
    pub repositories: RepositoryPair,
    /// GitHub API base URL.
    pub api_base: String,
    /// Branch comments start from and pull requests target.
    pub base_branch: String,
    /// Per-request timeout, if any.
    pub request_timeout: Option<Duration>,
}

impl PublishSettings {
    /// Builds the HTTP transport and the publisher on top of it.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidUrl`] or
    /// [`PublishError::Configuration`] when the transport cannot be built.
    pub fn publisher(&self) -> Result<CommentPublisher<HttpTransport>, PublishError> {
        let transport = HttpTransport::new(&self.credentials, &self.api_base, self.request_timeout)?;
        let gateway = CommentGateway::new(
            transport,
            self.repositories.clone(),
            self.base_branch.clone(),
        );
        Ok(CommentPublisher::new(gateway))
    }
}

#[cfg(test)]
mod tests;
