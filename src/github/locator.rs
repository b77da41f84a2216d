//! Repository identifiers and credential wrappers.

use std::fmt;

use super::error::PublishError;

/// Default public GitHub API host.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Configuration`] when the value is blank.
    pub fn new(value: &str) -> Result<Self, PublishError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PublishError::Configuration {
                message: "repository owner must not be empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the name is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Configuration`] when the value is blank.
    pub fn new(value: &str) -> Result<Self, PublishError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PublishError::Configuration {
                message: "repository name must not be empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Owner and name of one GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    owner: RepositoryOwner,
    name: RepositoryName,
}

impl RepositoryRef {
    /// Builds a repository reference from raw owner and name strings.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Configuration`] when either part is blank.
    pub fn new(owner: &str, name: &str) -> Result<Self, PublishError> {
        Ok(Self {
            owner: RepositoryOwner::new(owner)?,
            name: RepositoryName::new(name)?,
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Path segments addressing this repository below `/repos`.
    pub(crate) fn segments(&self) -> [&str; 3] {
        ["repos", self.owner.as_str(), self.name.as_str()]
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}/{}", self.owner.as_str(), self.name.as_str())
    }
}

/// The fork that receives comment branches and the upstream that receives
/// pull requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPair {
    /// Repository the comment branch and file are written to.
    pub source: RepositoryRef,
    /// Repository the pull request is opened against.
    pub destination: RepositoryRef,
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, PublishError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PublishError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PersonalAccessToken(***)")
    }
}

/// Basic-auth identity: the GitHub login doubles as the user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: PersonalAccessToken,
}

impl Credentials {
    /// Pairs a GitHub login with its token.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Configuration`] when the username is blank.
    pub fn new(username: &str, token: PersonalAccessToken) -> Result<Self, PublishError> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(PublishError::Configuration {
                message: "GitHub username must not be empty".to_owned(),
            });
        }
        Ok(Self {
            username: trimmed.to_owned(),
            token,
        })
    }

    /// GitHub login used for basic auth and the `User-Agent` header.
    #[must_use]
    pub const fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Secret half of the basic-auth pair.
    #[must_use]
    pub const fn token(&self) -> &PersonalAccessToken {
        &self.token
    }
}
