//! GitHub access for comment publishing.
//!
//! This module holds the authenticated request client, the typed schemas of
//! the endpoints it calls, and the gateway that turns each publish step into
//! one checked API call. Errors are mapped into [`PublishError`] variants so
//! that callers can tell which step GitHub refused.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod schema;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::PublishError;
pub use gateway::{CommentGateway, DEFAULT_BASE_BRANCH, FastForward};
pub use locator::{
    Credentials, DEFAULT_API_BASE, PersonalAccessToken, RepositoryName, RepositoryOwner,
    RepositoryPair, RepositoryRef,
};
pub use schema::PullRequestCreated;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;
