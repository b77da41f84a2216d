//! Marginalia library crate for publishing static-site comments as GitHub
//! pull requests.
//!
//! A reader's submission is validated, stamped with an identifier, and
//! committed as a JSON data file on a fresh branch of a fork. A pull request
//! then proposes it to the site's repository, so moderation happens through
//! ordinary code review.

pub mod comment;
pub mod config;
pub mod event;
pub mod github;
pub mod publish;

pub use comment::{Comment, CommentInput};
pub use config::{MarginaliaConfig, PublishSettings};
pub use event::{EventResponse, handle_event};
pub use github::{CommentGateway, HttpTransport, PublishError, Transport};
pub use publish::CommentPublisher;
