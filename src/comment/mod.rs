//! Comment submissions and the records committed for them.
//!
//! A [`CommentInput`] is untrusted user input. Validation turns it into a
//! [`ValidComment`], which is stamped with an identifier and creation time to
//! become the immutable [`Comment`] written to the content repository.

mod hash;
mod model;

pub use hash::gravatar_hash;
pub use model::{BranchName, Comment, CommentId, CommentInput, ValidComment};
