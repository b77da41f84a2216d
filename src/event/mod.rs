//! Serverless HTTP-event adapter.
//!
//! A function host hands the raw request body to [`handle_event`] and
//! returns the [`EventResponse`] verbatim. Callers only ever see `OK` or
//! `Error`; failure detail goes to the log.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::comment::CommentInput;
use crate::github::error::PublishError;
use crate::github::transport::Transport;
use crate::publish::CommentPublisher;

const ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
const ALLOW_METHODS: &str = "Access-Control-Allow-Methods";

/// Response shape expected by the function host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    /// HTTP status for the caller.
    pub status_code: u16,
    /// Response headers; CORS headers on success, none on failure.
    pub headers: BTreeMap<String, String>,
    /// `OK` or `Error`.
    pub body: String,
}

impl EventResponse {
    /// The success response carrying the CORS headers browsers need.
    #[must_use]
    pub fn ok() -> Self {
        let headers = BTreeMap::from([
            (ALLOW_ORIGIN.to_owned(), "*".to_owned()),
            (ALLOW_METHODS.to_owned(), "OPTIONS,POST".to_owned()),
        ]);
        Self {
            status_code: 200,
            headers,
            body: "OK".to_owned(),
        }
    }

    /// The opaque failure response.
    #[must_use]
    pub fn error() -> Self {
        Self {
            status_code: 500,
            headers: BTreeMap::new(),
            body: "Error".to_owned(),
        }
    }

    /// Serialises the response as the JSON the function host expects.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, PublishError> {
        serde_json::to_string(self).map_err(|error| PublishError::Io {
            message: format!("event response serialisation failed: {error}"),
        })
    }
}

/// Decodes an event body into a comment submission.
///
/// # Errors
///
/// Returns [`PublishError::InvalidEvent`] when `body` is not a JSON object
/// with the comment fields.
pub fn parse_event(body: &str) -> Result<CommentInput, PublishError> {
    serde_json::from_str(body).map_err(|error| PublishError::InvalidEvent {
        message: error.to_string(),
    })
}

/// Publishes the comment carried by `body` and reports the outcome.
pub async fn handle_event<T>(publisher: &CommentPublisher<T>, body: &str) -> EventResponse
where
    T: Transport,
{
    let outcome = match parse_event(body) {
        Ok(input) => publisher.add_comment(input).await,
        Err(error) => Err(error),
    };

    match outcome {
        Ok(comment) => {
            tracing::info!(id = %comment.id(), "event handled");
            EventResponse::ok()
        }
        Err(error) => {
            tracing::error!(%error, "event failed");
            EventResponse::error()
        }
    }
}
