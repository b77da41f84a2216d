//! Authenticated request client for the GitHub REST API.
//!
//! The transport is deliberately thin: it attaches credentials, sends the
//! request and hands back the status code and the full body text. It never
//! interprets the status; the gateway decides what counts as success for
//! each endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use http::{Method, StatusCode};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::PublishError;
use super::locator::Credentials;

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const JSON_MEDIA_TYPE: &str = "application/json";

/// A request against the configured API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Percent-encoded path below the API base, starting with `/`.
    pub path: String,
    /// Caller headers. `User-Agent` and `Authorization` are always replaced.
    pub headers: HeaderMap,
    /// Optional request body, sent verbatim.
    pub body: Option<String>,
}

impl ApiRequest {
    /// Builds a body-less request.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] when the payload cannot be serialised.
    pub fn post_json(
        path: impl Into<String>,
        payload: &impl Serialize,
    ) -> Result<Self, PublishError> {
        Self::new(Method::POST, path).with_json(payload)
    }

    /// `PUT` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Io`] when the payload cannot be serialised.
    pub fn put_json(
        path: impl Into<String>,
        payload: &impl Serialize,
    ) -> Result<Self, PublishError> {
        Self::new(Method::PUT, path).with_json(payload)
    }

    fn with_json(mut self, payload: &impl Serialize) -> Result<Self, PublishError> {
        let body = serde_json::to_string(payload).map_err(|error| PublishError::Io {
            message: format!("request serialisation failed: {error}"),
        })?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        self.body = Some(body);
        Ok(self)
    }
}

/// Status and body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status returned by the server.
    pub status: StatusCode,
    /// Concatenated response body.
    pub body: String,
}

impl ApiResponse {
    /// Builds a response; mostly useful for fakes.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decodes the body against a typed schema.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MalformedResponse`] naming `operation` when
    /// the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self, operation: &str) -> Result<T, PublishError> {
        serde_json::from_str(&self.body).map_err(|error| PublishError::MalformedResponse {
            operation: operation.to_owned(),
            message: error.to_string(),
        })
    }
}

/// Sends requests to the GitHub API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one HTTP exchange.
    ///
    /// Resolves with the response for every status code; only transport
    /// failures are errors.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PublishError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PublishError> {
        self.as_ref().send(request).await
    }
}

/// `reqwest`-backed transport using HTTP basic authentication.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: Url,
    user_agent: HeaderValue,
    authorization: HeaderValue,
}

impl HttpTransport {
    /// Builds a transport for `api_base` authenticated as `credentials`.
    ///
    /// A `timeout` of `None` leaves the exchange bounded only by the
    /// underlying connection.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::InvalidUrl`] for an unparsable base,
    /// [`PublishError::Configuration`] when the credentials cannot be
    /// encoded as headers or the client cannot be built.
    pub fn new(
        credentials: &Credentials,
        api_base: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, PublishError> {
        let parsed =
            Url::parse(api_base).map_err(|error| PublishError::InvalidUrl(error.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(PublishError::InvalidUrl(format!(
                "{api_base} cannot be used as an API base"
            )));
        }

        let user_agent = HeaderValue::from_str(credentials.username()).map_err(|error| {
            PublishError::Configuration {
                message: format!("username is not a valid User-Agent: {error}"),
            }
        })?;
        let authorization = basic_authorization(credentials)?;

        let mut builder = Client::builder();
        if let Some(duration) = timeout {
            builder = builder.timeout(duration);
        }
        let client = builder.build().map_err(|error| PublishError::Configuration {
            message: format!("failed to configure GitHub HTTP client: {error}"),
        })?;

        Ok(Self {
            client,
            api_base: parsed,
            user_agent,
            authorization,
        })
    }

    /// The API base every request path is appended to.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> Result<Url, PublishError> {
        let joined = format!(
            "{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined)
            .map_err(|error| PublishError::InvalidUrl(format!("{joined}: {error}")))
    }
}

fn basic_authorization(credentials: &Credentials) -> Result<HeaderValue, PublishError> {
    let pair = format!("{}:{}", credentials.username(), credentials.token().value());
    let mut value = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(pair))).map_err(
        |error| PublishError::Configuration {
            message: format!("credentials cannot be encoded: {error}"),
        },
    )?;
    value.set_sensitive(true);
    Ok(value)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, PublishError> {
        let ApiRequest {
            method,
            path,
            mut headers,
            body,
        } = request;
        let url = self.endpoint(&path)?;

        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(AUTHORIZATION, self.authorization.clone());
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));
        }

        tracing::debug!(%method, %path, "sending GitHub API request");

        let mut builder = self.client.request(method.clone(), url).headers(headers);
        if let Some(payload) = body {
            builder = builder.body(payload);
        }

        let response = builder.send().await.map_err(|error| PublishError::Network {
            message: format!("{method} {path} failed: {error}"),
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|error| PublishError::Network {
            message: format!("{method} {path} body read failed: {error}"),
        })?;

        tracing::debug!(%method, %path, status = status.as_u16(), "GitHub API responded");
        Ok(ApiResponse::new(status, text))
    }
}

/// Joins raw path segments into a percent-encoded absolute path.
///
/// # Errors
///
/// Returns [`PublishError::InvalidUrl`] if the segments cannot be encoded.
pub fn encode_path<'segment>(
    segments: impl IntoIterator<Item = &'segment str>,
) -> Result<String, PublishError> {
    let mut scratch = Url::parse("http://api.invalid/")
        .map_err(|error| PublishError::InvalidUrl(error.to_string()))?;
    scratch
        .path_segments_mut()
        .map_err(|()| PublishError::InvalidUrl("scratch URL cannot hold a path".to_owned()))?
        .clear()
        .extend(segments);
    Ok(scratch.path().to_owned())
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
