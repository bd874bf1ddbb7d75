//! Authenticated HTTP access to the build server.
//!
//! [`HttpClient`] resolves its [`AuthMethod`] once at construction and logs
//! every request and response at `trace` level. Status codes are returned to
//! the caller untouched because a 404 can mean "queued" rather than "missing"
//! depending on the endpoint.

use std::fmt;
use std::time::Duration;

use http::StatusCode;
use http::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};

/// Credentials presented to the build server.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Bearer token authentication.
    Token(String),
    /// HTTP basic authentication.
    Basic {
        /// Account name.
        username: String,
        /// Account password.
        password: String,
    },
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => formatter.write_str("Token(<redacted>)"),
            Self::Basic { username, .. } => formatter
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpError {
    /// The underlying client could not be configured.
    #[error("failed to configure HTTP client: {message}")]
    Client {
        /// Builder error description.
        message: String,
    },

    /// The request could not be sent or timed out.
    #[error("{method} {url} failed: {message}")]
    Transport {
        /// HTTP method.
        method: &'static str,
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The response body could not be read.
    #[error("error reading response body from {url}: {message}")]
    Body {
        /// Requested URL.
        url: String,
        /// Read error description.
        message: String,
    },
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns true for a 200 response.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Returns true for a 404 response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Asynchronous HTTP client bound to one set of credentials.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    auth: AuthMethod,
}

impl HttpClient {
    /// Builds a client applying `timeout` to every request.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] when the TLS backend cannot be
    /// initialised.
    pub fn new(auth: AuthMethod, timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| HttpError::Client {
                message: error.to_string(),
            })?;
        Ok(Self { client, auth })
    }

    /// Issues an authenticated GET.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the request cannot be completed. Non-2xx
    /// statuses are not errors here.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        tracing::trace!(url, "GET request");
        self.send("GET", url, self.client.get(url)).await
    }

    /// Issues an authenticated POST with the given content type.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the request cannot be completed. Non-2xx
    /// statuses are not errors here.
    pub async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: String,
    ) -> Result<HttpResponse, HttpError> {
        tracing::trace!(url, content_type, body = body.as_str(), "POST request");
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        self.send("POST", url, request).await
    }

    async fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<HttpResponse, HttpError> {
        let authorised = match &self.auth {
            AuthMethod::Token(token) => request.bearer_auth(token),
            AuthMethod::Basic { username, password } => request.basic_auth(username, Some(password)),
        };

        let response = authorised
            .send()
            .await
            .map_err(|error| HttpError::Transport {
                method,
                url: url.to_owned(),
                message: error.to_string(),
            })?;
        let status = response.status();
        let body = response.text().await.map_err(|error| HttpError::Body {
            url: url.to_owned(),
            message: error.to_string(),
        })?;

        tracing::trace!(
            url,
            status = status.as_u16(),
            body = body.as_str(),
            "response received"
        );
        Ok(HttpResponse { status, body })
    }
}
