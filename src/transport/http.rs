//! Resolved HTTP request/response types and the client trait.

use serde::de::DeserializeOwned;

use super::HttpError;

/// A fully resolved HTTP request, ready for an [`HttpClient`].
///
/// Produced by [`Request::resolve`](super::Request::resolve) once the
/// connection's base URL and query parameters have been applied. Uses the
/// `http` crate types for method and headers.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, DELETE)
    pub method: http::Method,
    /// Absolute target URL, query string included
    pub url: url::Url,
    /// HTTP headers to send
    pub headers: http::HeaderMap,
    /// Optional request body
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a new HTTP request with the given method and URL.
    ///
    /// Headers are initialized to an empty map and body is `None`.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header to the request.
    ///
    /// If the header name already exists, the value is appended.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }
}

/// An HTTP response received from the prediction service.
///
/// Any status code is a valid `Response`; callers inspect
/// [`status`](Self::status) to tell application errors apart.
/// The body is fully buffered into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Response body (fully buffered)
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response.
    #[must_use]
    pub const fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the body as a UTF-8 string, if valid.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// A human-readable explanation of a failed response.
    ///
    /// Prefers the server's `message` field, then the raw body, then the
    /// canonical reason phrase of the status code.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let Ok(value) = self.json::<serde_json::Value>() {
            if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
                return message.to_string();
            }
        }

        match self.body_text() {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => self
                .status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
        }
    }
}

/// Trait for making HTTP requests.
///
/// Abstracts the HTTP implementation so the connection can be driven by a
/// scripted client in tests, or by another HTTP library in production.
///
/// # Example
///
/// ```ignore
/// use predictionio::transport::{HttpClient, HttpError, HttpRequest, Response};
///
/// struct CannedClient {
///     response: Response,
/// }
///
/// impl HttpClient for CannedClient {
///     async fn request(&self, _req: HttpRequest) -> Result<Response, HttpError> {
///         Ok(self.response.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is invalid ([`HttpError::InvalidUrl`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<Response, HttpError>> + Send;
}
