//! Path-level request value built by the API clients.

use serde::Serialize;

use super::HttpRequest;

/// A request against the prediction service, relative to a base URL.
///
/// Built once by [`EventClient`](crate::EventClient) or
/// [`EngineClient`](crate::EngineClient) and never mutated afterwards:
/// the builder methods consume `self` and return a new value.
///
/// # Example
///
/// ```
/// use predictionio::transport::Request;
///
/// let request = Request::get("/events.json")
///     .with_param("accessKey", "secret")
///     .with_param("limit", "10");
///
/// assert_eq!(request.path(), "/events.json");
/// assert_eq!(request.params().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: http::Method,
    path: String,
    params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Creates a request with no query parameters and no body.
    #[must_use]
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(http::Method::GET, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(http::Method::POST, path)
    }

    /// Creates a DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(http::Method::DELETE, path)
    }

    /// Returns the same request with a different method.
    #[must_use]
    pub fn with_method(mut self, method: http::Method) -> Self {
        self.method = method;
        self
    }

    /// Appends a query parameter. Repeated keys are kept in order.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Appends several query parameters.
    #[must_use]
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets a raw body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `value` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `value` cannot be serialized.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self.with_body(body))
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &http::Method {
        &self.method
    }

    /// Path relative to the base URL, always starting with `/`.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Raw body bytes, if any.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body decoded as JSON, if present and valid.
    #[must_use]
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }

    /// Builds the absolute URL for this request under `base`.
    ///
    /// The base URL's own path is kept as a prefix; its query string is
    /// replaced by this request's parameters.
    #[must_use]
    pub fn url(&self, base: &url::Url) -> url::Url {
        let mut url = base.clone();
        let path = format!("{}{}", base.path().trim_end_matches('/'), self.path);
        url.set_path(&path);
        url.set_query(None);

        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.params
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }

        url
    }

    /// Resolves this request into an [`HttpRequest`] under `base`.
    ///
    /// JSON bodies get a `Content-Type` header; every request accepts JSON.
    #[must_use]
    pub fn resolve(&self, base: &url::Url) -> HttpRequest {
        let mut request = HttpRequest::new(self.method.clone(), self.url(base)).with_header(
            http::header::ACCEPT,
            http::HeaderValue::from_static("application/json"),
        );

        if let Some(body) = &self.body {
            request = request
                .with_header(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/json"),
                )
                .with_body(body.clone());
        }

        request
    }
}
