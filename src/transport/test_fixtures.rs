//! Shared test doubles for the transport layer and the API clients.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::time::InstantSleeper;

use super::{Connection, ConnectionBuilder, HttpClient, HttpError, HttpRequest, Response, RetryPolicy};

/// Mock HTTP client that replays a scripted sequence of results.
///
/// When the script runs out, it keeps answering with the fallback response
/// if one is set, and with [`HttpError::Timeout`] otherwise.
#[derive(Debug)]
pub struct MockClient {
    script: Mutex<VecDeque<Result<Response, HttpError>>>,
    fallback: Option<Response>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl MockClient {
    pub fn new(script: Vec<Result<Response, HttpError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Answers every request with the same response.
    pub fn always(status: u16, body: &str) -> Self {
        Self {
            fallback: Some(response(status, body)),
            ..Self::new(Vec::new())
        }
    }

    /// Times out `failures` times, then answers with `status`/`body`.
    pub fn failing_then(failures: usize, status: u16, body: &str) -> Self {
        let mut script: Vec<_> = (0..failures).map(|_| Err(HttpError::Timeout)).collect();
        script.push(Ok(response(status, body)));
        Self::new(script)
    }

    /// Every request times out.
    pub fn always_failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl HttpClient for MockClient {
    async fn request(&self, req: HttpRequest) -> Result<Response, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => self.fallback.clone().ok_or(HttpError::Timeout),
        }
    }
}

impl HttpClient for Arc<MockClient> {
    async fn request(&self, req: HttpRequest) -> Result<Response, HttpError> {
        (**self).request(req).await
    }
}

pub fn response(status: u16, body: &str) -> Response {
    Response::new(
        http::StatusCode::from_u16(status).unwrap(),
        http::HeaderMap::new(),
        body.as_bytes().to_vec(),
    )
}

pub fn base_url() -> url::Url {
    url::Url::parse("http://localhost:7070").unwrap()
}

/// A connection over `client` with its own runtime and no retry delays.
pub fn connection(client: Arc<MockClient>) -> Connection<Arc<MockClient>, InstantSleeper> {
    connection_with_policy(client, RetryPolicy::new())
}

pub fn connection_with_policy(
    client: Arc<MockClient>,
    policy: RetryPolicy,
) -> Connection<Arc<MockClient>, InstantSleeper> {
    ConnectionBuilder::new(client, base_url())
        .with_retry_policy(policy)
        .with_sleeper(InstantSleeper)
        .build()
        .unwrap()
}

/// A connection attached to the current (test) runtime.
///
/// Requests then run on the test's own runtime.
pub fn attached_connection(
    client: Arc<MockClient>,
) -> Connection<Arc<MockClient>, InstantSleeper> {
    ConnectionBuilder::new(client, base_url())
        .with_sleeper(InstantSleeper)
        .with_runtime_handle(tokio::runtime::Handle::current())
        .build()
        .unwrap()
}
