//! Connection: blocking and async dispatch with retry.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::time::{Sleeper, TokioSleeper};

use super::{HttpClient, HttpError, ReqwestClient, Request, Response, RetryPolicy};

/// Default number of runtime worker threads owned by a connection.
pub const DEFAULT_WORKER_THREADS: usize = 1;

/// Executes [`Request`]s against a base URL.
///
/// Every call comes in two flavors:
/// - blocking ([`get`](Self::get), [`post`](Self::post),
///   [`delete`](Self::delete), [`send`](Self::send)), which park the calling
///   thread until a response arrives or retries are exhausted;
/// - asynchronous ([`aget`](Self::aget), [`apost`](Self::apost),
///   [`adelete`](Self::adelete), [`send_async`](Self::send_async)), which
///   spawn the call and return an [`AsyncResponse`] immediately.
///
/// [`execute`](Self::execute) is the underlying `async fn` for callers that
/// already live inside a Tokio runtime.
///
/// Transport failures are retried per the [`RetryPolicy`]; HTTP error
/// statuses are returned as [`Response`] data and never retried.
///
/// Cloning is cheap: clones share the HTTP client and the runtime.
///
/// # Type Parameters
///
/// - `H`: the HTTP client implementation (defaults to [`ReqwestClient`])
/// - `S`: the sleeper used between retries (defaults to [`TokioSleeper`])
#[derive(Debug)]
pub struct Connection<H = ReqwestClient, S = TokioSleeper> {
    inner: Arc<Inner<H, S>>,
    runtime: RuntimeHandle,
}

impl<H, S> Clone for Connection<H, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            runtime: self.runtime.clone(),
        }
    }
}

#[derive(Debug)]
struct Inner<H, S> {
    client: H,
    sleeper: S,
    base_url: url::Url,
    retry_policy: RetryPolicy,
}

/// The runtime that drives spawned and blocking calls.
#[derive(Debug, Clone)]
enum RuntimeHandle {
    /// A runtime created for (and shared by clones of) this connection.
    Owned(Arc<OwnedRuntime>),
    /// A runtime owned by the caller.
    Attached(Handle),
}

impl RuntimeHandle {
    fn handle(&self) -> &Handle {
        match self {
            Self::Owned(runtime) => &runtime.handle,
            Self::Attached(handle) => handle,
        }
    }
}

/// A runtime that shuts down without blocking when the last user goes away,
/// so it may be dropped from inside another runtime's tasks.
#[derive(Debug)]
struct OwnedRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl OwnedRuntime {
    fn new(runtime: Runtime) -> Self {
        Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        }
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Builder for [`Connection`].
///
/// # Example
///
/// ```no_run
/// use predictionio::transport::{ConnectionBuilder, ReqwestClient, RetryPolicy};
/// use url::Url;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let base_url = Url::parse("http://localhost:7070")?;
/// let connection = ConnectionBuilder::new(ReqwestClient::new(), base_url)
///     .with_retry_policy(RetryPolicy::new().with_max_attempts(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConnectionBuilder<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    base_url: url::Url,
    retry_policy: RetryPolicy,
    worker_threads: usize,
    handle: Option<Handle>,
}

impl<H> ConnectionBuilder<H, TokioSleeper> {
    /// Starts a builder for a client talking to `base_url`.
    ///
    /// Defaults: default retry policy, one owned worker thread,
    /// [`TokioSleeper`] for delays.
    #[must_use]
    pub fn new(client: H, base_url: url::Url) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            base_url,
            retry_policy: RetryPolicy::default(),
            worker_threads: DEFAULT_WORKER_THREADS,
            handle: None,
        }
    }
}

impl<H, S> ConnectionBuilder<H, S> {
    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> ConnectionBuilder<H, S2> {
        ConnectionBuilder {
            client: self.client,
            sleeper,
            base_url: self.base_url,
            retry_policy: self.retry_policy,
            worker_threads: self.worker_threads,
            handle: self.handle,
        }
    }

    /// Sets the number of worker threads of the owned runtime.
    ///
    /// Values below 1 are raised to 1. Ignored when a runtime handle is
    /// attached.
    #[must_use]
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads.max(1);
        self
    }

    /// Runs calls on an existing runtime instead of creating one.
    ///
    /// Blocking calls must then be made from threads outside that runtime.
    #[must_use]
    pub fn with_runtime_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Builds the connection, starting a runtime if none was attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the runtime cannot be started.
    pub fn build(self) -> Result<Connection<H, S>, Error> {
        let runtime = match self.handle {
            Some(handle) => RuntimeHandle::Attached(handle),
            None => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(self.worker_threads)
                    .thread_name("predictionio-worker")
                    .enable_all()
                    .build()
                    .map_err(Error::Runtime)?;
                RuntimeHandle::Owned(Arc::new(OwnedRuntime::new(runtime)))
            }
        };

        Ok(Connection {
            inner: Arc::new(Inner {
                client: self.client,
                sleeper: self.sleeper,
                base_url: self.base_url,
                retry_policy: self.retry_policy,
            }),
            runtime,
        })
    }
}

impl Connection<ReqwestClient, TokioSleeper> {
    /// Connects to `base_url` with a default [`ReqwestClient`] and retry
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if `base_url` is not a valid URL and
    /// [`Error::Runtime`] if the runtime cannot be started.
    pub fn connect(base_url: &str) -> Result<Self, Error> {
        let base_url = url::Url::parse(base_url)
            .map_err(|e| HttpError::InvalidUrl(format!("{base_url}: {e}")))?;

        ConnectionBuilder::new(ReqwestClient::new(), base_url).build()
    }
}

impl<H, S> Connection<H, S> {
    /// Returns the base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &url::Url {
        &self.inner.base_url
    }

    /// Returns the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.inner.retry_policy
    }
}

impl<H, S> Connection<H, S>
where
    H: HttpClient + 'static,
    S: Sleeper + 'static,
{
    /// Executes `request`, retrying transport failures.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] when every attempt failed at the transport level
    /// - [`Error::Transport`] for a non-retryable transport failure
    pub async fn execute(&self, request: Request) -> Result<Response, Error> {
        self.inner.execute(request).await
    }

    /// Executes `request` and blocks until it completes.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// [`execute`](Self::execute) or [`send_async`](Self::send_async) there.
    pub fn send(&self, request: Request) -> Result<Response, Error> {
        self.runtime.handle().block_on(self.inner.execute(request))
    }

    /// Spawns `request` and returns a handle to its eventual response.
    #[must_use = "the response is only observable through the returned handle"]
    pub fn send_async(&self, request: Request) -> AsyncResponse {
        let inner = Arc::clone(&self.inner);
        let task = self
            .runtime
            .handle()
            .spawn(async move { inner.execute(request).await });

        AsyncResponse {
            task,
            runtime: self.runtime.clone(),
        }
    }

    /// Blocking GET.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn get(&self, request: Request) -> Result<Response, Error> {
        self.send(request.with_method(http::Method::GET))
    }

    /// Blocking POST.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn post(&self, request: Request) -> Result<Response, Error> {
        self.send(request.with_method(http::Method::POST))
    }

    /// Blocking DELETE.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn delete(&self, request: Request) -> Result<Response, Error> {
        self.send(request.with_method(http::Method::DELETE))
    }

    /// Asynchronous GET.
    #[must_use = "the response is only observable through the returned handle"]
    pub fn aget(&self, request: Request) -> AsyncResponse {
        self.send_async(request.with_method(http::Method::GET))
    }

    /// Asynchronous POST.
    #[must_use = "the response is only observable through the returned handle"]
    pub fn apost(&self, request: Request) -> AsyncResponse {
        self.send_async(request.with_method(http::Method::POST))
    }

    /// Asynchronous DELETE.
    #[must_use = "the response is only observable through the returned handle"]
    pub fn adelete(&self, request: Request) -> AsyncResponse {
        self.send_async(request.with_method(http::Method::DELETE))
    }
}

impl<H: HttpClient, S: Sleeper> Inner<H, S> {
    async fn execute(&self, request: Request) -> Result<Response, Error> {
        let http_request = request.resolve(&self.base_url);
        let max_attempts = self.retry_policy.max_attempts;
        let mut last_error = HttpError::Timeout;

        for attempt in 1..=max_attempts {
            tracing::debug!(
                method = %http_request.method,
                url = %http_request.url,
                attempt,
                "Sending request"
            );

            match self.client.request(http_request.clone()).await {
                Ok(response) => {
                    tracing::debug!(status = %response.status, attempt, "Received response");
                    return Ok(response);
                }
                Err(e) if !e.is_retryable() => return Err(Error::Transport(e)),
                Err(e) => {
                    if self.retry_policy.should_retry(attempt) {
                        let delay = self.retry_policy.delay_for_retry(attempt - 1);
                        tracing::warn!(
                            attempt,
                            max_attempts,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "Request failed, retrying"
                        );
                        self.sleeper.sleep(delay).await;
                    }
                    last_error = e;
                }
            }
        }

        tracing::error!(
            method = %http_request.method,
            url = %http_request.url,
            attempts = max_attempts,
            error = %last_error,
            "Request failed, giving up"
        );

        Err(Error::Timeout {
            attempts: max_attempts,
            last_error,
        })
    }
}

/// Handle to a request running in the background.
///
/// Resolved exactly once: either by the blocking [`wait`](Self::wait) or by
/// awaiting it, both of which consume the handle. Dropping the handle
/// detaches the request; it still runs to completion.
#[derive(Debug)]
pub struct AsyncResponse {
    task: JoinHandle<Result<Response, Error>>,
    runtime: RuntimeHandle,
}

impl AsyncResponse {
    /// Blocks until the response is available.
    ///
    /// # Errors
    ///
    /// Returns whatever the request itself failed with, or
    /// [`Error::TaskFailed`] if the background task panicked or its runtime
    /// shut down.
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context;
    /// `.await` the handle there instead.
    pub fn wait(self) -> Result<Response, Error> {
        let Self { task, runtime } = self;
        let joined = runtime.handle().block_on(task);
        flatten(joined)
    }

    /// Returns true if the request has completed and `wait` won't block.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for AsyncResponse {
    type Output = Result<Response, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(flatten)
    }
}

fn flatten(
    joined: Result<Result<Response, Error>, tokio::task::JoinError>,
) -> Result<Response, Error> {
    joined.unwrap_or_else(|e| Err(Error::TaskFailed(e.to_string())))
}
