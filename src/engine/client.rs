//! Client for a deployed engine.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::event::{EventClient, EventOptions};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{AsyncResponse, Connection, HttpClient, ReqwestClient, Request, Response};

/// Event recorded for each prediction sent back as feedback.
pub const FEEDBACK_EVENT: &str = "predict";
/// Entity type of feedback events.
pub const FEEDBACK_ENTITY: &str = "pio_pr";

/// Sends queries to an engine and, optionally, prediction feedback to an
/// event server.
///
/// # Example
///
/// ```no_run
/// use predictionio::EngineClient;
/// use serde_json::json;
///
/// # fn example() -> Result<(), predictionio::Error> {
/// let engine = EngineClient::new("http://localhost:8000")?;
/// let prediction = engine.send_query(&json!({"user": "u1", "num": 4}))?;
/// println!("{prediction}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct EngineClient<H = ReqwestClient, S = TokioSleeper> {
    connection: Connection<H, S>,
    feedback: Option<EventClient<H, S>>,
}

impl<H, S> Clone for EngineClient<H, S> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            feedback: self.feedback.clone(),
        }
    }
}

impl EngineClient<ReqwestClient, TokioSleeper> {
    /// Creates a client for the engine at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for an invalid URL and
    /// [`Error::Runtime`] if the connection's runtime cannot be started.
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self::from_connection(Connection::connect(url)?))
    }
}

impl<H, S> EngineClient<H, S> {
    /// Creates a client over an existing connection.
    #[must_use]
    pub const fn from_connection(connection: Connection<H, S>) -> Self {
        Self {
            connection,
            feedback: None,
        }
    }

    /// Records prediction feedback through `events`.
    #[must_use]
    pub fn with_feedback(mut self, events: EventClient<H, S>) -> Self {
        self.feedback = Some(events);
        self
    }

    /// The connection queries are sent through.
    #[must_use]
    pub const fn connection(&self) -> &Connection<H, S> {
        &self.connection
    }

    /// Returns true if [`with_feedback`](Self::with_feedback) was used.
    #[must_use]
    pub const fn feedback_enabled(&self) -> bool {
        self.feedback.is_some()
    }

    /// `GET /`.
    #[must_use]
    pub fn status_request(&self) -> Request {
        Request::get("/")
    }

    /// `POST /queries.json` with `query` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if `query` cannot be encoded.
    pub fn query_request<Q: Serialize + ?Sized>(&self, query: &Q) -> Result<Request, Error> {
        Request::post("/queries.json")
            .with_json(query)
            .map_err(Error::Serialize)
    }
}

impl<H, S> EngineClient<H, S>
where
    H: HttpClient + 'static,
    S: Sleeper + 'static,
{
    /// Fetches the engine status.
    ///
    /// # Errors
    ///
    /// Transport errors from [`Connection::send`].
    pub fn get_status(&self) -> Result<Response, Error> {
        self.connection.get(self.status_request())
    }

    /// Async form of [`get_status`](Self::get_status).
    #[must_use = "the response is only observable through the returned handle"]
    pub fn aget_status(&self) -> AsyncResponse {
        self.connection.aget(self.status_request())
    }

    /// Sends a query and returns the decoded prediction.
    ///
    /// # Errors
    ///
    /// - [`Error::Query`] unless the engine answers `200 OK`
    /// - [`Error::Decode`] if the answer is not JSON
    /// - [`Error::Serialize`] and transport errors
    pub fn send_query<Q: Serialize + ?Sized>(&self, query: &Q) -> Result<Value, Error> {
        let response = self.connection.post(self.query_request(query)?)?;
        decode_prediction(&response)
    }

    /// Starts a query; the raw response is left for the caller to inspect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] if `query` cannot be encoded.
    pub fn asend_query<Q: Serialize + ?Sized>(&self, query: &Q) -> Result<AsyncResponse, Error> {
        Ok(self.connection.apost(self.query_request(query)?))
    }

    /// Waits for a pending query and decodes it like
    /// [`send_query`](Self::send_query).
    ///
    /// # Errors
    ///
    /// Same as [`send_query`](Self::send_query).
    pub fn wait_prediction(&self, pending: AsyncResponse) -> Result<Value, Error> {
        decode_prediction(&pending.wait()?)
    }

    /// Records `prediction` for `query` under prediction id `pr_id`.
    ///
    /// # Errors
    ///
    /// - [`Error::FeedbackDisabled`] without an attached event client
    /// - [`Error::NotCreated`] if the event server rejects the event
    /// - [`Error::Serialize`] and transport errors
    pub fn send_feedback<Q, P>(&self, pr_id: &str, query: &Q, prediction: &P) -> Result<Response, Error>
    where
        Q: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let events = self.feedback.as_ref().ok_or(Error::FeedbackDisabled)?;
        let options = feedback_options(query, prediction)?;
        events.create_event(FEEDBACK_EVENT, FEEDBACK_ENTITY, pr_id, &options)
    }

    /// Async form of [`send_feedback`](Self::send_feedback).
    ///
    /// # Errors
    ///
    /// Same as [`send_feedback`](Self::send_feedback), minus the status check.
    pub fn asend_feedback<Q, P>(
        &self,
        pr_id: &str,
        query: &Q,
        prediction: &P,
    ) -> Result<AsyncResponse, Error>
    where
        Q: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let events = self.feedback.as_ref().ok_or(Error::FeedbackDisabled)?;
        let options = feedback_options(query, prediction)?;
        events.acreate_event(FEEDBACK_EVENT, FEEDBACK_ENTITY, pr_id, &options)
    }
}

fn decode_prediction(response: &Response) -> Result<Value, Error> {
    if response.status != http::StatusCode::OK {
        return Err(Error::Query {
            status: response.status,
            message: response.error_message(),
        });
    }

    response.json().map_err(Error::Decode)
}

fn feedback_options<Q, P>(query: &Q, prediction: &P) -> Result<EventOptions, Error>
where
    Q: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    let mut properties = Map::new();
    properties.insert(
        "query".to_string(),
        serde_json::to_value(query).map_err(Error::Serialize)?,
    );
    properties.insert(
        "prediction".to_string(),
        serde_json::to_value(prediction).map_err(Error::Serialize)?,
    );

    Ok(EventOptions::new().with_properties(properties))
}
