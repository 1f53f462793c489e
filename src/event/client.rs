//! Client for the event server.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};
use crate::transport::{AsyncResponse, Connection, HttpClient, ReqwestClient, Request, Response};

use super::body::{
    DELETE_EVENT, EventBody, ITEM_ENTITY, SET_EVENT, UNSET_EVENT, USER_ENTITY, targeting_item,
};
use super::{EventOptions, EventQuery};

/// Query parameter carrying the access key.
const ACCESS_KEY_PARAM: &str = "accessKey";

/// Records events with, and reads them back from, an event server.
///
/// Every operation has a blocking form and an `a`-prefixed form that
/// returns an [`AsyncResponse`]. Argument errors are reported by both
/// before anything is sent.
///
/// # Example
///
/// ```no_run
/// use predictionio::{EventClient, EventOptions};
///
/// # fn example() -> Result<(), predictionio::Error> {
/// let client = EventClient::new("ACCESS_KEY", "http://localhost:7070")?;
///
/// client.set_user("u1", &EventOptions::new().with_property("age", 28))?;
/// client.record_user_action_on_item("view", "u1", "i1", &EventOptions::new())?;
///
/// let pending = client.aset_item("i1", &EventOptions::new().with_property("category", "books"))?;
/// let response = pending.wait()?;
/// assert!(response.is_success());
/// # Ok(())
/// # }
/// ```
pub struct EventClient<H = ReqwestClient, S = TokioSleeper> {
    access_key: Arc<str>,
    connection: Connection<H, S>,
    clock: Arc<dyn Clock>,
}

impl<H, S> Clone for EventClient<H, S> {
    fn clone(&self) -> Self {
        Self {
            access_key: Arc::clone(&self.access_key),
            connection: self.connection.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<H, S> fmt::Debug for EventClient<H, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventClient")
            .field("base_url", &self.connection.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl EventClient<ReqwestClient, TokioSleeper> {
    /// Creates a client for the event server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] for an invalid URL and
    /// [`Error::Runtime`] if the connection's runtime cannot be started.
    pub fn new(access_key: impl Into<String>, url: &str) -> Result<Self, Error> {
        Ok(Self::from_connection(access_key, Connection::connect(url)?))
    }
}

impl<H, S> EventClient<H, S> {
    /// Creates a client over an existing connection.
    #[must_use]
    pub fn from_connection(access_key: impl Into<String>, connection: Connection<H, S>) -> Self {
        Self {
            access_key: Arc::from(access_key.into()),
            connection,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock that stamps events without an explicit time.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The access key sent with every event request.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The connection requests are sent through.
    #[must_use]
    pub const fn connection(&self) -> &Connection<H, S> {
        &self.connection
    }

    /// `GET /`.
    #[must_use]
    pub fn status_request(&self) -> Request {
        Request::get("/")
    }

    /// `POST /events.json` carrying the event body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an invalid `$unset` event and
    /// [`Error::Serialize`] if the body cannot be encoded.
    pub fn create_event_request(
        &self,
        event: &str,
        entity_type: &str,
        entity_id: &str,
        options: &EventOptions,
    ) -> Result<Request, Error> {
        let body = EventBody::new(event, entity_type, entity_id, options, self.clock.as_ref())?;

        Ok(Request::post("/events.json")
            .with_param(ACCESS_KEY_PARAM, &*self.access_key)
            .with_body(body.to_json()?.into_bytes()))
    }

    /// `DELETE /events/<event_id>.json`.
    #[must_use]
    pub fn delete_event_request(&self, event_id: &str) -> Request {
        Request::delete(format!("/events/{event_id}.json"))
            .with_param(ACCESS_KEY_PARAM, &*self.access_key)
    }

    /// `GET /events/<event_id>.json`.
    #[must_use]
    pub fn get_event_request(&self, event_id: &str) -> Request {
        Request::get(format!("/events/{event_id}.json"))
            .with_param(ACCESS_KEY_PARAM, &*self.access_key)
    }

    /// `GET /events.json` with the query's filters.
    #[must_use]
    pub fn find_events_request(&self, query: &EventQuery) -> Request {
        Request::get("/events.json")
            .with_param(ACCESS_KEY_PARAM, &*self.access_key)
            .with_params(query.to_params())
    }
}

impl<H, S> EventClient<H, S>
where
    H: HttpClient + 'static,
    S: Sleeper + 'static,
{
    /// Fetches the server status.
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

    /// Creates an event and checks that the server accepted it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for an invalid `$unset` event
    /// - [`Error::NotCreated`] when the server answers with a non-success status
    /// - transport errors from [`Connection::send`]
    pub fn create_event(
        &self,
        event: &str,
        entity_type: &str,
        entity_id: &str,
        options: &EventOptions,
    ) -> Result<Response, Error> {
        let request = self.create_event_request(event, entity_type, entity_id, options)?;
        ensure_created(self.connection.post(request)?)
    }

    /// Starts creating an event. The status is left for the caller to check,
    /// e.g. with [`wait_created`](Self::wait_created).
    ///
    /// # Errors
    ///
    /// Same argument errors as [`create_event`](Self::create_event).
    pub fn acreate_event(
        &self,
        event: &str,
        entity_type: &str,
        entity_id: &str,
        options: &EventOptions,
    ) -> Result<AsyncResponse, Error> {
        let request = self.create_event_request(event, entity_type, entity_id, options)?;
        Ok(self.connection.apost(request))
    }

    /// Waits for a pending create and applies the same success check as
    /// [`create_event`](Self::create_event).
    ///
    /// # Errors
    ///
    /// [`Error::NotCreated`] or whatever the request failed with.
    pub fn wait_created(&self, pending: AsyncResponse) -> Result<Response, Error> {
        ensure_created(pending.wait()?)
    }

    /// Deletes an event by id.
    ///
    /// # Errors
    ///
    /// Transport errors from [`Connection::send`].
    pub fn delete_event(&self, event_id: &str) -> Result<Response, Error> {
        self.connection.delete(self.delete_event_request(event_id))
    }

    /// Async form of [`delete_event`](Self::delete_event).
    #[must_use = "the response is only observable through the returned handle"]
    pub fn adelete_event(&self, event_id: &str) -> AsyncResponse {
        self.connection.adelete(self.delete_event_request(event_id))
    }

    /// Fetches an event by id.
    ///
    /// # Errors
    ///
    /// Transport errors from [`Connection::send`].
    pub fn get_event(&self, event_id: &str) -> Result<Response, Error> {
        self.connection.get(self.get_event_request(event_id))
    }

    /// Async form of [`get_event`](Self::get_event).
    #[must_use = "the response is only observable through the returned handle"]
    pub fn aget_event(&self, event_id: &str) -> AsyncResponse {
        self.connection.aget(self.get_event_request(event_id))
    }

    /// Lists events matching `query`.
    ///
    /// # Errors
    ///
    /// Transport errors from [`Connection::send`].
    pub fn find_events(&self, query: &EventQuery) -> Result<Response, Error> {
        self.connection.get(self.find_events_request(query))
    }

    /// Async form of [`find_events`](Self::find_events).
    #[must_use = "the response is only observable through the returned handle"]
    pub fn afind_events(&self, query: &EventQuery) -> AsyncResponse {
        self.connection.aget(self.find_events_request(query))
    }

    /// Sets properties of a user (`$set`).
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn set_user(&self, uid: &str, options: &EventOptions) -> Result<Response, Error> {
        self.create_event(SET_EVENT, USER_ENTITY, uid, options)
    }

    /// Async form of [`set_user`](Self::set_user).
    ///
    /// # Errors
    ///
    /// Same as [`acreate_event`](Self::acreate_event).
    pub fn aset_user(&self, uid: &str, options: &EventOptions) -> Result<AsyncResponse, Error> {
        self.acreate_event(SET_EVENT, USER_ENTITY, uid, options)
    }

    /// Removes properties of a user (`$unset`).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `options.properties` is absent or
    /// empty, otherwise same as [`create_event`](Self::create_event).
    pub fn unset_user(&self, uid: &str, options: &EventOptions) -> Result<Response, Error> {
        self.create_event(UNSET_EVENT, USER_ENTITY, uid, options)
    }

    /// Async form of [`unset_user`](Self::unset_user).
    ///
    /// # Errors
    ///
    /// Same as [`unset_user`](Self::unset_user), minus the status check.
    pub fn aunset_user(&self, uid: &str, options: &EventOptions) -> Result<AsyncResponse, Error> {
        self.acreate_event(UNSET_EVENT, USER_ENTITY, uid, options)
    }

    /// Deletes a user (`$delete`).
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn delete_user(&self, uid: &str) -> Result<Response, Error> {
        self.create_event(DELETE_EVENT, USER_ENTITY, uid, &EventOptions::default())
    }

    /// Async form of [`delete_user`](Self::delete_user).
    ///
    /// # Errors
    ///
    /// Same as [`acreate_event`](Self::acreate_event).
    pub fn adelete_user(&self, uid: &str) -> Result<AsyncResponse, Error> {
        self.acreate_event(DELETE_EVENT, USER_ENTITY, uid, &EventOptions::default())
    }

    /// Sets properties of an item (`$set`).
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn set_item(&self, iid: &str, options: &EventOptions) -> Result<Response, Error> {
        self.create_event(SET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Async form of [`set_item`](Self::set_item).
    ///
    /// # Errors
    ///
    /// Same as [`acreate_event`](Self::acreate_event).
    pub fn aset_item(&self, iid: &str, options: &EventOptions) -> Result<AsyncResponse, Error> {
        self.acreate_event(SET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Removes properties of an item (`$unset`).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `options.properties` is absent or
    /// empty, otherwise same as [`create_event`](Self::create_event).
    pub fn unset_item(&self, iid: &str, options: &EventOptions) -> Result<Response, Error> {
        self.create_event(UNSET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Async form of [`unset_item`](Self::unset_item).
    ///
    /// # Errors
    ///
    /// Same as [`unset_item`](Self::unset_item), minus the status check.
    pub fn aunset_item(&self, iid: &str, options: &EventOptions) -> Result<AsyncResponse, Error> {
        self.acreate_event(UNSET_EVENT, ITEM_ENTITY, iid, options)
    }

    /// Deletes an item (`$delete`).
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn delete_item(&self, iid: &str) -> Result<Response, Error> {
        self.create_event(DELETE_EVENT, ITEM_ENTITY, iid, &EventOptions::default())
    }

    /// Async form of [`delete_item`](Self::delete_item).
    ///
    /// # Errors
    ///
    /// Same as [`acreate_event`](Self::acreate_event).
    pub fn adelete_item(&self, iid: &str) -> Result<AsyncResponse, Error> {
        self.acreate_event(DELETE_EVENT, ITEM_ENTITY, iid, &EventOptions::default())
    }

    /// Records that user `uid` performed `action` on item `iid`.
    ///
    /// Any target entity in `options` is replaced by the item.
    ///
    /// # Errors
    ///
    /// Same as [`create_event`](Self::create_event).
    pub fn record_user_action_on_item(
        &self,
        action: &str,
        uid: &str,
        iid: &str,
        options: &EventOptions,
    ) -> Result<Response, Error> {
        self.create_event(action, USER_ENTITY, uid, &targeting_item(options, iid))
    }

    /// Async form of [`record_user_action_on_item`](Self::record_user_action_on_item).
    ///
    /// # Errors
    ///
    /// Same as [`acreate_event`](Self::acreate_event).
    pub fn arecord_user_action_on_item(
        &self,
        action: &str,
        uid: &str,
        iid: &str,
        options: &EventOptions,
    ) -> Result<AsyncResponse, Error> {
        self.acreate_event(action, USER_ENTITY, uid, &targeting_item(options, iid))
    }
}

fn ensure_created(response: Response) -> Result<Response, Error> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(Error::NotCreated {
            status: response.status,
            message: response.error_message(),
        })
    }
}
