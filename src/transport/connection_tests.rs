//! Tests for `Connection` dispatch, retry, and `AsyncResponse`.

use std::sync::Arc;
use std::time::Duration;

use super::test_fixtures::{
    MockClient, attached_connection, base_url, connection, connection_with_policy, response,
};
use super::{ConnectionBuilder, HttpError, Request, RetryPolicy};
use crate::error::Error;
use crate::time::Sleeper;

mod blocking {
    use super::*;

    #[test]
    fn send_returns_response() {
        let client = Arc::new(MockClient::always(200, r#"{"status":"alive"}"#));
        let conn = connection(Arc::clone(&client));

        let resp = conn.send(Request::get("/")).unwrap();

        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(resp.body_text(), Some(r#"{"status":"alive"}"#));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn get_post_delete_override_method() {
        let client = Arc::new(MockClient::always(200, "{}"));
        let conn = connection(Arc::clone(&client));

        conn.get(Request::post("/a")).unwrap();
        conn.post(Request::get("/b")).unwrap();
        conn.delete(Request::get("/c")).unwrap();

        let methods: Vec<_> = client
            .captured_requests()
            .into_iter()
            .map(|r| r.method)
            .collect();
        assert_eq!(
            methods,
            [http::Method::GET, http::Method::POST, http::Method::DELETE]
        );
    }

    #[test]
    fn request_is_resolved_against_base_url() {
        let client = Arc::new(MockClient::always(201, "{}"));
        let conn = connection(Arc::clone(&client));

        conn.post(Request::post("/events.json").with_param("accessKey", "k"))
            .unwrap();

        assert_eq!(
            client.last_request().url.as_str(),
            "http://localhost:7070/events.json?accessKey=k"
        );
    }

    #[test]
    fn http_error_status_is_returned_as_data() {
        let client = Arc::new(MockClient::always(500, "internal error"));
        let conn = connection(Arc::clone(&client));

        let resp = conn.send(Request::get("/")).unwrap();

        assert_eq!(resp.status, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(client.calls(), 1, "HTTP errors must not be retried");
    }

    #[test]
    fn base_url_and_policy_are_exposed() {
        let conn = connection(Arc::new(MockClient::always(200, "")));

        assert_eq!(conn.base_url(), &base_url());
        assert_eq!(conn.retry_policy(), &RetryPolicy::new());
    }
}

mod retrying {
    use super::*;

    #[test]
    fn transient_failures_are_retried_until_success() {
        let client = Arc::new(MockClient::failing_then(2, 200, "ok"));
        let conn = connection(Arc::clone(&client));

        let resp = conn.send(Request::get("/")).unwrap();

        assert_eq!(resp.body_text(), Some("ok"));
        assert_eq!(client.calls(), 3);
    }

    #[test]
    fn exhausting_attempts_returns_timeout_and_stops() {
        let client = Arc::new(MockClient::always_failing());
        let policy = RetryPolicy::new().with_max_attempts(4);
        let conn = connection_with_policy(Arc::clone(&client), policy);

        let err = conn.send(Request::get("/")).unwrap_err();

        assert!(matches!(
            err,
            Error::Timeout {
                attempts: 4,
                last_error: HttpError::Timeout
            }
        ));
        assert_eq!(client.calls(), 4);
    }

    #[test]
    fn retries_resend_the_same_request() {
        let client = Arc::new(MockClient::failing_then(1, 201, "{}"));
        let conn = connection(Arc::clone(&client));

        conn.post(Request::post("/events.json").with_body(b"{\"a\":1}".to_vec()))
            .unwrap();

        let requests = client.captured_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, requests[1].url);
        assert_eq!(requests[0].body, requests[1].body);
    }

    #[test]
    fn invalid_url_fails_without_retry() {
        let client = Arc::new(MockClient::new(vec![Err(HttpError::InvalidUrl(
            "bad".to_string(),
        ))]));
        let conn = connection(Arc::clone(&client));

        let err = conn.send(Request::get("/")).unwrap_err();

        assert!(matches!(err, Error::Transport(HttpError::InvalidUrl(_))));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let client = Arc::new(MockClient::failing_then(1, 200, "ok"));
        let conn = connection_with_policy(Arc::clone(&client), RetryPolicy::no_retry());

        let err = conn.send(Request::get("/")).unwrap_err();

        assert!(matches!(err, Error::Timeout { attempts: 1, .. }));
        assert_eq!(client.calls(), 1);
    }

    /// Sleeper that records requested delays without sleeping.
    #[derive(Debug, Default)]
    struct RecordingSleeper {
        delays: std::sync::Mutex<Vec<Duration>>,
    }

    impl Sleeper for Arc<RecordingSleeper> {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn sleeps_between_attempts_but_not_after_last() {
        let client = Arc::new(MockClient::always_failing());
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new()
            .with_max_attempts(3)
            .with_initial_delay(Duration::from_millis(10))
            .with_multiplier(2.0);
        let conn = ConnectionBuilder::new(Arc::clone(&client), base_url())
            .with_retry_policy(policy)
            .with_sleeper(Arc::clone(&sleeper))
            .build()
            .unwrap();

        let _ = conn.send(Request::get("/"));

        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            [Duration::from_millis(10), Duration::from_millis(20)]
        );
    }
}

mod async_dispatch {
    use super::*;

    #[test]
    fn wait_returns_same_response_as_blocking_call() {
        let client = Arc::new(MockClient::always(201, r#"{"eventId":"e1"}"#));
        let conn = connection(Arc::clone(&client));

        let blocking = conn
            .post(Request::post("/events.json").with_body(b"{}".to_vec()))
            .unwrap();
        let handle = conn.apost(Request::post("/events.json").with_body(b"{}".to_vec()));
        let waited = handle.wait().unwrap();

        assert_eq!(blocking, waited);
        let requests = client.captured_requests();
        assert_eq!(requests[0].url, requests[1].url);
        assert_eq!(requests[0].method, requests[1].method);
        assert_eq!(requests[0].body, requests[1].body);
    }

    #[test]
    fn many_handles_resolve_independently() {
        let client = Arc::new(MockClient::always(200, "{}"));
        let conn = connection(Arc::clone(&client));

        let handles: Vec<_> = (0..10)
            .map(|i| conn.aget(Request::get(format!("/events/{i}.json"))))
            .collect();

        for handle in handles {
            assert_eq!(handle.wait().unwrap().status, http::StatusCode::OK);
        }
        assert_eq!(client.calls(), 10);
    }

    #[test]
    fn async_errors_surface_on_wait() {
        let client = Arc::new(MockClient::always_failing());
        let conn = connection_with_policy(Arc::clone(&client), RetryPolicy::no_retry());

        let err = conn.adelete(Request::delete("/events/x.json")).wait().unwrap_err();

        assert!(matches!(err, Error::Timeout { attempts: 1, .. }));
    }

    #[test]
    fn handle_reports_completion() {
        let client = Arc::new(MockClient::always(200, "{}"));
        let conn = connection(client);

        let handle = conn.aget(Request::get("/"));
        while !handle.is_finished() {
            std::thread::yield_now();
        }

        assert!(handle.wait().is_ok());
    }

    #[tokio::test]
    async fn handle_can_be_awaited() {
        let client = Arc::new(MockClient::always(200, "pong"));
        let conn = attached_connection(Arc::clone(&client));

        let resp = conn.aget(Request::get("/")).await.unwrap();

        assert_eq!(resp.body_text(), Some("pong"));
    }

    #[tokio::test]
    async fn execute_runs_inside_existing_runtime() {
        let client = Arc::new(MockClient::failing_then(1, 200, "ok"));
        let conn = attached_connection(Arc::clone(&client));

        let resp = conn.execute(Request::get("/")).await.unwrap();

        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn owned_connection_can_be_dropped_inside_runtime() {
        let client = Arc::new(MockClient::always(200, "pong"));
        let conn = connection(Arc::clone(&client));

        let resp = conn.aget(Request::get("/")).await.unwrap();
        drop(conn);

        assert_eq!(resp.body_text(), Some("pong"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn pending_handle_outlives_dropped_connection() {
        let client = Arc::new(MockClient::always(200, "pong"));
        let conn = connection(Arc::clone(&client));

        let handle = conn.aget(Request::get("/"));
        drop(conn);
        let resp = handle.await.unwrap();

        assert_eq!(resp.status, http::StatusCode::OK);
    }

    #[test]
    fn connection_clones_share_client() {
        let client = Arc::new(MockClient::always(200, ""));
        let conn = connection(Arc::clone(&client));
        let clone = conn.clone();

        conn.send(Request::get("/")).unwrap();
        clone.send(Request::get("/")).unwrap();

        assert_eq!(client.calls(), 2);
    }

    #[test]
    fn response_and_error_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<super::super::AsyncResponse>();
        assert_send::<Error>();
    }
}

#[test]
fn connect_rejects_invalid_url() {
    let err = super::Connection::connect("not a url").unwrap_err();

    assert!(matches!(err, Error::Transport(HttpError::InvalidUrl(_))));
}

#[test]
fn connect_accepts_default_url() {
    let conn = super::Connection::connect(crate::DEFAULT_EVENT_URL).unwrap();

    assert_eq!(conn.base_url().as_str(), "http://localhost:7070/");
}

#[test]
fn retry_sequence_with_scripted_responses() {
    let client = Arc::new(MockClient::new(vec![
        Err(HttpError::Timeout),
        Ok(response(404, r#"{"message":"Not Found"}"#)),
    ]));
    let conn = connection(Arc::clone(&client));

    let resp = conn.get(Request::get("/events/missing.json")).unwrap();

    assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "Not Found");
    assert_eq!(client.calls(), 2);
}
