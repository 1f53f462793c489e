//! Tests for resolved request and response types.

use super::{HttpError, HttpRequest, Response};
use super::test_fixtures::response;

mod http_request {
    use super::*;

    #[test]
    fn new_creates_request_with_method_and_url() {
        let url = url::Url::parse("http://localhost:7070/events.json").unwrap();
        let req = HttpRequest::new(http::Method::DELETE, url.clone());

        assert_eq!(req.method, http::Method::DELETE);
        assert_eq!(req.url, url);
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn with_header_appends_multiple_values_for_same_name() {
        let url = url::Url::parse("http://localhost:7070/").unwrap();
        let req = HttpRequest::new(http::Method::GET, url)
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            )
            .with_header(http::header::ACCEPT, http::HeaderValue::from_static("*/*"));

        assert_eq!(req.headers.get_all(http::header::ACCEPT).iter().count(), 2);
    }

    #[test]
    fn with_body_sets_body() {
        let url = url::Url::parse("http://localhost:7070/").unwrap();
        let req = HttpRequest::new(http::Method::POST, url).with_body(b"{}".to_vec());

        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }
}

mod http_response {
    use super::*;

    #[test]
    fn is_success_for_2xx_only() {
        assert!(response(200, "").is_success());
        assert!(response(201, "").is_success());
        assert!(!response(400, "").is_success());
        assert!(!response(500, "").is_success());
    }

    #[test]
    fn body_text_returns_none_for_invalid_utf8() {
        let resp = Response::new(
            http::StatusCode::OK,
            http::HeaderMap::new(),
            vec![0xff, 0xfe],
        );

        assert!(resp.body_text().is_none());
    }

    #[test]
    fn json_decodes_body() {
        let resp = response(201, r#"{"eventId":"abc"}"#);
        let value: serde_json::Value = resp.json().unwrap();

        assert_eq!(value["eventId"], "abc");
    }

    #[test]
    fn json_fails_on_non_json_body() {
        let resp = response(200, "not json");

        assert!(resp.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn error_message_prefers_message_field() {
        let resp = response(400, r#"{"message":"Field entityId is required"}"#);

        assert_eq!(resp.error_message(), "Field entityId is required");
    }

    #[test]
    fn error_message_falls_back_to_body() {
        let resp = response(500, "  boom  ");

        assert_eq!(resp.error_message(), "boom");
    }

    #[test]
    fn error_message_falls_back_to_reason_phrase() {
        let resp = response(401, "");

        assert_eq!(resp.error_message(), "Unauthorized");
    }
}

mod http_error {
    use super::*;

    #[test]
    fn transport_failures_are_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

        assert!(HttpError::Connection(Box::new(io)).is_retryable());
        assert!(HttpError::Timeout.is_retryable());
    }

    #[test]
    fn invalid_url_is_not_retryable() {
        assert!(!HttpError::InvalidUrl("nope".to_string()).is_retryable());
    }

    #[test]
    fn display_includes_cause() {
        let err = HttpError::InvalidUrl("ftp://x".to_string());

        assert_eq!(err.to_string(), "Invalid URL: ftp://x");
    }
}
