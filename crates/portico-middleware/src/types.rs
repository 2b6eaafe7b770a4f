//! Common types used throughout the handler chain.
//!
//! This module re-exports HTTP request and response types used by middleware.

use bytes::Bytes;
use http_body_util::Full;
use portico_core::GatewayResult;

/// The HTTP request type used in the handler chain.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the handler chain.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// What every handler in a chain produces.
pub type MiddlewareResult = GatewayResult<Response>;

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a plain-text response with the given status code.
    fn text(status: http::StatusCode, message: &str) -> Response;

    /// Creates a JSON response from a serializable value.
    fn json(status: http::StatusCode, body: &serde_json::Value) -> Response;
}

impl ResponseExt for Response {
    fn text(status: http::StatusCode, message: &str) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::from(message.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    fn json(status: http::StatusCode, body: &serde_json::Value) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::from(body.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_text_response() {
        let response = Response::text(StatusCode::OK, "hello");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(StatusCode::UNAUTHORIZED, &serde_json::json!({"a": 1}));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
