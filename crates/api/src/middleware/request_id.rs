//! Request correlation IDs.
//!
//! Every request carries an `x-request-id`, either minted here or taken
//! from an upstream proxy, and the same value goes into the tracing span,
//! the Sentry scope, and the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuse an upstream-assigned request ID, or mint a fresh one.
fn resolve_request_id(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(&request);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_upstream_id_is_reused() {
        let request = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(resolve_request_id(&request), "abc-123");
    }

    #[test]
    fn test_missing_id_is_minted() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let id = resolve_request_id(&request);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_empty_id_is_replaced() {
        let request = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "")
            .body(Body::empty())
            .unwrap();
        let id = resolve_request_id(&request);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
