//! HTTP middleware for the API server.

use axum::{
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware::Next,
    response::Response,
};
use popo_trace::request_span;
use tower_http::cors::{Any, CorsLayer};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create CORS middleware layer. The API is read-only.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any)
}

/// Span for the trace layer, tagged with the request id.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    request_span(request.method().as_str(), request.uri().path(), request_id)
}

/// Ensure every request carries a request id and echo it on the response.
/// A caller-supplied id is kept.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = match request.headers().get(REQUEST_ID_HEADER) {
        Some(value) => value.clone(),
        None => {
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER, generated.clone());
            generated
        }
    };

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}
