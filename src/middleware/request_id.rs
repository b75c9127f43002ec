use axum::{body::Body, extract::Request, http::HeaderName};

/// HTTP header carrying the request ID
///
/// Incoming values are kept as-is by `SetRequestIdLayer`, so a UI can correlate
/// its own logs with the gateway's. Requests without one get a UUID v4.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Creates the tracing span for one HTTP request, tagged with its request ID
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
