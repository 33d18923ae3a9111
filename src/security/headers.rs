//! Security response headers.
//!
//! # Responsibilities
//! - Apply CORS headers for cross-origin callers
//!
//! # Design Decisions
//! - Only requests carrying an `Origin` header get CORS headers
//! - The requested headers are echoed back verbatim

use axum::http::{header, HeaderMap, HeaderValue};

const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const EXPOSED_HEADERS: &str = "Server, Content-Type, Content-Length, Content-Encoding, X-Request-Id";

/// Apply CORS headers derived from `request` onto `response`.
pub fn apply_cors_headers(request: &HeaderMap, response: &mut HeaderMap) {
    let Some(origin) = request.get(header::ORIGIN) else {
        return;
    };

    response.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    response.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    response.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSED_HEADERS),
    );
    if let Some(requested) = request.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
        response.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
    }
    response.append(header::VARY, HeaderValue::from_static("Origin"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_origin_no_headers() {
        let mut response = HeaderMap::new();
        apply_cors_headers(&HeaderMap::new(), &mut response);
        assert!(response.is_empty());
    }

    #[test]
    fn test_origin_echoed() {
        let mut request = HeaderMap::new();
        request.insert(header::ORIGIN, HeaderValue::from_static("http://studio.local"));
        request.insert(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            HeaderValue::from_static("content-type"),
        );

        let mut response = HeaderMap::new();
        apply_cors_headers(&request, &mut response);
        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://studio.local");
        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_HEADERS], "content-type");
        assert_eq!(response[header::ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
    }
}
