//! Mapping framework requests to [`GateRequest`].

use std::sync::atomic::{AtomicU64, Ordering};

use axum::http::{header, HeaderMap, Request};

use crate::request::GateRequest;

/// Header consulted for an upstream request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Returns the request id from [`REQUEST_ID_HEADER`], or a fresh
/// process-local one (`gate-<n>`) when the header is absent or unreadable.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("gate-{}", NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)))
}

/// Builds the gate's view of an HTTP request.
///
/// `Cookie` headers are parsed into the cookie jar and kept out of the plain
/// header list, so they never show up in `Debug` output. Non-UTF-8 header
/// values are skipped.
///
/// # Examples
///
/// ```
/// use axum::http::Request;
/// use site_gate::GateRequest;
///
/// let http = Request::builder()
///     .uri("/admin/dashboard?tab=leads")
///     .header("cookie", "sb-access=abc")
///     .header("x-request-id", "req-42")
///     .body(())
///     .unwrap();
///
/// let request = GateRequest::from(&http);
/// assert_eq!(request.path(), "/admin/dashboard");
/// assert_eq!(request.query(), Some("tab=leads"));
/// assert_eq!(request.request_id(), Some("req-42"));
/// assert_eq!(request.cookies().get("sb-access"), Some("abc"));
/// ```
impl<B> From<&Request<B>> for GateRequest {
    fn from(request: &Request<B>) -> Self {
        let uri = request.uri();
        let mut gate_request =
            GateRequest::new(uri.path()).with_request_id(request_id(request.headers()));

        if let Some(query) = uri.query() {
            gate_request = gate_request.with_query(query);
        }

        for (name, value) in request.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            if name == header::COOKIE {
                gate_request = gate_request.with_cookie_header(value);
            } else {
                gate_request = gate_request.with_header(name.as_str(), value);
            }
        }

        gate_request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_cookie_headers_are_merged() {
        let http = Request::builder()
            .uri("/")
            .header(header::COOKIE, "a=1")
            .header(header::COOKIE, "b=2")
            .body(())
            .unwrap();

        let request = GateRequest::from(&http);

        assert_eq!(request.cookies().get("a"), Some("1"));
        assert_eq!(request.cookies().get("b"), Some("2"));
        assert!(request.header("cookie").is_none());
    }

    #[test]
    fn generated_request_ids_are_unique() {
        let headers = HeaderMap::new();
        let first = request_id(&headers);
        let second = request_id(&headers);

        assert!(first.starts_with("gate-"));
        assert_ne!(first, second);
    }

    #[test]
    fn upstream_request_id_is_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "edge-123".parse().unwrap());

        assert_eq!(request_id(&headers), "edge-123");
    }

    #[test]
    fn other_headers_are_kept() {
        let http = Request::builder()
            .uri("/contact")
            .header("user-agent", "curl/8")
            .body(())
            .unwrap();

        let request = GateRequest::from(&http);
        assert_eq!(request.header("User-Agent"), Some("curl/8"));
        assert!(request.query().is_none());
    }
}
