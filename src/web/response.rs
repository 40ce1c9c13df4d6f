//! Applying a decision to the forwarded request and the response.

use axum::http::{header, HeaderValue, Request, Response};
use axum::response::IntoResponse;

use crate::cookie::{rewrite_cookie_header, SetCookie};
use crate::decision::Redirect;

/// Builds a `307 Temporary Redirect` to `redirect`.
pub fn redirect_response(redirect: &Redirect) -> axum::response::Response {
    axum::response::Redirect::temporary(&redirect.location()).into_response()
}

/// Appends one `Set-Cookie` header per refreshed cookie.
///
/// Cookies that are not well formed (see [`SetCookie::is_well_formed`]) or
/// cannot be encoded as a header value are dropped with a warning.
pub fn append_set_cookies<B>(response: &mut Response<B>, cookies: &[SetCookie]) {
    for cookie in cookies {
        if !cookie.is_well_formed() {
            tracing::warn!(cookie = cookie.name(), "dropping malformed refreshed cookie");
            continue;
        }
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(_) => {
                tracing::warn!(cookie = cookie.name(), "dropping refreshed cookie with invalid header value");
            }
        }
    }
}

/// Rewrites the forwarded request's `Cookie` header so downstream handlers
/// see the refreshed session in this same request.
///
/// Only the refreshed cookies change; the rest of the header is forwarded
/// in the order the client sent it. Malformed cookies are skipped.
pub fn forward_refreshed_cookies<B>(request: &mut Request<B>, cookies: &[SetCookie]) {
    let cookies: Vec<SetCookie> = cookies
        .iter()
        .filter(|cookie| cookie.is_well_formed())
        .cloned()
        .collect();
    if cookies.is_empty() {
        return;
    }

    let mut sent = Vec::new();
    for value in request.headers().get_all(header::COOKIE) {
        match value.to_str() {
            Ok(value) => sent.push(value),
            Err(_) => {
                tracing::warn!("cookie header is not valid UTF-8, forwarding original cookies");
                return;
            }
        }
    }

    let rewritten = rewrite_cookie_header(&sent.join("; "), &cookies);
    if rewritten.is_empty() {
        request.headers_mut().remove(header::COOKIE);
        return;
    }

    match HeaderValue::from_str(&rewritten) {
        Ok(value) => {
            request.headers_mut().insert(header::COOKIE, value);
        }
        Err(_) => {
            tracing::warn!("refreshed cookies are not a valid header value, forwarding original cookies");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn redirect_is_temporary_with_location() {
        let response =
            redirect_response(&Redirect::to("/auth/login").with_param("redirectTo", "/admin"));

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login?redirectTo=%2Fadmin"
        );
    }

    #[test]
    fn set_cookies_are_appended_not_replaced() {
        let mut response = Response::new(());
        response
            .headers_mut()
            .insert(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));

        append_set_cookies(
            &mut response,
            &[
                SetCookie::new("sb-access", "a").path("/"),
                SetCookie::removal("sb-refresh"),
            ],
        );

        let values: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            values,
            vec![
                "theme=dark".to_string(),
                "sb-access=a; Path=/".to_string(),
                "sb-refresh=; Path=/; Max-Age=0".to_string(),
            ]
        );
    }

    #[test]
    fn invalid_cookie_value_is_dropped() {
        let mut response = Response::new(());
        append_set_cookies(&mut response, &[SetCookie::new("bad", "line\nbreak")]);

        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[test]
    fn injected_attributes_are_not_emitted() {
        let mut response = Response::new(());
        append_set_cookies(
            &mut response,
            &[
                SetCookie::new("sb", "v; Domain=evil.example"),
                SetCookie::new("sb-access", "ok").path("/"),
            ],
        );

        let values: Vec<_> = response.headers().get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(values, vec!["sb-access=ok; Path=/"]);
    }

    #[test]
    fn forwarded_cookie_header_reflects_refresh() {
        let mut request = Request::builder()
            .header(header::COOKIE, "theme=dark; sb-access=old; consent")
            .body(())
            .unwrap();

        forward_refreshed_cookies(&mut request, &[SetCookie::new("sb-access", "new")]);

        assert_eq!(
            request.headers().get(header::COOKIE).unwrap(),
            "theme=dark; sb-access=new; consent"
        );
    }

    #[test]
    fn multiple_cookie_headers_are_merged() {
        let mut request = Request::builder()
            .header(header::COOKIE, "z=1")
            .header(header::COOKIE, "sb-access=old")
            .body(())
            .unwrap();

        forward_refreshed_cookies(&mut request, &[SetCookie::new("sb-access", "new")]);

        let values: Vec<_> = request.headers().get_all(header::COOKIE).iter().collect();
        assert_eq!(values, vec!["z=1; sb-access=new"]);
    }

    #[test]
    fn malformed_refresh_is_not_forwarded() {
        let mut request = Request::builder()
            .header(header::COOKIE, "sb=old")
            .body(())
            .unwrap();

        forward_refreshed_cookies(&mut request, &[SetCookie::new("sb", "v; admin=1")]);

        assert_eq!(request.headers().get(header::COOKIE).unwrap(), "sb=old");
    }

    #[test]
    fn removing_last_cookie_drops_header() {
        let mut request = Request::builder()
            .header(header::COOKIE, "sb-access=old")
            .body(())
            .unwrap();

        forward_refreshed_cookies(&mut request, &[SetCookie::removal("sb-access")]);

        assert!(request.headers().get(header::COOKIE).is_none());
    }

    #[test]
    fn no_refresh_leaves_request_untouched() {
        let mut request = Request::builder()
            .header(header::COOKIE, "a=1;  b")
            .body(())
            .unwrap();

        forward_refreshed_cookies(&mut request, &[]);

        assert_eq!(request.headers().get(header::COOKIE).unwrap(), "a=1;  b");
    }
}
