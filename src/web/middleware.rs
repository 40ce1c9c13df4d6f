//! The axum middleware that runs the gate.
//!
//! ```text
//! HTTP Request
//!   ↓
//! excluded path? ──yes──→ next handler
//!   ↓ no
//! GateRequest::from(&request)
//!   ↓
//! RequestGate::decide (one session lookup)
//!   ↓
//! Continue            → next handler
//! ContinueWithCookies → next handler + Cookie rewrite + Set-Cookie
//! RedirectTo          → 307, handler never runs
//! ```

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tracing::Instrument;

use crate::decision::GateDecision;
use crate::gate::RequestGate;
use crate::request::GateRequest;
use crate::session::SessionService;

use super::response::{append_set_cookies, forward_refreshed_cookies, redirect_response};

/// Gates one request; use with [`axum::middleware::from_fn_with_state`].
///
/// # Examples
///
/// ```ignore
/// let app = Router::new()
///     .route("/admin/dashboard", get(dashboard))
///     .layer(axum::middleware::from_fn_with_state(gate, gate_middleware::<MyService>));
/// ```
pub async fn gate_middleware<S>(
    State(gate): State<Arc<RequestGate<S>>>,
    mut request: Request,
    next: Next,
) -> Response
where
    S: SessionService + 'static,
{
    if !gate.matcher().intercepts(request.uri().path()) {
        return next.run(request).await;
    }

    let view = GateRequest::from(&request);
    let span = tracing::debug_span!(
        "request_gate",
        request_id = view.request_id().unwrap_or("-"),
        path = view.path()
    );

    match gate.decide(&view).instrument(span).await {
        GateDecision::Continue => next.run(request).await,
        GateDecision::ContinueWithRefreshedCookies(cookies) => {
            forward_refreshed_cookies(&mut request, &cookies);
            let mut response = next.run(request).await;
            append_set_cookies(&mut response, &cookies);
            response
        }
        GateDecision::RedirectTo(redirect) => redirect_response(&redirect),
    }
}

/// Wraps every route of `router` in the gate.
pub fn with_request_gate<S>(router: Router, gate: Arc<RequestGate<S>>) -> Router
where
    S: SessionService + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, gate_middleware::<S>))
}
