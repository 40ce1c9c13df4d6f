//! axum integration.
//!
//! The gate itself knows nothing about HTTP frameworks. This module is the
//! boundary that:
//! - maps an `http::Request` to a [`GateRequest`](crate::GateRequest)
//! - runs [`RequestGate::decide`](crate::RequestGate::decide) inside a
//!   `tracing` span carrying the request id
//! - applies the resulting [`GateDecision`](crate::GateDecision) to the
//!   forwarded request and the outgoing response
//!
//! # Example Flow
//!
//! ```ignore
//! let config = Arc::new(GateConfig::from_env());
//! let gate = Arc::new(RequestGate::new(config, my_session_service));
//!
//! let app = Router::new()
//!     .route("/", get(landing))
//!     .route("/admin/dashboard", get(dashboard));
//!
//! let app = with_request_gate(app, gate);
//! ```

mod adapter;
mod middleware;
mod response;

pub use adapter::{request_id, REQUEST_ID_HEADER};
pub use middleware::{gate_middleware, with_request_gate};
pub use response::{append_set_cookies, forward_refreshed_cookies, redirect_response};
