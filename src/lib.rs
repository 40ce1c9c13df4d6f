//! Request gating for a small website with a protected admin section.
//!
//! Every inbound request that is not a static asset passes through a
//! [`RequestGate`], which asks an external [`SessionService`] who the caller
//! is and returns a [`GateDecision`]:
//! - **Continue**: forward the request unchanged
//! - **ContinueWithRefreshedCookies**: forward it and set rotated session cookies
//! - **RedirectTo**: send the caller elsewhere (`/` or `/auth/login`)
//!
//! # Core Types
//!
//! - [`GateConfig`]: session service URL and key, loaded once at startup
//! - [`ServiceKey`]: redacting wrapper around the service key
//! - [`GateRequest`]: the gate's view of a request (path, query, cookies)
//! - [`RouteMatcher`]: static-asset exclusion and the `/admin` prefix test
//! - [`SessionService`]: the collaborator that resolves a [`Principal`]
//! - [`RequestGate`]: the decision logic
//! - [`web`]: axum middleware applying decisions to real requests
//!
//! # Failure policy
//!
//! The gate never fails. A missing configuration or a failed session lookup
//! is logged through `tracing` and sends protected requests home; only a
//! session service that answers "no principal" sends them to the login page.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use site_gate::{
//!     CookieJar, GateConfig, GateRequest, Principal, RequestGate,
//!     ServiceEndpoint, SessionError, SessionLookup, SessionService,
//! };
//!
//! struct CookieSessions;
//!
//! #[async_trait]
//! impl SessionService for CookieSessions {
//!     async fn lookup(
//!         &self,
//!         cookies: &CookieJar,
//!         _endpoint: ServiceEndpoint<'_>,
//!     ) -> Result<SessionLookup, SessionError> {
//!         Ok(match cookies.get("session") {
//!             Some(id) => SessionLookup::authenticated(Principal::new(id)),
//!             None => SessionLookup::anonymous(),
//!         })
//!     }
//! }
//!
//! # tokio_test_block_on(async {
//! let config = Arc::new(GateConfig::new(Some("https://auth.example.com"), Some("anon-key")));
//! let gate = RequestGate::new(config, CookieSessions);
//!
//! let anonymous = gate.decide(&GateRequest::new("/admin/dashboard")).await;
//! assert_eq!(
//!     anonymous.redirect().unwrap().location(),
//!     "/auth/login?redirectTo=%2Fadmin%2Fdashboard"
//! );
//!
//! let signed_in = GateRequest::new("/admin/dashboard").with_cookie("session", "user-1");
//! assert!(!gate.decide(&signed_in).await.is_redirect());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cookie;
mod decision;
mod error;
mod gate;
mod matcher;
mod request;
mod secret;
mod session;
pub mod web;

pub use config::{GateConfig, ServiceEndpoint, SERVICE_KEY_VAR, SERVICE_URL_VAR};
pub use cookie::{rewrite_cookie_header, CookieJar, SameSite, SetCookie};
pub use decision::{GateDecision, Redirect};
pub use error::{GateError, GateErrorKind};
pub use gate::{RequestGate, SessionOutcome, HOME_PATH, LOGIN_PATH, RETURN_TO_PARAM};
pub use matcher::{
    RouteMatcher, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_EXCLUDED_PREFIXES, PROTECTED_PREFIX,
};
pub use request::{GateRequest, Principal};
pub use secret::ServiceKey;
pub use session::{SessionError, SessionLookup, SessionService};
