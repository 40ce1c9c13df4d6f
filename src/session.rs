//! The session service collaborator.
//!
//! The gate never talks to an identity provider itself. It hands the request
//! cookies to a [`SessionService`] and gets back either a [`SessionLookup`]
//! (principal or none, plus cookies to refresh) or a [`SessionError`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ServiceEndpoint;
use crate::cookie::{CookieJar, SetCookie};
use crate::request::Principal;

/// Result of a successful session lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLookup {
    /// The resolved principal, or `None` if the cookies carry no valid session
    pub principal: Option<Principal>,
    /// Cookies the service wants set on the response (rotation/refresh)
    pub refreshed_cookies: Vec<SetCookie>,
}

impl SessionLookup {
    /// A lookup that found no session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A lookup that resolved `principal`.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            refreshed_cookies: Vec::new(),
        }
    }

    /// Attaches refreshed cookies.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<SetCookie>) -> Self {
        self.refreshed_cookies = cookies;
        self
    }
}

/// Why a session lookup failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The service could not be reached
    Transport(String),
    /// The service answered with something unreadable
    MalformedResponse(String),
    /// Any other failure inside the service client
    Internal(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(msg) => write!(f, "session service unreachable: {}", msg),
            SessionError::MalformedResponse(msg) => {
                write!(f, "malformed session service response: {}", msg)
            }
            SessionError::Internal(msg) => write!(f, "session service error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

/// Resolves a principal from request cookies.
///
/// Implementations perform exactly one round trip per call and must not
/// retry; the gate applies its own fallback policy on failure.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use site_gate::{CookieJar, Principal, ServiceEndpoint, SessionError, SessionLookup, SessionService};
///
/// struct CookiePresence;
///
/// #[async_trait]
/// impl SessionService for CookiePresence {
///     async fn lookup(
///         &self,
///         cookies: &CookieJar,
///         _endpoint: ServiceEndpoint<'_>,
///     ) -> Result<SessionLookup, SessionError> {
///         Ok(match cookies.get("session") {
///             Some(id) => SessionLookup::authenticated(Principal::new(id)),
///             None => SessionLookup::anonymous(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Looks up the session carried by `cookies`.
    async fn lookup(
        &self,
        cookies: &CookieJar,
        endpoint: ServiceEndpoint<'_>,
    ) -> Result<SessionLookup, SessionError>;
}

#[async_trait]
impl<S> SessionService for Arc<S>
where
    S: SessionService + ?Sized,
{
    async fn lookup(
        &self,
        cookies: &CookieJar,
        endpoint: ServiceEndpoint<'_>,
    ) -> Result<SessionLookup, SessionError> {
        (**self).lookup(cookies, endpoint).await
    }
}
