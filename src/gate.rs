use std::sync::Arc;

use crate::{
    config::GateConfig,
    decision::{GateDecision, Redirect},
    error::GateError,
    matcher::RouteMatcher,
    request::GateRequest,
    session::{SessionError, SessionLookup, SessionService},
};

/// Where protected requests go when the session state is uncertain.
pub const HOME_PATH: &str = "/";

/// Where protected requests go when the service confirms there is no session.
pub const LOGIN_PATH: &str = "/auth/login";

/// Query parameter carrying the original path to the login page.
pub const RETURN_TO_PARAM: &str = "redirectTo";

/// What the gate learned about the request's session.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The service is not configured; no lookup was attempted
    Unavailable(GateError),
    /// The service answered
    Resolved(SessionLookup),
    /// The service call failed
    Failed(SessionError),
}

/// The request gate.
///
/// `RequestGate` decides, per request, whether to pass it through, pass it
/// through with refreshed session cookies, or redirect it away from the
/// protected namespace. It holds no per-request state and is shared across
/// tasks behind an `Arc`.
///
/// Only a *confirmed* missing principal sends a protected request to the
/// login page. Misconfiguration and service failures send it home instead.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use site_gate::{GateConfig, GateRequest, RequestGate, SessionLookup, SessionOutcome};
/// # use async_trait::async_trait;
/// # use site_gate::{CookieJar, ServiceEndpoint, SessionError, SessionService};
/// # struct NoSessions;
/// # #[async_trait]
/// # impl SessionService for NoSessions {
/// #     async fn lookup(&self, _: &CookieJar, _: ServiceEndpoint<'_>) -> Result<SessionLookup, SessionError> {
/// #         Ok(SessionLookup::anonymous())
/// #     }
/// # }
///
/// let gate = RequestGate::new(Arc::new(GateConfig::unconfigured()), NoSessions);
/// let request = GateRequest::new("/admin/dashboard");
///
/// let decision = gate.resolve(&request, SessionOutcome::Resolved(SessionLookup::anonymous()));
/// assert_eq!(
///     decision.redirect().map(|r| r.location()),
///     Some("/auth/login?redirectTo=%2Fadmin%2Fdashboard".to_string())
/// );
/// ```
pub struct RequestGate<S> {
    config: Arc<GateConfig>,
    matcher: RouteMatcher,
    service: S,
}

impl<S> RequestGate<S> {
    /// Creates a gate with the default route matcher.
    pub fn new(config: Arc<GateConfig>, service: S) -> Self {
        Self {
            config,
            matcher: RouteMatcher::default(),
            service,
        }
    }

    /// Replaces the route matcher.
    #[must_use]
    pub fn with_matcher(mut self, matcher: RouteMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// The shared configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// The route matcher.
    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    /// The session service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Maps a request and its session outcome to a decision.
    ///
    /// This is the whole policy and has no side effects:
    ///
    /// | outcome                 | protected path          | other path        |
    /// |-------------------------|-------------------------|-------------------|
    /// | `Unavailable`           | redirect `/`            | continue          |
    /// | `Failed`                | redirect `/`            | continue          |
    /// | `Resolved`, no principal| redirect `/auth/login`  | continue + cookies|
    /// | `Resolved`, principal   | continue + cookies      | continue + cookies|
    pub fn resolve(&self, request: &GateRequest, outcome: SessionOutcome) -> GateDecision {
        let protected = self.matcher.is_protected(request.path());

        match outcome {
            SessionOutcome::Unavailable(_) | SessionOutcome::Failed(_) => {
                if protected {
                    GateDecision::RedirectTo(
                        Redirect::to(HOME_PATH).with_raw_query(request.query()),
                    )
                } else {
                    GateDecision::Continue
                }
            }
            SessionOutcome::Resolved(SessionLookup {
                principal: None, ..
            }) if protected => GateDecision::RedirectTo(
                Redirect::to(LOGIN_PATH)
                    .with_raw_query(request.query())
                    .with_param(RETURN_TO_PARAM, request.path()),
            ),
            SessionOutcome::Resolved(lookup) => {
                GateDecision::ContinueWithRefreshedCookies(lookup.refreshed_cookies)
            }
        }
    }
}

impl<S: SessionService> RequestGate<S> {
    /// Decides what to do with `request`.
    ///
    /// Excluded paths (static assets) return [`GateDecision::Continue`]
    /// without contacting the session service. Otherwise exactly one lookup
    /// is made, without retries. Errors are logged and folded into the
    /// decision; this method cannot fail.
    pub async fn decide(&self, request: &GateRequest) -> GateDecision {
        let path = request.path();
        if !self.matcher.intercepts(path) {
            tracing::trace!(path, "excluded path, skipping session lookup");
            return GateDecision::Continue;
        }

        let outcome = self.lookup(request).await;
        let decision = self.resolve(request, outcome);

        if let Some(redirect) = decision.redirect() {
            let request_id = request.request_id().unwrap_or("-");
            if redirect.path() == LOGIN_PATH {
                let err = GateError::unauthenticated(path);
                tracing::debug!(request_id, error = %err, "redirecting to login");
            } else {
                tracing::debug!(request_id, path, location = %redirect.location(), "redirecting away from protected path");
            }
        }

        decision
    }

    async fn lookup(&self, request: &GateRequest) -> SessionOutcome {
        let request_id = request.request_id().unwrap_or("-");

        let endpoint = match self.config.endpoint() {
            Ok(endpoint) => endpoint,
            Err(err) => {
                tracing::warn!(request_id, error = %err, "session service not configured, skipping auth");
                return SessionOutcome::Unavailable(err);
            }
        };

        match self.service.lookup(request.cookies(), endpoint).await {
            Ok(lookup) => {
                tracing::trace!(
                    request_id,
                    authenticated = lookup.principal.is_some(),
                    refreshed = lookup.refreshed_cookies.len(),
                    "session resolved"
                );
                SessionOutcome::Resolved(lookup)
            }
            Err(err) => {
                let gate_err = GateError::from(err.clone());
                tracing::error!(
                    request_id,
                    path = request.path(),
                    error = %gate_err,
                    "session lookup failed while checking auth"
                );
                SessionOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GateConfig, ServiceEndpoint};
    use crate::cookie::{CookieJar, SetCookie};
    use crate::request::Principal;
    use async_trait::async_trait;

    struct Fixed(Result<SessionLookup, SessionError>);

    #[async_trait]
    impl SessionService for Fixed {
        async fn lookup(
            &self,
            _cookies: &CookieJar,
            _endpoint: ServiceEndpoint<'_>,
        ) -> Result<SessionLookup, SessionError> {
            self.0.clone()
        }
    }

    fn gate() -> RequestGate<Fixed> {
        RequestGate::new(
            Arc::new(GateConfig::unconfigured()),
            Fixed(Ok(SessionLookup::anonymous())),
        )
    }

    fn unavailable() -> SessionOutcome {
        SessionOutcome::Unavailable(GateError::configuration_missing(vec!["SESSION_SERVICE_URL"]))
    }

    fn failed() -> SessionOutcome {
        SessionOutcome::Failed(SessionError::Transport("refused".to_string()))
    }

    #[test]
    fn unavailable_sends_protected_home() {
        let decision = gate().resolve(&GateRequest::new("/admin/dashboard"), unavailable());
        assert_eq!(decision, GateDecision::RedirectTo(Redirect::to("/")));
    }

    #[test]
    fn unavailable_passes_public_paths() {
        let decision = gate().resolve(&GateRequest::new("/contact"), unavailable());
        assert_eq!(decision, GateDecision::Continue);
    }

    #[test]
    fn failure_sends_protected_home_not_login() {
        let decision = gate().resolve(&GateRequest::new("/admin"), failed());
        assert_eq!(decision.redirect().map(Redirect::path), Some(HOME_PATH));
    }

    #[test]
    fn failure_passes_public_paths_without_cookies() {
        let decision = gate().resolve(&GateRequest::new("/"), failed());
        assert_eq!(decision, GateDecision::Continue);
    }

    #[test]
    fn missing_principal_on_protected_path_goes_to_login() {
        let decision = gate().resolve(
            &GateRequest::new("/admin/leads"),
            SessionOutcome::Resolved(SessionLookup::anonymous()),
        );
        let redirect = decision.redirect().expect("redirect");

        assert_eq!(redirect.path(), LOGIN_PATH);
        assert_eq!(redirect.param(RETURN_TO_PARAM), Some("/admin/leads"));
    }

    #[test]
    fn login_redirect_drops_refreshed_cookies() {
        let lookup = SessionLookup::anonymous().with_cookies(vec![SetCookie::removal("sb")]);
        let decision = gate().resolve(
            &GateRequest::new("/admin"),
            SessionOutcome::Resolved(lookup),
        );

        assert!(decision.is_redirect());
        assert!(decision.refreshed_cookies().is_empty());
    }

    #[test]
    fn principal_on_protected_path_continues_with_cookies() {
        let cookies = vec![SetCookie::new("sb-access", "rotated")];
        let lookup =
            SessionLookup::authenticated(Principal::new("user-1")).with_cookies(cookies.clone());

        let decision = gate().resolve(
            &GateRequest::new("/admin/dashboard"),
            SessionOutcome::Resolved(lookup),
        );

        assert_eq!(decision, GateDecision::ContinueWithRefreshedCookies(cookies));
    }

    #[test]
    fn public_paths_keep_refreshed_cookies_without_principal() {
        let cookies = vec![SetCookie::removal("sb-access")];
        let lookup = SessionLookup::anonymous().with_cookies(cookies.clone());

        let decision = gate().resolve(&GateRequest::new("/"), SessionOutcome::Resolved(lookup));

        assert_eq!(decision, GateDecision::ContinueWithRefreshedCookies(cookies));
    }

    #[test]
    fn redirects_keep_original_query() {
        let request = GateRequest::new("/admin").with_query("tab=x");

        let home = gate().resolve(&request, failed());
        assert_eq!(home.redirect().unwrap().location(), "/?tab=x");

        let login = gate().resolve(&request, SessionOutcome::Resolved(SessionLookup::anonymous()));
        assert_eq!(
            login.redirect().unwrap().location(),
            "/auth/login?tab=x&redirectTo=%2Fadmin"
        );
    }

    #[tokio::test]
    async fn failure_redirect_keeps_query_bytes() {
        let gate = RequestGate::new(
            Arc::new(GateConfig::new(Some("https://auth.example.com"), Some("k"))),
            Fixed(Err(SessionError::Transport("refused".to_string()))),
        );

        let decision = gate
            .decide(&GateRequest::new("/admin").with_query("next=%FF&flag"))
            .await;

        assert_eq!(decision.redirect().unwrap().location(), "/?next=%FF&flag");
    }

    #[tokio::test]
    async fn decide_skips_lookup_for_assets() {
        let gate = RequestGate::new(
            Arc::new(GateConfig::unconfigured()),
            Fixed(Err(SessionError::Internal("must not be called".to_string()))),
        );

        let decision = gate.decide(&GateRequest::new("/admin/logo.png")).await;
        assert_eq!(decision, GateDecision::Continue);
    }

    #[tokio::test]
    async fn decide_with_custom_matcher() {
        let gate = RequestGate::new(
            Arc::new(GateConfig::new(Some("https://auth.example.com"), Some("k"))),
            Fixed(Ok(SessionLookup::anonymous())),
        )
        .with_matcher(RouteMatcher::default().with_protected_prefix("/studio"));

        let studio = gate.decide(&GateRequest::new("/studio")).await;
        let admin = gate.decide(&GateRequest::new("/admin")).await;

        assert_eq!(studio.redirect().map(Redirect::path), Some(LOGIN_PATH));
        assert_eq!(admin, GateDecision::ContinueWithRefreshedCookies(Vec::new()));
    }
}
