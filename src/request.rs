use crate::cookie::CookieJar;

/// The gate's read-only view of an inbound request.
///
/// Built by the web adapter from a framework request, or by hand in tests.
/// Header names are compared case-insensitively.
///
/// # Examples
///
/// ```
/// use site_gate::GateRequest;
///
/// let request = GateRequest::new("/admin/dashboard")
///     .with_query("tab=users")
///     .with_cookie_header("sb-access=abc");
///
/// assert_eq!(request.path(), "/admin/dashboard");
/// assert_eq!(request.query(), Some("tab=users"));
/// assert_eq!(request.cookies().get("sb-access"), Some("abc"));
/// ```
#[derive(Debug, Clone)]
pub struct GateRequest {
    request_id: Option<String>,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    cookies: CookieJar,
}

impl GateRequest {
    /// Creates a request for `path` with no query, headers or cookies.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            request_id: None,
            path: path.into(),
            query: None,
            headers: Vec::new(),
            cookies: CookieJar::new(),
        }
    }

    /// Sets the identifier used to correlate log lines.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the raw (still encoded) query string, without the leading `?`.
    ///
    /// An empty query is treated as absent.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Merges the cookies of a `Cookie` header value.
    #[must_use]
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.cookies.extend_from_header(header);
        self
    }

    /// Sets a single cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.set(name, value);
        self
    }

    /// Request identifier, if one was assigned.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Cookies sent with the request; these are the session credentials.
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }
}

/// An authenticated user resolved by the session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Unique identifier for this principal
    pub id: String,
    /// Email address, when the service reports one
    pub email: Option<String>,
}

impl Principal {
    /// Creates a principal with no email.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }
}
