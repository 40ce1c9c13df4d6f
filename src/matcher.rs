//! Route filtering for the gate.
//!
//! Two questions are answered here: should the gate look at this request at
//! all (static assets are skipped so they never cost a session lookup), and
//! is the path inside the protected namespace.

/// Path prefix that requires an authenticated principal.
pub const PROTECTED_PREFIX: &str = "/admin";

/// Leading path fragments (after the initial `/`) that are never intercepted.
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &["_next/static", "_next/image", "favicon.ico"];

/// File extensions that are never intercepted.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["svg", "png", "jpg", "jpeg", "gif", "webp"];

/// Decides which paths the gate intercepts and which ones it protects.
///
/// Both checks are plain string tests, not a routing table: `/administrator`
/// is protected just like `/admin/users`.
///
/// # Examples
///
/// ```
/// use site_gate::RouteMatcher;
///
/// let matcher = RouteMatcher::default();
///
/// assert!(matcher.intercepts("/admin/dashboard"));
/// assert!(!matcher.intercepts("/logo.png"));
/// assert!(!matcher.intercepts("/favicon.ico"));
///
/// assert!(matcher.is_protected("/admin/dashboard"));
/// assert!(!matcher.is_protected("/contact"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatcher {
    protected_prefix: String,
    excluded_prefixes: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self {
            protected_prefix: PROTECTED_PREFIX.to_string(),
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl RouteMatcher {
    /// Replaces the protected prefix.
    #[must_use]
    pub fn with_protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.protected_prefix = prefix.into();
        self
    }

    /// Adds an excluded leading fragment, written without the initial `/`.
    #[must_use]
    pub fn exclude_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.excluded_prefixes.push(prefix.into());
        self
    }

    /// Adds an excluded file extension, written without the dot.
    #[must_use]
    pub fn exclude_extension(mut self, extension: impl Into<String>) -> Self {
        self.excluded_extensions.push(extension.into());
        self
    }

    /// The protected path prefix.
    pub fn protected_prefix(&self) -> &str {
        &self.protected_prefix
    }

    /// Returns `true` if the gate should run for `path`.
    pub fn intercepts(&self, path: &str) -> bool {
        let rest = path.strip_prefix('/').unwrap_or(path);

        if self
            .excluded_prefixes
            .iter()
            .any(|prefix| rest.starts_with(prefix.as_str()))
        {
            return false;
        }

        match rest.rsplit_once('.') {
            Some((_, extension)) => !self
                .excluded_extensions
                .iter()
                .any(|excluded| excluded == extension),
            None => true,
        }
    }

    /// Returns `true` if `path` is inside the protected namespace.
    pub fn is_protected(&self, path: &str) -> bool {
        path.starts_with(self.protected_prefix.as_str())
    }
}
