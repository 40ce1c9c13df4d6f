//! Gate configuration.
//!
//! The gate needs two settings to reach the session service: its URL and its
//! key. Both come from the environment once, at process start, and the
//! resulting [`GateConfig`] is shared with the gate by `Arc`.

use crate::error::GateError;
use crate::secret::ServiceKey;

/// Environment variable holding the session service URL.
pub const SERVICE_URL_VAR: &str = "SESSION_SERVICE_URL";

/// Environment variable holding the session service key.
pub const SERVICE_KEY_VAR: &str = "SESSION_SERVICE_KEY";

/// Session service settings.
///
/// Empty values are normalized to "absent", so a blank environment variable
/// leaves the gate unconfigured.
///
/// # Examples
///
/// ```
/// use site_gate::GateConfig;
///
/// let config = GateConfig::new(Some("https://auth.example.com"), Some("anon-key"));
/// assert!(config.is_configured());
///
/// let empty = GateConfig::unconfigured();
/// assert!(empty.endpoint().is_err());
/// ```
#[derive(Debug, Default)]
pub struct GateConfig {
    service_url: Option<String>,
    service_key: Option<ServiceKey>,
}

impl GateConfig {
    /// Builds a configuration from optional raw values.
    pub fn new(service_url: Option<impl Into<String>>, service_key: Option<impl Into<String>>) -> Self {
        Self {
            service_url: service_url.map(Into::into).filter(|url| !url.is_empty()),
            service_key: service_key.and_then(ServiceKey::new),
        }
    }

    /// A configuration with neither setting present.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Reads [`SERVICE_URL_VAR`] and [`SERVICE_KEY_VAR`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the settings through an arbitrary lookup function.
    ///
    /// ```
    /// use site_gate::{GateConfig, SERVICE_URL_VAR};
    ///
    /// let config = GateConfig::from_lookup(|name| {
    ///     (name == SERVICE_URL_VAR).then(|| "https://auth.example.com".to_string())
    /// });
    /// assert!(!config.is_configured());
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(lookup(SERVICE_URL_VAR), lookup(SERVICE_KEY_VAR))
    }

    /// Returns `true` when both settings are present.
    pub fn is_configured(&self) -> bool {
        self.service_url.is_some() && self.service_key.is_some()
    }

    /// Returns the session service URL, if set.
    pub fn service_url(&self) -> Option<&str> {
        self.service_url.as_deref()
    }

    /// Borrows both settings as a [`ServiceEndpoint`].
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationMissing` error naming every absent setting.
    pub fn endpoint(&self) -> Result<ServiceEndpoint<'_>, GateError> {
        match (self.service_url.as_deref(), self.service_key.as_ref()) {
            (Some(url), Some(key)) => Ok(ServiceEndpoint { url, key }),
            (url, key) => {
                let mut missing = Vec::with_capacity(2);
                if url.is_none() {
                    missing.push(SERVICE_URL_VAR);
                }
                if key.is_none() {
                    missing.push(SERVICE_KEY_VAR);
                }
                Err(GateError::configuration_missing(missing))
            }
        }
    }
}

/// Borrowed view of a fully configured session service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceEndpoint<'a> {
    /// Base URL of the session service
    pub url: &'a str,
    /// Key presented to the session service
    pub key: &'a ServiceKey,
}
