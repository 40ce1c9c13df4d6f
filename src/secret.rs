use std::fmt;

/// The session service key, redacted in every formatted output.
///
/// The key is handed to the [`SessionService`](crate::SessionService) through
/// a [`ServiceEndpoint`](crate::ServiceEndpoint) and must never reach a log
/// line. The only way to read it is [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use site_gate::ServiceKey;
///
/// let key = ServiceKey::new("anon-key-123").expect("non-empty key");
///
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(format!("{}", key), "[REDACTED]");
/// assert_eq!(key.expose_secret(), "anon-key-123");
///
/// // An empty key counts as "not configured".
/// assert!(ServiceKey::new("").is_none());
/// ```
// Do NOT derive Clone, Copy or Default: the key is owned by `GateConfig`
// and lent out by reference.
pub struct ServiceKey {
    // Must stay private; a public field bypasses redaction.
    inner: String,
}

impl ServiceKey {
    /// Wraps a key, returning `None` for an empty value.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let inner = value.into();
        if inner.is_empty() {
            return None;
        }
        Some(Self { inner })
    }

    /// Explicitly exposes the key.
    ///
    /// Callers must not log or display the returned value.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_key_redacts_debug() {
        let key = ServiceKey::new("eyJhbGciOiJIUzI1NiJ9.payload").unwrap();
        let debug_output = format!("{:?}", key);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("eyJ"));
        assert!(!debug_output.contains("ServiceKey"));
    }

    #[test]
    fn service_key_redacts_display() {
        let key = ServiceKey::new("sk-live-999").unwrap();
        assert_eq!(key.to_string(), "[REDACTED]");
    }

    #[test]
    fn service_key_rejects_empty_value() {
        assert!(ServiceKey::new(String::new()).is_none());
    }

    #[test]
    fn service_key_keeps_whitespace_values() {
        // Only the empty string is "absent"; anything else is passed through.
        let key = ServiceKey::new(" ").unwrap();
        assert_eq!(key.expose_secret(), " ");
    }

    #[test]
    fn service_key_redacted_inside_containers() {
        let key = ServiceKey::new("hunter2").unwrap();
        let wrapped = Some(&key);
        assert_eq!(format!("{:?}", wrapped), "Some([REDACTED])");
    }
}
