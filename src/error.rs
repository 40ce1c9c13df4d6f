use std::fmt;

use crate::session::SessionError;

/// A reason the gate could not admit a request as-is.
///
/// `GateError` never escapes [`RequestGate::decide`](crate::RequestGate::decide);
/// the gate turns every error into a redirect or a pass-through and records
/// the error through `tracing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateError {
    /// The kind of failure
    pub kind: GateErrorKind,
    /// Human-readable detail
    pub message: String,
}

impl GateError {
    /// Creates a new gate error.
    pub fn new(kind: GateErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// One or more session service settings are absent.
    pub fn configuration_missing(missing: Vec<&'static str>) -> Self {
        let message = format!("missing settings: {}", missing.join(", "));
        Self::new(GateErrorKind::ConfigurationMissing { missing }, message)
    }

    /// The session service resolved no principal for a protected path.
    pub fn unauthenticated(path: &str) -> Self {
        Self::new(
            GateErrorKind::Unauthenticated,
            format!("no session principal for protected path '{}'", path),
        )
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for GateError {}

impl From<SessionError> for GateError {
    fn from(err: SessionError) -> Self {
        GateError::new(GateErrorKind::SessionServiceFailure, err.to_string())
    }
}

/// The kind of gate failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateErrorKind {
    /// Service URL and/or key are not configured
    ConfigurationMissing {
        /// Names of the absent settings
        missing: Vec<&'static str>,
    },
    /// The session service call failed
    SessionServiceFailure,
    /// The service answered, but with no principal
    Unauthenticated,
}

impl fmt::Display for GateErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateErrorKind::ConfigurationMissing { .. } => write!(f, "ConfigurationMissing"),
            GateErrorKind::SessionServiceFailure => write!(f, "SessionServiceFailure"),
            GateErrorKind::Unauthenticated => write!(f, "Unauthenticated"),
        }
    }
}
