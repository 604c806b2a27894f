//! Result and error types for Pagewright.

use thiserror::Error;

/// Result type for Pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Result type returned by native driver adapters
pub type NativeResult<T> = Result<T, NativeFault>;

/// Classification of a failure reported by the native driver layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeFaultKind {
    /// The lookup matched nothing
    NoSuchElement,
    /// The element reference is no longer attached to the document
    StaleElement,
    /// The element exists but cannot receive the interaction
    NotInteractable,
    /// A script raised or returned something unusable
    Script,
    /// Any other driver-level fault (lost connection, crashed session, ...)
    Driver,
}

impl NativeFaultKind {
    /// Get the kind name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoSuchElement => "no such element",
            Self::StaleElement => "stale element reference",
            Self::NotInteractable => "element not interactable",
            Self::Script => "script error",
            Self::Driver => "driver error",
        }
    }
}

impl std::fmt::Display for NativeFaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fault raised by a native driver call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct NativeFault {
    /// Fault classification
    pub kind: NativeFaultKind,
    /// Driver-provided message
    pub message: String,
}

impl NativeFault {
    /// Create a new fault
    #[must_use]
    pub fn new(kind: NativeFaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a no-such-element fault
    #[must_use]
    pub fn no_such_element(message: impl Into<String>) -> Self {
        Self::new(NativeFaultKind::NoSuchElement, message)
    }

    /// Create a stale-element fault
    #[must_use]
    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(NativeFaultKind::StaleElement, message)
    }

    /// Create a not-interactable fault
    #[must_use]
    pub fn not_interactable(message: impl Into<String>) -> Self {
        Self::new(NativeFaultKind::NotInteractable, message)
    }

    /// Create a script fault
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::new(NativeFaultKind::Script, message)
    }

    /// Create a generic driver fault
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::new(NativeFaultKind::Driver, message)
    }

    /// Whether the fault only means "the element is not there (any more)"
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(
            self.kind,
            NativeFaultKind::NoSuchElement | NativeFaultKind::StaleElement
        )
    }
}

/// Errors that can occur in Pagewright
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// The component never matched anything
    #[error("{component} was not found on the page")]
    ElementNotFound {
        /// Derived component name
        component: String,
    },

    /// A non-existence wait condition never became true
    #[error("{component} did not become {condition} within {timeout_ms}ms")]
    WaitTimeout {
        /// Derived component name
        component: String,
        /// Description of the unmet condition
        condition: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// Native fault swallowed during resolution, surfaced on strict access
    #[error("{component} hit a transient driver fault: {fault}")]
    TransientNativeFault {
        /// Derived component name
        component: String,
        /// The underlying fault
        fault: NativeFault,
    },

    /// Driver session could not be started
    #[error("Failed to start {platform} session: {message}")]
    SessionStart {
        /// Requested platform
        platform: String,
        /// Error message
        message: String,
    },

    /// Driver session could not be closed
    #[error("Failed to close session: {message}")]
    SessionTeardown {
        /// Error message
        message: String,
    },

    /// An operation needed a session but none is running
    #[error("No active driver session")]
    NoActiveSession,

    /// Native driver call failed outside of resolution
    #[error("Native driver call failed: {0}")]
    Native(#[from] NativeFault),

    /// Validation did not hold before its timeout
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Error message
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PagewrightError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error came out of element resolution
    #[must_use]
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::WaitTimeout { .. }
                | Self::TransientNativeFault { .. }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_faults() {
        assert!(NativeFault::no_such_element("gone").is_absence());
        assert!(NativeFault::stale("detached").is_absence());
        assert!(!NativeFault::not_interactable("covered").is_absence());
        assert!(!NativeFault::driver("socket closed").is_absence());
    }

    #[test]
    fn test_native_fault_display() {
        let fault = NativeFault::stale("node 42 detached");
        assert_eq!(fault.to_string(), "stale element reference: node 42 detached");
    }

    #[test]
    fn test_error_messages() {
        let err = PagewrightError::WaitTimeout {
            component: "Button (id = submit)".into(),
            condition: "clickable".into(),
            timeout_ms: 1000,
        };
        assert_eq!(
            err.to_string(),
            "Button (id = submit) did not become clickable within 1000ms"
        );

        let err = PagewrightError::ElementNotFound {
            component: "Label (css = .greeting)".into(),
        };
        assert_eq!(
            err.to_string(),
            "Label (css = .greeting) was not found on the page"
        );
    }

    #[test]
    fn test_native_fault_converts() {
        let err: PagewrightError = NativeFault::driver("boom").into();
        assert!(matches!(err, PagewrightError::Native(_)));
        assert!(!err.is_resolution_failure());
    }

    #[test]
    fn test_resolution_failures() {
        assert!(PagewrightError::ElementNotFound {
            component: "x".into()
        }
        .is_resolution_failure());
        assert!(!PagewrightError::NoActiveSession.is_resolution_failure());
    }
}
