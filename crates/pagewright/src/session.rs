//! Driver sessions and the native driver capability interface.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  NativeDriver (capability trait)                                  │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐  │
//! │  │ WebDriver    │   │ Appium       │   │ MockDriver           │  │
//! │  │ adapter      │   │ adapter      │   │ (in-memory, tests)   │  │
//! │  └──────────────┘   └──────────────┘   └──────────────────────┘  │
//! │                                                                  │
//! │  One resolution engine; each platform only supplies an adapter   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::locator::NativeQuery;
use crate::result::{NativeResult, PagewrightError, PagewrightResult};

/// Argument passed to [`NativeDriver::run_script`]
#[derive(Debug, Clone)]
pub enum ScriptArg<'a, E> {
    /// A native element, exposed to the script as `arguments[n]`
    Element(&'a E),
    /// A plain JSON value
    Value(serde_json::Value),
}

impl<'a, E> ScriptArg<'a, E> {
    /// Create a string argument
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(serde_json::Value::String(value.into()))
    }
}

/// Capabilities the resolution engine needs from a live driver connection.
///
/// Every call is blocking. Element references may go stale between calls;
/// adapters report that as [`NativeFaultKind::StaleElement`](crate::NativeFaultKind).
pub trait NativeDriver {
    /// Opaque native element reference
    type Element: Clone + fmt::Debug;

    /// Find all elements matching `query` under `context` (document when `None`)
    fn find_elements(
        &self,
        context: Option<&Self::Element>,
        query: &NativeQuery,
    ) -> NativeResult<Vec<Self::Element>>;

    /// Whether the element is rendered and visible
    fn is_displayed(&self, element: &Self::Element) -> NativeResult<bool>;

    /// Whether the element accepts interaction
    fn is_enabled(&self, element: &Self::Element) -> NativeResult<bool>;

    /// Read an attribute; `None` when absent
    fn attribute(&self, element: &Self::Element, name: &str) -> NativeResult<Option<String>>;

    /// Rendered inner text
    fn text(&self, element: &Self::Element) -> NativeResult<String>;

    /// Click the element
    fn click(&self, element: &Self::Element) -> NativeResult<()>;

    /// Clear an editable element
    fn clear(&self, element: &Self::Element) -> NativeResult<()>;

    /// Type text into an editable element
    fn send_keys(&self, element: &Self::Element, text: &str) -> NativeResult<()>;

    /// Execute a script with positional arguments
    fn run_script(
        &self,
        source: &str,
        args: &[ScriptArg<'_, Self::Element>],
    ) -> NativeResult<serde_json::Value>;

    /// Navigate the session to a URL
    fn navigate(&self, url: &str) -> NativeResult<()>;

    /// Block until outstanding network requests have settled
    fn wait_for_network_idle(&self) -> NativeResult<()> {
        Ok(())
    }

    /// Block until the client-side framework reports it is idle
    fn wait_for_client_framework_ready(&self) -> NativeResult<()> {
        Ok(())
    }

    /// Whether the connection is still usable
    fn is_active(&self) -> bool;

    /// Close the connection
    fn close(&mut self) -> NativeResult<()>;
}

/// Browser, device or application the session targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Google Chrome
    #[default]
    Chrome,
    /// Google Chrome, headless
    ChromeHeadless,
    /// Mozilla Firefox
    Firefox,
    /// Mozilla Firefox, headless
    FirefoxHeadless,
    /// Microsoft Edge
    Edge,
    /// Microsoft Edge, headless
    EdgeHeadless,
    /// Apple Safari
    Safari,
    /// WebKit engine
    Webkit,
    /// Android device or emulator
    Android,
    /// iOS device or simulator
    Ios,
    /// Desktop application
    Desktop,
}

impl Platform {
    const ALL: [Self; 11] = [
        Self::Chrome,
        Self::ChromeHeadless,
        Self::Firefox,
        Self::FirefoxHeadless,
        Self::Edge,
        Self::EdgeHeadless,
        Self::Safari,
        Self::Webkit,
        Self::Android,
        Self::Ios,
        Self::Desktop,
    ];

    /// Get the platform name used in configuration files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::ChromeHeadless => "chrome_headless",
            Self::Firefox => "firefox",
            Self::FirefoxHeadless => "firefox_headless",
            Self::Edge => "edge",
            Self::EdgeHeadless => "edge_headless",
            Self::Safari => "safari",
            Self::Webkit => "webkit",
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        }
    }

    /// Parse a platform name case-insensitively, falling back to Chrome
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(text))
            .unwrap_or_default()
    }

    /// Whether the target runs without a visible window
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        matches!(
            self,
            Self::ChromeHeadless | Self::FirefoxHeadless | Self::EdgeHeadless
        )
    }

    /// Whether the target is a mobile device
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self, Self::Android | Self::Ios)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When a session is restarted between tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Keep the running session if its configuration matches
    #[default]
    ReuseIfStarted,
    /// Start a fresh session for every test
    RestartEveryTime,
    /// Keep the session, but drop it after a failing test
    RestartOnFail,
}

impl Lifecycle {
    /// Get the lifecycle name used in configuration files
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ReuseIfStarted => "reuse_if_started",
            Self::RestartEveryTime => "restart_every_time",
            Self::RestartOnFail => "restart_on_fail",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Desired session target plus restart policy. Compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfiguration {
    /// Target platform
    pub platform: Platform,
    /// Restart policy
    pub lifecycle: Lifecycle,
}

impl SessionConfiguration {
    /// Create a configuration
    #[must_use]
    pub const fn new(platform: Platform, lifecycle: Lifecycle) -> Self {
        Self {
            platform,
            lifecycle,
        }
    }

    /// Set the platform
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the lifecycle
    #[must_use]
    pub const fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }
}

impl fmt::Display for SessionConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.platform, self.lifecycle)
    }
}

/// Starts native driver connections
pub trait DriverFactory {
    /// Driver produced by this factory
    type Driver: NativeDriver;

    /// Start a driver for the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the browser, device or app cannot be started.
    fn start(&mut self, config: &SessionConfiguration) -> PagewrightResult<Self::Driver>;
}

/// A live driver connection owned by the lifecycle controller
pub struct DriverSession<D: NativeDriver> {
    id: Uuid,
    config: SessionConfiguration,
    driver: D,
    open: bool,
}

impl<D: NativeDriver> fmt::Debug for DriverSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSession")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl<D: NativeDriver> DriverSession<D> {
    /// Wrap a freshly started driver
    #[must_use]
    pub fn new(config: SessionConfiguration, driver: D) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            driver,
            open: true,
        }
    }

    /// Session identifier used in logs
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Configuration the session was started with
    #[must_use]
    pub const fn config(&self) -> &SessionConfiguration {
        &self.config
    }

    /// Borrow the native driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether the session is open and the driver still responds
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open && self.driver.is_active()
    }

    /// Close the session. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PagewrightError::SessionTeardown`] if the driver refuses to close.
    pub fn close(&mut self) -> PagewrightResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.driver
            .close()
            .map_err(|fault| PagewrightError::SessionTeardown {
                message: fault.to_string(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::result::NativeFault;

    mod platform_tests {
        use super::*;

        #[test]
        fn test_from_text_is_case_insensitive() {
            assert_eq!(Platform::from_text("FIREFOX"), Platform::Firefox);
            assert_eq!(Platform::from_text(" edge_headless "), Platform::EdgeHeadless);
        }

        #[test]
        fn test_from_text_falls_back_to_chrome() {
            assert_eq!(Platform::from_text("netscape"), Platform::Chrome);
        }

        #[test]
        fn test_flags() {
            assert!(Platform::ChromeHeadless.is_headless());
            assert!(!Platform::Chrome.is_headless());
            assert!(Platform::Ios.is_mobile());
            assert!(!Platform::Desktop.is_mobile());
        }
    }

    mod configuration_tests {
        use super::*;

        #[test]
        fn test_default_is_chrome_reuse() {
            let config = SessionConfiguration::default();
            assert_eq!(config.platform, Platform::Chrome);
            assert_eq!(config.lifecycle, Lifecycle::ReuseIfStarted);
        }

        #[test]
        fn test_value_equality() {
            let a = SessionConfiguration::new(Platform::Chrome, Lifecycle::ReuseIfStarted);
            let b = SessionConfiguration::default();
            assert_eq!(a, b);
            assert_ne!(a, a.with_platform(Platform::Firefox));
            assert_ne!(a, a.with_lifecycle(Lifecycle::RestartOnFail));
        }

        #[test]
        fn test_display() {
            let config = SessionConfiguration::new(Platform::Android, Lifecycle::RestartOnFail);
            assert_eq!(config.to_string(), "android (restart_on_fail)");
        }

        #[test]
        fn test_deserialize_snake_case() {
            let config: SessionConfiguration =
                serde_json::from_str(r#"{"platform":"firefox_headless","lifecycle":"restart_every_time"}"#)
                    .unwrap();
            assert_eq!(config.platform, Platform::FirefoxHeadless);
            assert_eq!(config.lifecycle, Lifecycle::RestartEveryTime);
        }
    }

    mod driver_session_tests {
        use super::*;

        #[test]
        fn test_close_is_idempotent() {
            let driver = MockDriver::new();
            let mut session = DriverSession::new(SessionConfiguration::default(), driver.clone());
            assert!(session.is_open());
            session.close().unwrap();
            session.close().unwrap();
            assert!(!session.is_open());
            assert_eq!(driver.close_calls(), 1);
        }

        #[test]
        fn test_close_failure_maps_to_teardown_error() {
            let driver = MockDriver::new();
            driver.fail_close(NativeFault::driver("socket closed"));
            let mut session = DriverSession::new(SessionConfiguration::default(), driver);
            let err = session.close().unwrap_err();
            assert!(matches!(err, PagewrightError::SessionTeardown { .. }));
            assert!(!session.is_open());
        }

        #[test]
        fn test_sessions_get_distinct_ids() {
            let a = DriverSession::new(SessionConfiguration::default(), MockDriver::new());
            let b = DriverSession::new(SessionConfiguration::default(), MockDriver::new());
            assert_ne!(a.id(), b.id());
        }
    }
}
