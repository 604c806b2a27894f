//! Runtime settings.
//!
//! Settings are plain serde structs with defaults for every field, so a
//! profile file only needs to name what it overrides:
//!
//! ```yaml
//! automaticallyScrollToVisible: true
//! timeouts:
//!   elementToExistTimeoutMs: 5000
//! defaultSession:
//!   platform: firefox_headless
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::result::{PagewrightError, PagewrightResult};
use crate::session::SessionConfiguration;
use crate::wait::ConditionKind;

/// Default timeout for conditions that wait for something to appear (30 seconds)
pub const DEFAULT_APPEAR_TIMEOUT_MS: u64 = 30_000;

/// Default timeout for conditions that wait for something to go away (10 seconds)
pub const DEFAULT_DISAPPEAR_TIMEOUT_MS: u64 = 10_000;

/// Default interval between polls (100ms)
pub const DEFAULT_SLEEP_INTERVAL_MS: u64 = 100;

/// Per-condition timeouts and the shared poll interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimeoutSettings {
    /// Timeout for `Exists`
    pub element_to_exist_timeout_ms: u64,
    /// Timeout for `NotExists`
    pub element_to_not_exist_timeout_ms: u64,
    /// Timeout for `Visible`
    pub element_to_be_visible_timeout_ms: u64,
    /// Timeout for `NotVisible` and `Disabled`
    pub element_not_to_be_visible_timeout_ms: u64,
    /// Timeout for `Clickable`
    pub element_to_be_clickable_timeout_ms: u64,
    /// Timeout for retrying validators
    pub validations_timeout_ms: u64,
    /// Interval between polls
    pub sleep_interval_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            element_to_exist_timeout_ms: DEFAULT_APPEAR_TIMEOUT_MS,
            element_to_not_exist_timeout_ms: DEFAULT_DISAPPEAR_TIMEOUT_MS,
            element_to_be_visible_timeout_ms: DEFAULT_APPEAR_TIMEOUT_MS,
            element_not_to_be_visible_timeout_ms: DEFAULT_DISAPPEAR_TIMEOUT_MS,
            element_to_be_clickable_timeout_ms: DEFAULT_APPEAR_TIMEOUT_MS,
            validations_timeout_ms: DEFAULT_DISAPPEAR_TIMEOUT_MS,
            sleep_interval_ms: DEFAULT_SLEEP_INTERVAL_MS,
        }
    }
}

impl TimeoutSettings {
    /// Create timeout settings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the same timeout for every condition and for validations
    #[must_use]
    pub const fn with_all_timeouts(mut self, timeout_ms: u64) -> Self {
        self.element_to_exist_timeout_ms = timeout_ms;
        self.element_to_not_exist_timeout_ms = timeout_ms;
        self.element_to_be_visible_timeout_ms = timeout_ms;
        self.element_not_to_be_visible_timeout_ms = timeout_ms;
        self.element_to_be_clickable_timeout_ms = timeout_ms;
        self.validations_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_sleep_interval(mut self, interval_ms: u64) -> Self {
        self.sleep_interval_ms = interval_ms;
        self
    }

    /// Set the validation timeout
    #[must_use]
    pub const fn with_validations_timeout(mut self, timeout_ms: u64) -> Self {
        self.validations_timeout_ms = timeout_ms;
        self
    }

    /// Timeout for a condition kind
    #[must_use]
    pub const fn timeout_for(&self, kind: ConditionKind) -> Duration {
        let ms = match kind {
            ConditionKind::Exists => self.element_to_exist_timeout_ms,
            ConditionKind::NotExists => self.element_to_not_exist_timeout_ms,
            ConditionKind::Visible => self.element_to_be_visible_timeout_ms,
            ConditionKind::NotVisible | ConditionKind::Disabled => {
                self.element_not_to_be_visible_timeout_ms
            }
            ConditionKind::Clickable => self.element_to_be_clickable_timeout_ms,
        };
        Duration::from_millis(ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval_ms)
    }

    /// Validation timeout as Duration
    #[must_use]
    pub const fn validations_timeout(&self) -> Duration {
        Duration::from_millis(self.validations_timeout_ms)
    }
}

/// Settings that shape element resolution and session defaults
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Wait for network idle after an element is found
    pub wait_until_ready_on_element_found: bool,
    /// Wait for the client framework to settle after an element is found
    pub wait_for_client_framework_on_element_found: bool,
    /// Scroll every resolved element into view
    pub automatically_scroll_to_visible: bool,
    /// Fixed pause after resolution, before the action runs
    pub artificial_delay_before_action_ms: u64,
    /// Wait timeouts
    pub timeouts: TimeoutSettings,
    /// Session used when a test class declares none
    pub default_session: SessionConfiguration,
}

impl Settings {
    /// Create settings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Enable or disable scrolling resolved elements into view
    #[must_use]
    pub const fn with_scroll_to_visible(mut self, enabled: bool) -> Self {
        self.automatically_scroll_to_visible = enabled;
        self
    }

    /// Enable or disable the network-idle wait after resolution
    #[must_use]
    pub const fn with_wait_until_ready(mut self, enabled: bool) -> Self {
        self.wait_until_ready_on_element_found = enabled;
        self
    }

    /// Enable or disable the client-framework wait after resolution
    #[must_use]
    pub const fn with_wait_for_client_framework(mut self, enabled: bool) -> Self {
        self.wait_for_client_framework_on_element_found = enabled;
        self
    }

    /// Set the artificial delay in milliseconds
    #[must_use]
    pub const fn with_artificial_delay(mut self, delay_ms: u64) -> Self {
        self.artificial_delay_before_action_ms = delay_ms;
        self
    }

    /// Set the default session configuration
    #[must_use]
    pub const fn with_default_session(mut self, session: SessionConfiguration) -> Self {
        self.default_session = session;
        self
    }

    /// Artificial delay as Duration
    #[must_use]
    pub const fn artificial_delay(&self) -> Duration {
        Duration::from_millis(self.artificial_delay_before_action_ms)
    }

    /// Parse settings from JSON.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the settings are invalid.
    pub fn from_json_str(json: &str) -> PagewrightResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from YAML.
    ///
    /// # Errors
    /// Returns error if the YAML is malformed or the settings are invalid.
    pub fn from_yaml_str(yaml: &str) -> PagewrightResult<Self> {
        let settings: Self = serde_yaml_ng::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, has an unknown extension, or
    /// does not parse.
    pub fn load(path: &Path) -> PagewrightResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let content = fs::read_to_string(path)?;
        match extension.as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Err(PagewrightError::config(format!(
                "unsupported settings file: {}",
                path.display()
            ))),
        }
    }

    /// Load `settings.<env>.{yaml,yml,json}` from `dir`, or defaults if none exists.
    ///
    /// # Errors
    /// Returns error if a profile file exists but cannot be loaded.
    pub fn load_profile(dir: &Path, env: &str) -> PagewrightResult<Self> {
        for extension in ["yaml", "yml", "json"] {
            let path = dir.join(format!("settings.{env}.{extension}"));
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading settings profile");
                return Self::load(&path);
            }
        }
        tracing::debug!(env, dir = %dir.display(), "no settings profile, using defaults");
        Ok(Self::default())
    }

    fn validate(&self) -> PagewrightResult<()> {
        if self.timeouts.sleep_interval_ms == 0 {
            return Err(PagewrightError::config("sleepIntervalMs must be positive"));
        }
        Ok(())
    }
}
