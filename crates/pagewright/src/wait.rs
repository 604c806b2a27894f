//! Wait conditions and the poll loop behind them.
//!
//! A [`WaitCondition`] is a named predicate over the current match set of a
//! component plus a timeout and poll interval. Conditions carry no state, so
//! one value can be queued on any number of handles.
//!
//! Absence is never an error while polling: a lookup that matches nothing or
//! an element that went stale mid-check just means "not yet".

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::TimeoutSettings;
use crate::result::NativeResult;
use crate::session::NativeDriver;

// =============================================================================
// CONDITION KIND
// =============================================================================

/// Predicate a wait condition checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// At least `index + 1` matches
    Exists,
    /// Fewer than `index + 1` matches
    NotExists,
    /// Element exists and is displayed
    Visible,
    /// Element is absent or not displayed
    NotVisible,
    /// Element exists, is displayed and is enabled
    Clickable,
    /// Element exists and is not enabled
    Disabled,
}

impl ConditionKind {
    /// Every condition kind
    pub const ALL: [Self; 6] = [
        Self::Exists,
        Self::NotExists,
        Self::Visible,
        Self::NotVisible,
        Self::Clickable,
        Self::Disabled,
    ];

    /// Get the state name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exists => "present",
            Self::NotExists => "absent",
            Self::Visible => "visible",
            Self::NotVisible => "hidden",
            Self::Clickable => "clickable",
            Self::Disabled => "disabled",
        }
    }

    /// Whether the condition is satisfied by the element going away
    #[must_use]
    pub const fn accepts_absence(&self) -> bool {
        matches!(self, Self::NotExists | Self::NotVisible)
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Outcome of a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the predicate held before the timeout
    pub success: bool,
    /// Time spent polling
    pub elapsed: Duration,
    /// Number of predicate evaluations
    pub attempts: u32,
}

impl WaitResult {
    /// Create a satisfied result
    #[must_use]
    pub const fn satisfied(elapsed: Duration, attempts: u32) -> Self {
        Self {
            success: true,
            elapsed,
            attempts,
        }
    }

    /// Create a timed-out result
    #[must_use]
    pub const fn timed_out(elapsed: Duration, attempts: u32) -> Self {
        Self {
            success: false,
            elapsed,
            attempts,
        }
    }
}

/// Evaluate `check` until it returns `true` or `timeout` elapses.
///
/// The check always runs at least once, so a zero timeout means exactly one
/// evaluation. Between checks the loop sleeps `min(poll_interval, remaining)`.
/// An `Err` from the check ends the loop immediately.
pub fn poll_until<E, F>(timeout: Duration, poll_interval: Duration, mut check: F) -> Result<WaitResult, E>
where
    F: FnMut() -> Result<bool, E>,
{
    let start = Instant::now();
    let poll_interval = poll_interval.max(Duration::from_millis(1));
    let mut attempts = 0;

    loop {
        attempts += 1;
        if check()? {
            return Ok(WaitResult::satisfied(start.elapsed(), attempts));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitResult::timed_out(elapsed, attempts));
        }
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

// =============================================================================
// WAIT CONDITION
// =============================================================================

/// A predicate with its timeout and poll interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaitCondition {
    kind: ConditionKind,
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitCondition {
    /// Create a condition
    #[must_use]
    pub const fn new(kind: ConditionKind, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            kind,
            timeout,
            poll_interval,
        }
    }

    /// Create a condition using the configured timeout for its kind
    #[must_use]
    pub const fn from_settings(kind: ConditionKind, timeouts: &TimeoutSettings) -> Self {
        Self::new(kind, timeouts.timeout_for(kind), timeouts.sleep_interval())
    }

    /// Override the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Get the predicate kind
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Get the timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Check the predicate once against a match set.
    ///
    /// Stale or missing elements read as "not satisfied", except for
    /// [`ConditionKind::NotVisible`], where they read as satisfied.
    ///
    /// # Errors
    /// Returns any native fault other than absence.
    pub fn evaluate<D: NativeDriver>(
        &self,
        driver: &D,
        found: &[D::Element],
        index: usize,
    ) -> NativeResult<bool> {
        let element = found.get(index);
        match (self.kind, element) {
            (ConditionKind::Exists, e) => Ok(e.is_some()),
            (ConditionKind::NotExists, e) => Ok(e.is_none()),
            (ConditionKind::NotVisible, None) => Ok(true),
            (_, None) => Ok(false),
            (ConditionKind::Visible, Some(e)) => absent_as(driver.is_displayed(e), false),
            (ConditionKind::NotVisible, Some(e)) => {
                absent_as(driver.is_displayed(e).map(|shown| !shown), true)
            }
            (ConditionKind::Clickable, Some(e)) => absent_as(
                driver
                    .is_displayed(e)
                    .and_then(|shown| Ok(shown && driver.is_enabled(e)?)),
                false,
            ),
            (ConditionKind::Disabled, Some(e)) => {
                absent_as(driver.is_enabled(e).map(|enabled| !enabled), false)
            }
        }
    }

    /// Poll `lookup` until the predicate holds for element `index` or the timeout elapses.
    ///
    /// # Errors
    /// Returns the first native fault that is not an absence fault.
    pub fn wait_for<D, F>(&self, driver: &D, index: usize, mut lookup: F) -> NativeResult<WaitResult>
    where
        D: NativeDriver,
        F: FnMut() -> NativeResult<Vec<D::Element>>,
    {
        poll_until(self.timeout, self.poll_interval, || {
            let found = match lookup() {
                Ok(found) => found,
                Err(fault) if fault.is_absence() => Vec::new(),
                Err(fault) => return Err(fault),
            };
            self.evaluate(driver, &found, index)
        })
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} within {}ms", self.kind, self.timeout.as_millis())
    }
}

fn absent_as(result: NativeResult<bool>, value: bool) -> NativeResult<bool> {
    match result {
        Err(fault) if fault.is_absence() => Ok(value),
        other => other,
    }
}
