//! Session lifecycle policy.
//!
//! One [`SessionLifecycleController`] per execution thread decides, at class
//! and test boundaries, whether the running driver session can be reused:
//!
//! ```text
//!              enter_class / enter_test
//!   NoSession ─────────────────────────▶ SessionActive(config)
//!       ▲                                   │    │
//!       │ complete_test(Failed)             │    │ config differs, or
//!       │ with RestartOnFail, or shutdown   │    │ RestartEveryTime
//!       └───────────────────────────────────┘    ▼
//!                                       close + start again
//! ```
//!
//! Failing to start is fatal to the test. Failing to close is logged and
//! otherwise ignored.

use tracing::{info, warn};

use crate::component::ComponentContext;
use crate::config::Settings;
use crate::events::EventBus;
use crate::factory::ComponentFactory;
use crate::result::{PagewrightError, PagewrightResult};
use crate::session::{DriverFactory, DriverSession, Lifecycle, SessionConfiguration};

/// How a test ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test did not run
    Skipped,
}

impl TestOutcome {
    /// Whether the outcome counts as a failure
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Owns the driver session and applies the lifecycle policy
pub struct SessionLifecycleController<F: DriverFactory> {
    factory: F,
    settings: Settings,
    events: EventBus,
    session: Option<DriverSession<F::Driver>>,
    class_config: SessionConfiguration,
    current: SessionConfiguration,
    started_during_class: bool,
    starts: usize,
}

impl<F: DriverFactory> std::fmt::Debug for SessionLifecycleController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLifecycleController")
            .field("session", &self.session)
            .field("class_config", &self.class_config)
            .field("current", &self.current)
            .field("starts", &self.starts)
            .finish_non_exhaustive()
    }
}

impl<F: DriverFactory> SessionLifecycleController<F> {
    /// Create a controller with no session
    #[must_use]
    pub fn new(factory: F, settings: Settings) -> Self {
        let default_session = settings.default_session;
        Self {
            factory,
            settings,
            events: EventBus::new(),
            session: None,
            class_config: default_session,
            current: default_session,
            started_during_class: false,
            starts: 0,
        }
    }

    /// Use a shared event bus
    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// Settings handed to components
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Event bus handed to components
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Borrow the running session
    #[must_use]
    pub const fn session(&self) -> Option<&DriverSession<F::Driver>> {
        self.session.as_ref()
    }

    /// Configuration of the running session, if one is open
    #[must_use]
    pub fn active_config(&self) -> Option<SessionConfiguration> {
        self.session
            .as_ref()
            .filter(|s| s.is_open())
            .map(|s| *s.config())
    }

    /// Effective configuration of the current test
    #[must_use]
    pub const fn current_config(&self) -> SessionConfiguration {
        self.current
    }

    /// Number of sessions started so far
    #[must_use]
    pub const fn start_count(&self) -> usize {
        self.starts
    }

    /// Number of sessions started after the first one
    #[must_use]
    pub const fn restart_count(&self) -> usize {
        self.starts.saturating_sub(1)
    }

    /// Apply the class-level policy. `None` uses the configured default session.
    ///
    /// # Errors
    /// Returns [`PagewrightError::SessionStart`] if a needed session cannot start.
    pub fn enter_class(&mut self, declared: Option<SessionConfiguration>) -> PagewrightResult<()> {
        let effective = declared.unwrap_or(self.settings.default_session);
        self.class_config = effective;
        self.current = effective;
        self.started_during_class = false;
        if self.should_restart(&effective) {
            self.restart(effective)?;
            self.started_during_class = true;
        }
        Ok(())
    }

    /// Apply the test-level policy. `None` inherits the class configuration.
    ///
    /// Right after a class-level start the first test runs on that session,
    /// whatever its own configuration says.
    ///
    /// # Errors
    /// Returns [`PagewrightError::SessionStart`] if a needed session cannot start.
    pub fn enter_test(&mut self, method: Option<SessionConfiguration>) -> PagewrightResult<()> {
        let effective = method.unwrap_or(self.class_config);
        self.current = effective;
        let class_started = std::mem::take(&mut self.started_during_class);
        if !class_started && self.should_restart(&effective) {
            self.restart(effective)?;
        }
        Ok(())
    }

    /// Apply the end-of-test policy
    pub fn complete_test(&mut self, outcome: TestOutcome) {
        if self.current.lifecycle == Lifecycle::RestartOnFail && outcome.is_failure() {
            info!(config = %self.current, "test failed, dropping session");
            self.close_session();
        }
    }

    /// Close the session at the end of the run
    pub fn shutdown(&mut self) {
        self.close_session();
        self.started_during_class = false;
    }

    /// Factory for components against the running session.
    ///
    /// # Errors
    /// Returns [`PagewrightError::NoActiveSession`] if no session is open.
    pub fn component_factory(&self) -> PagewrightResult<ComponentFactory<'_, F::Driver>> {
        let session = self
            .session
            .as_ref()
            .filter(|s| s.is_open())
            .ok_or(PagewrightError::NoActiveSession)?;
        Ok(ComponentFactory::new(ComponentContext::new(
            session.driver(),
            &self.settings,
            &self.events,
        )))
    }

    fn mismatch(&self, effective: &SessionConfiguration) -> bool {
        self.active_config().as_ref() != Some(effective)
    }

    fn should_restart(&self, effective: &SessionConfiguration) -> bool {
        self.mismatch(effective) || effective.lifecycle == Lifecycle::RestartEveryTime
    }

    fn restart(&mut self, config: SessionConfiguration) -> PagewrightResult<()> {
        self.close_session();
        let driver = self.factory.start(&config).map_err(|e| match e {
            err @ PagewrightError::SessionStart { .. } => err,
            other => PagewrightError::SessionStart {
                platform: config.platform.to_string(),
                message: other.to_string(),
            },
        })?;
        let session = DriverSession::new(config, driver);
        info!(session = %session.id(), %config, "session started");
        self.session = Some(session);
        self.starts += 1;
        Ok(())
    }

    fn close_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            match session.close() {
                Ok(()) => info!(session = %session.id(), "session closed"),
                Err(e) => warn!(session = %session.id(), error = %e, "session teardown failed"),
            }
        }
    }
}

impl<F: DriverFactory> Drop for SessionLifecycleController<F> {
    fn drop(&mut self) {
        self.close_session();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::mock::MockDriverFactory;
    use crate::result::NativeFault;
    use crate::session::Platform;

    const A: SessionConfiguration =
        SessionConfiguration::new(Platform::Chrome, Lifecycle::ReuseIfStarted);
    const B: SessionConfiguration =
        SessionConfiguration::new(Platform::Firefox, Lifecycle::ReuseIfStarted);

    fn controller() -> (SessionLifecycleController<MockDriverFactory>, MockDriverFactory) {
        let factory = MockDriverFactory::new();
        let observer = factory.clone();
        (SessionLifecycleController::new(factory, Settings::default()), observer)
    }

    mod policy_tests {
        use super::*;

        #[test]
        fn test_reuse_then_switch_restarts_once() {
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(A)).unwrap();
            for method in [None, Some(A), Some(B)] {
                ctl.enter_test(method).unwrap();
                ctl.complete_test(TestOutcome::Passed);
            }
            assert_eq!(ctl.restart_count(), 1);
            assert_eq!(factory.starts(), 2);
            assert_eq!(factory.started_configs(), vec![A, B]);
            assert_eq!(ctl.active_config(), Some(B));
        }

        #[test]
        fn test_value_equality_reconstructed_default() {
            let (mut ctl, factory) = controller();
            ctl.enter_class(None).unwrap();
            ctl.enter_test(Some(SessionConfiguration::default())).unwrap();
            ctl.enter_class(Some(SessionConfiguration::new(
                Platform::Chrome,
                Lifecycle::ReuseIfStarted,
            )))
            .unwrap();
            ctl.enter_test(None).unwrap();
            assert_eq!(factory.starts(), 1);
        }

        #[test]
        fn test_restart_every_time_once_per_test() {
            let every = SessionConfiguration::new(Platform::Chrome, Lifecycle::RestartEveryTime);
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(every)).unwrap();
            for n in 1..=4 {
                ctl.enter_test(None).unwrap();
                assert_eq!(factory.starts(), n);
                ctl.complete_test(TestOutcome::Passed);
            }
            assert_eq!(factory.closes(), 3);
        }

        #[test]
        fn test_class_start_not_doubled_for_different_method_config() {
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(A)).unwrap();
            ctl.enter_test(Some(B)).unwrap();
            assert_eq!(factory.started_configs(), vec![A]);
            assert_eq!(ctl.active_config(), Some(A));
            assert_eq!(ctl.restart_count(), 0);

            ctl.complete_test(TestOutcome::Passed);
            ctl.enter_test(Some(B)).unwrap();
            assert_eq!(factory.started_configs(), vec![A, B]);
        }

        #[test]
        fn test_class_start_not_doubled_for_restart_every_time() {
            let every = SessionConfiguration::new(Platform::Chrome, Lifecycle::RestartEveryTime);
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(A)).unwrap();
            ctl.enter_test(Some(every)).unwrap();
            assert_eq!(factory.starts(), 1);
        }

        #[test]
        fn test_restart_on_fail() {
            let on_fail = SessionConfiguration::new(Platform::Edge, Lifecycle::RestartOnFail);
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(on_fail)).unwrap();

            ctl.enter_test(None).unwrap();
            ctl.complete_test(TestOutcome::Passed);
            assert!(ctl.active_config().is_some());

            ctl.enter_test(None).unwrap();
            ctl.complete_test(TestOutcome::Failed);
            assert!(ctl.active_config().is_none());
            assert_eq!(factory.closes(), 1);

            ctl.enter_test(None).unwrap();
            assert_eq!(factory.starts(), 2);
        }

        #[test]
        fn test_skipped_is_not_failure() {
            let on_fail = SessionConfiguration::new(Platform::Edge, Lifecycle::RestartOnFail);
            let (mut ctl, _factory) = controller();
            ctl.enter_class(Some(on_fail)).unwrap();
            ctl.enter_test(None).unwrap();
            ctl.complete_test(TestOutcome::Skipped);
            assert!(ctl.active_config().is_some());
        }

        #[test]
        fn test_default_session_from_settings() {
            let factory = MockDriverFactory::new();
            let observer = factory.clone();
            let settings = Settings::default().with_default_session(B);
            let mut ctl = SessionLifecycleController::new(factory, settings);
            ctl.enter_class(None).unwrap();
            assert_eq!(observer.started_configs(), vec![B]);
        }
    }

    mod failure_tests {
        use super::*;

        #[test]
        fn test_start_failure_propagates() {
            let (mut ctl, factory) = controller();
            factory.fail_next_start("browser binary missing");
            let err = ctl.enter_class(Some(A)).unwrap_err();
            assert!(matches!(err, PagewrightError::SessionStart { .. }));
            assert!(ctl.active_config().is_none());
            assert!(matches!(
                ctl.component_factory(),
                Err(PagewrightError::NoActiveSession)
            ));
        }

        #[test]
        fn test_failed_class_start_is_retried_by_test() {
            let (mut ctl, factory) = controller();
            factory.fail_next_start("flaky");
            assert!(ctl.enter_class(Some(A)).is_err());
            ctl.enter_test(None).unwrap();
            assert_eq!(ctl.active_config(), Some(A));
        }

        #[test]
        fn test_teardown_failure_is_swallowed() {
            let (mut ctl, factory) = controller();
            factory.fail_closes(NativeFault::driver("already gone"));
            ctl.enter_class(Some(A)).unwrap();
            ctl.enter_test(None).unwrap();
            ctl.complete_test(TestOutcome::Passed);
            ctl.enter_test(Some(B)).unwrap();
            assert_eq!(ctl.active_config(), Some(B));
            ctl.shutdown();
            assert_eq!(factory.closes(), 2);
        }

        #[test]
        fn test_dead_driver_triggers_restart() {
            let (mut ctl, factory) = controller();
            ctl.enter_class(Some(A)).unwrap();
            let mut crashed = factory.last_driver().unwrap();
            crate::session::NativeDriver::close(&mut crashed).unwrap();
            assert!(ctl.active_config().is_none());
            ctl.enter_test(None).unwrap();
            assert_eq!(factory.starts(), 2);
            assert_eq!(ctl.active_config(), Some(A));
        }
    }

    mod factory_access_tests {
        use super::*;

        #[test]
        fn test_component_factory_requires_session() {
            let (mut ctl, _factory) = controller();
            assert!(ctl.component_factory().is_err());
            ctl.enter_class(None).unwrap();
            assert!(ctl.component_factory().is_ok());
            ctl.shutdown();
            assert!(ctl.component_factory().is_err());
        }

        #[test]
        fn test_drop_closes_session() {
            let (mut ctl, factory) = controller();
            ctl.enter_class(None).unwrap();
            drop(ctl);
            assert_eq!(factory.closes(), 1);
        }
    }
}
