//! Test harness driving the session lifecycle.
//!
//! A [`TestClass`] groups [`TestCase`]s under one declared session
//! configuration. Running a class walks the controller through
//! `enter_class`, then `enter_test` / body / `complete_test` for each case,
//! handing every body a [`ComponentFactory`] for the live session.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::factory::ComponentFactory;
use crate::lifecycle::{SessionLifecycleController, TestOutcome};
use crate::result::PagewrightResult;
use crate::session::{DriverFactory, NativeDriver, SessionConfiguration};

/// Body of a test case
pub type TestBody<D> =
    Box<dyn for<'a> Fn(&ComponentFactory<'a, D>) -> PagewrightResult<()> + Send + Sync>;

/// A single test case
pub struct TestCase<D: NativeDriver> {
    /// Test name
    pub name: String,
    /// Session override; `None` inherits the class configuration
    pub config: Option<SessionConfiguration>,
    /// Whether the case is skipped without touching the session
    pub skip: bool,
    body: TestBody<D>,
}

impl<D: NativeDriver> fmt::Debug for TestCase<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl<D: NativeDriver> TestCase<D> {
    /// Create a new test case
    #[must_use]
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: for<'a> Fn(&ComponentFactory<'a, D>) -> PagewrightResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            config: None,
            skip: false,
            body: Box::new(body),
        }
    }

    /// Run under a specific session configuration
    #[must_use]
    pub fn with_config(mut self, config: SessionConfiguration) -> Self {
        self.config = Some(config);
        self
    }

    /// Mark the case as skipped
    #[must_use]
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A group of test cases sharing a declared session configuration
pub struct TestClass<D: NativeDriver> {
    /// Class name
    pub name: String,
    /// Declared configuration; `None` uses the settings' default session
    pub config: Option<SessionConfiguration>,
    /// Tests in declaration order
    pub tests: Vec<TestCase<D>>,
}

impl<D: NativeDriver> fmt::Debug for TestClass<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClass")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("tests", &self.tests)
            .finish()
    }
}

impl<D: NativeDriver> TestClass<D> {
    /// Create an empty class
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            tests: Vec::new(),
        }
    }

    /// Declare the class configuration
    #[must_use]
    pub fn with_config(mut self, config: SessionConfiguration) -> Self {
        self.config = Some(config);
        self
    }

    /// Add a test case
    #[must_use]
    pub fn with_test(mut self, test: TestCase<D>) -> Self {
        self.tests.push(test);
        self
    }

    /// Add a test case
    pub fn add_test(&mut self, test: TestCase<D>) {
        self.tests.push(test);
    }

    /// Get the number of tests
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }
}

/// Result of running a single test
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test name
    pub name: String,
    /// How the test ended
    pub outcome: TestOutcome,
    /// Error message if failed
    pub error: Option<String>,
    /// Test duration
    pub duration: Duration,
}

impl TestResult {
    /// Create a passing test result
    #[must_use]
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Passed,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing test result
    #[must_use]
    pub fn fail(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Failed,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    /// Create a skipped test result
    #[must_use]
    pub fn skip(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: TestOutcome::Skipped,
            error: None,
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether the test passed
    #[must_use]
    pub fn passed(&self) -> bool {
        self.outcome == TestOutcome::Passed
    }
}

/// Results from running a test class
#[derive(Debug, Clone)]
pub struct SuiteResults {
    /// Class name
    pub suite_name: String,
    /// Individual test results
    pub results: Vec<TestResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check that no test failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| !r.outcome.is_failure())
    }

    /// Count passed tests
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Count failed tests
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures().len()
    }

    /// Count skipped tests
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == TestOutcome::Skipped)
            .count()
    }

    /// Get total test count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed tests
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResult> {
        self.results.iter().filter(|r| r.outcome.is_failure()).collect()
    }
}

/// Test harness for running classes
#[derive(Debug, Default)]
pub struct TestHarness {
    /// Whether to skip the rest of a class after its first failure
    pub fail_fast: bool,
}

impl TestHarness {
    /// Create a new test harness
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Run one class against the controller's session.
    ///
    /// The session stays open afterwards so a following class can reuse it.
    pub fn run_class<F: DriverFactory>(
        &self,
        controller: &mut SessionLifecycleController<F>,
        class: &TestClass<F::Driver>,
    ) -> SuiteResults {
        let start = Instant::now();
        if let Err(e) = controller.enter_class(class.config) {
            warn!(class = %class.name, error = %e, "class session could not start");
        }

        let mut results = Vec::with_capacity(class.tests.len());
        let mut failed = false;
        for test in &class.tests {
            let started = Instant::now();
            let result = if test.skip || (self.fail_fast && failed) {
                TestResult::skip(&test.name)
            } else {
                run_test(controller, test)
            };
            failed |= result.outcome.is_failure();
            results.push(result.with_duration(started.elapsed()));
        }

        let results = SuiteResults {
            suite_name: class.name.clone(),
            results,
            duration: start.elapsed(),
        };
        info!(
            class = %class.name,
            passed = results.passed_count(),
            failed = results.failed_count(),
            skipped = results.skipped_count(),
            "class finished"
        );
        results
    }

    /// Run classes in order, then close the session.
    pub fn run_all<F: DriverFactory>(
        &self,
        controller: &mut SessionLifecycleController<F>,
        classes: &[TestClass<F::Driver>],
    ) -> Vec<SuiteResults> {
        let results = classes
            .iter()
            .map(|class| self.run_class(controller, class))
            .collect();
        controller.shutdown();
        results
    }
}

/// Run one class with the default harness.
pub fn run_class<F: DriverFactory>(
    controller: &mut SessionLifecycleController<F>,
    class: &TestClass<F::Driver>,
) -> SuiteResults {
    TestHarness::new().run_class(controller, class)
}

fn run_test<F: DriverFactory>(
    controller: &mut SessionLifecycleController<F>,
    test: &TestCase<F::Driver>,
) -> TestResult {
    if let Err(e) = controller.enter_test(test.config) {
        controller.complete_test(TestOutcome::Failed);
        return TestResult::fail(&test.name, e.to_string());
    }
    let outcome = controller
        .component_factory()
        .and_then(|factory| (test.body)(&factory));
    match outcome {
        Ok(()) => {
            controller.complete_test(TestOutcome::Passed);
            TestResult::pass(&test.name)
        }
        Err(e) => {
            warn!(test = %test.name, error = %e, "test failed");
            controller.complete_test(TestOutcome::Failed);
            TestResult::fail(&test.name, e.to_string())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::component::ComponentHandle;
    use crate::components::Button;
    use crate::config::{Settings, TimeoutSettings};
    use crate::mock::{MockDriver, MockDriverFactory, MockElement};
    use crate::session::{Lifecycle, Platform};

    type Case = TestCase<MockDriver>;

    fn settings() -> Settings {
        Settings::default().with_timeouts(
            TimeoutSettings::default()
                .with_all_timeouts(80)
                .with_sleep_interval(10),
        )
    }

    fn page_factory() -> MockDriverFactory {
        MockDriverFactory::new().with_page(|driver| {
            driver.add(MockElement::new("button").with_id("go"));
        })
    }

    fn click_go() -> Case {
        Case::new("clicks go", |factory| {
            let mut go: Button<'_, MockDriver> = factory.by_id("go");
            go.click()
        })
    }

    fn missing_element() -> Case {
        Case::new("needs ghost", |factory| {
            let mut ghost: ComponentHandle<'_, MockDriver> = factory.by_id("ghost");
            ghost.resolve_strict().map(drop)
        })
    }

    mod result_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let results = SuiteResults {
                suite_name: "s".into(),
                results: vec![
                    TestResult::pass("a"),
                    TestResult::fail("b", "boom"),
                    TestResult::skip("c"),
                ],
                duration: Duration::ZERO,
            };
            assert_eq!(results.total(), 3);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(results.failed_count(), 1);
            assert_eq!(results.skipped_count(), 1);
            assert!(!results.all_passed());
            assert_eq!(results.failures()[0].error.as_deref(), Some("boom"));
        }
    }

    mod run_tests {
        use super::*;

        #[test]
        fn test_class_reuses_one_session() {
            let factory = page_factory();
            let observer = factory.clone();
            let mut ctl = SessionLifecycleController::new(factory, settings());
            let class = TestClass::new("checkout")
                .with_test(click_go())
                .with_test(click_go())
                .with_test(missing_element());

            let results = run_class(&mut ctl, &class);
            assert_eq!(results.passed_count(), 2);
            assert_eq!(results.failed_count(), 1);
            assert!(results.failures()[0].error.as_deref().unwrap().contains("ghost"));
            assert_eq!(observer.starts(), 1);
            let driver = observer.last_driver().unwrap();
            assert!(driver.find_calls() > 0);
        }

        #[test]
        fn test_restart_on_fail_replaces_session() {
            let factory = page_factory();
            let observer = factory.clone();
            let mut ctl = SessionLifecycleController::new(factory, settings());
            let class = TestClass::new("flaky")
                .with_config(SessionConfiguration::new(Platform::Chrome, Lifecycle::RestartOnFail))
                .with_test(missing_element())
                .with_test(click_go());

            let results = run_class(&mut ctl, &class);
            assert_eq!(results.passed_count(), 1);
            assert_eq!(observer.starts(), 2);
            assert_eq!(observer.closes(), 1);
        }

        #[test]
        fn test_start_failure_fails_only_that_test() {
            let factory = page_factory();
            factory.fail_next_start("no browser");
            factory.fail_next_start("still no browser");
            let mut ctl = SessionLifecycleController::new(factory, settings());
            let class = TestClass::new("startup")
                .with_test(click_go())
                .with_test(click_go());

            let results = run_class(&mut ctl, &class);
            assert_eq!(results.outcome_of(0), TestOutcome::Failed);
            assert!(results.results[0].error.as_deref().unwrap().contains("still no browser"));
            assert_eq!(results.outcome_of(1), TestOutcome::Passed);
        }

        #[test]
        fn test_skip_and_fail_fast() {
            let mut ctl = SessionLifecycleController::new(page_factory(), settings());
            let class = TestClass::new("ordered")
                .with_test(click_go().skipped())
                .with_test(missing_element())
                .with_test(click_go());

            let results = TestHarness::new().with_fail_fast().run_class(&mut ctl, &class);
            assert_eq!(results.outcome_of(0), TestOutcome::Skipped);
            assert_eq!(results.outcome_of(1), TestOutcome::Failed);
            assert_eq!(results.outcome_of(2), TestOutcome::Skipped);
        }

        #[test]
        fn test_run_all_shuts_down() {
            let factory = page_factory();
            let observer = factory.clone();
            let mut ctl = SessionLifecycleController::new(factory, settings());
            let firefox = SessionConfiguration::new(Platform::Firefox, Lifecycle::ReuseIfStarted);
            let classes = vec![
                TestClass::new("one").with_test(click_go()),
                TestClass::new("two").with_test(click_go()),
                TestClass::new("three").with_config(firefox).with_test(click_go()),
            ];

            let results = TestHarness::new().run_all(&mut ctl, &classes);
            assert!(results.iter().all(SuiteResults::all_passed));
            assert_eq!(observer.starts(), 2);
            assert_eq!(observer.closes(), 2);
            assert!(ctl.session().is_none());
        }
    }

    impl SuiteResults {
        fn outcome_of(&self, index: usize) -> TestOutcome {
            self.results[index].outcome
        }
    }
}
