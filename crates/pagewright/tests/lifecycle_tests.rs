//! Session lifecycle, configuration profiles and the harness working together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::thread;

use pagewright::mock::{MockDriver, MockDriverFactory, MockElement};
use pagewright::prelude::*;
use tempfile::TempDir;

const CHROME: SessionConfiguration =
    SessionConfiguration::new(Platform::Chrome, Lifecycle::ReuseIfStarted);
const FIREFOX: SessionConfiguration =
    SessionConfiguration::new(Platform::Firefox, Lifecycle::ReuseIfStarted);

fn fast_settings() -> Settings {
    Settings::default().with_timeouts(
        TimeoutSettings::default()
            .with_all_timeouts(100)
            .with_sleep_interval(10),
    )
}

fn shop() -> MockDriverFactory {
    MockDriverFactory::new().with_page(|driver| {
        let cart = driver.add(MockElement::new("section").with_id("cart"));
        driver.add_child(&cart, MockElement::new("span").with_class("count").with_text("0"));
        driver.add(MockElement::new("button").with_id("add").with_text("Add to cart"));
    })
}

// ============================================================================
// Restart policy
// ============================================================================

#[test]
fn test_reuse_policy_over_a_class() {
    let factory = shop();
    let observer = factory.clone();
    let mut controller = SessionLifecycleController::new(factory, fast_settings());

    controller.enter_class(Some(CHROME)).unwrap();
    for method in [None, Some(CHROME), Some(FIREFOX)] {
        controller.enter_test(method).unwrap();
        assert!(controller.component_factory().is_ok());
        controller.complete_test(TestOutcome::Passed);
    }

    assert_eq!(controller.restart_count(), 1);
    assert_eq!(observer.started_configs(), vec![CHROME, FIREFOX]);
    assert_eq!(controller.active_config(), Some(FIREFOX));

    controller.shutdown();
    assert_eq!(observer.closes(), 2);
    assert!(matches!(
        controller.component_factory(),
        Err(PagewrightError::NoActiveSession)
    ));
}

#[test]
fn test_first_test_runs_on_class_session() {
    let factory = shop();
    let observer = factory.clone();
    let mut controller = SessionLifecycleController::new(factory, fast_settings());

    controller.enter_class(Some(CHROME)).unwrap();
    controller.enter_test(Some(FIREFOX)).unwrap();
    assert_eq!(observer.starts(), 1);
    assert_eq!(observer.started_configs(), vec![CHROME]);
    assert_eq!(controller.active_config(), Some(CHROME));
}

#[test]
fn test_restart_every_time_starts_per_test() {
    let factory = shop();
    let observer = factory.clone();
    let every = SessionConfiguration::new(Platform::Chrome, Lifecycle::RestartEveryTime);
    let mut controller = SessionLifecycleController::new(factory, fast_settings());

    controller.enter_class(Some(every)).unwrap();
    for _ in 0..3 {
        controller.enter_test(None).unwrap();
        controller.complete_test(TestOutcome::Passed);
    }
    assert_eq!(observer.starts(), 3);
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_profile_supplies_default_session_and_timeouts() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("settings.ci.yaml"),
        "timeouts:\n  elementToExistTimeoutMs: 50\n  sleepIntervalMs: 5\ndefaultSession:\n  platform: firefox_headless\n  lifecycle: restart_on_fail\n",
    )
    .unwrap();

    let settings = Settings::load_profile(dir.path(), "ci").unwrap();
    assert_eq!(settings.timeouts.element_to_exist_timeout_ms, 50);
    assert!(settings.default_session.platform.is_headless());

    let factory = shop();
    let observer = factory.clone();
    let mut controller = SessionLifecycleController::new(factory, settings);
    controller.enter_class(None).unwrap();
    controller.enter_test(None).unwrap();
    controller.complete_test(TestOutcome::Failed);
    controller.enter_test(None).unwrap();

    assert_eq!(observer.starts(), 2);
    assert_eq!(
        observer.started_configs()[0],
        SessionConfiguration::new(Platform::FirefoxHeadless, Lifecycle::RestartOnFail)
    );
}

#[test]
fn test_missing_profile_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let settings = Settings::load_profile(dir.path(), "staging").unwrap();
    assert_eq!(settings, Settings::default());
}

// ============================================================================
// Harness
// ============================================================================

fn add_to_cart() -> TestCase<MockDriver> {
    TestCase::<MockDriver>::new("add to cart", |factory| {
        let mut add: Button<'_, MockDriver> = factory.by_id("add");
        add.click()?;
        let mut cart: ComponentHandle<'_, MockDriver> = factory.by_id("cart");
        let mut count: Label<'_, MockDriver> = cart.create(Selector::class_name("count"))?;
        count.validate_text_is("0")
    })
}

#[test]
fn test_harness_runs_classes_on_one_session() {
    let factory = shop();
    let observer = factory.clone();
    let mut controller = SessionLifecycleController::new(factory, fast_settings());
    let classes = vec![
        TestClass::new("cart").with_test(add_to_cart()).with_test(add_to_cart()),
        TestClass::new("cart again").with_test(add_to_cart()),
    ];

    let results = TestHarness::new().run_all(&mut controller, &classes);
    assert!(results.iter().all(SuiteResults::all_passed));
    assert_eq!(results.iter().map(SuiteResults::total).sum::<usize>(), 3);
    assert_eq!(observer.starts(), 1);
    assert_eq!(observer.closes(), 1);
}

// ============================================================================
// Parallel execution
// ============================================================================

#[test]
fn test_threads_own_independent_sessions() {
    let workers: Vec<_> = [Platform::Chrome, Platform::Firefox, Platform::Edge, Platform::Safari]
        .into_iter()
        .map(|platform| {
            thread::spawn(move || {
                let factory = shop();
                let observer = factory.clone();
                let config = SessionConfiguration::new(platform, Lifecycle::ReuseIfStarted);
                let mut controller = SessionLifecycleController::new(factory, fast_settings());
                let class = TestClass::new(format!("{platform}"))
                    .with_config(config)
                    .with_test(add_to_cart())
                    .with_test(add_to_cart());
                let results = run_class(&mut controller, &class);
                let finds = observer
                    .last_driver()
                    .map(|driver| driver.find_calls())
                    .unwrap_or_default();
                controller.shutdown();
                (results.passed_count(), observer.starts(), observer.started_configs(), finds)
            })
        })
        .collect();

    for worker in workers {
        let (passed, starts, configs, finds) = worker.join().unwrap();
        assert_eq!(passed, 2);
        assert_eq!(starts, 1);
        assert_eq!(configs.len(), 1);
        assert!(finds > 0);
    }
}
