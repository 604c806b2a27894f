//! Pagewright: page-object components over native UI drivers
//!
//! Pagewright sits between test code and a native automation driver (a
//! WebDriver client, an Appium session, a desktop accessibility bridge). It
//! supplies typed, lazily resolved component handles with explicit wait
//! conditions, page objects built from those components, and a lifecycle
//! controller that decides when a driver session is reused or restarted.
//!
//! # Architecture
//!
//! ```text
//!   SessionLifecycleController ── starts/closes ──► DriverSession<D>
//!              │                                         │
//!              ▼                                         ▼
//!      ComponentFactory ──creates──► ComponentHandle ──► NativeDriver
//!              │                      │ wait queue
//!              ▼                      ▼
//!     Page / typed components    WaitCondition (polling)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pagewright::prelude::*;
//!
//! let mut controller = SessionLifecycleController::new(my_factory, Settings::load_profile(dir, "ci")?);
//! controller.enter_class(None)?;
//! controller.enter_test(None)?;
//! let factory = controller.component_factory()?;
//! let save: Button<'_, _> = factory.by_id("save");
//! save.ensure_visible().click()?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod component;
mod components;
mod config;
mod events;
mod factory;
mod harness;
mod lifecycle;
mod locator;
mod page;
mod result;
mod session;
mod validate;
mod wait;

/// Logging setup on top of `tracing-subscriber`
pub mod logging;

/// In-memory driver for unit-testing components and page objects
///
/// Scriptable element tree with timed state changes, fault injection and
/// call counters. No browser required.
#[allow(clippy::missing_const_for_fn, clippy::doc_markdown)]
pub mod mock;

pub use component::{Component, ComponentContext, ComponentHandle, Resolution};
pub use components::{Anchor, Button, Label, PasswordField, TextField};
pub use config::{
    Settings, TimeoutSettings, DEFAULT_APPEAR_TIMEOUT_MS, DEFAULT_DISAPPEAR_TIMEOUT_MS,
    DEFAULT_SLEEP_INTERVAL_MS,
};
pub use events::{ComponentAction, ComponentEvent, EventBus, EventRecorder, ListenerFn};
pub use factory::ComponentFactory;
pub use harness::{
    run_class, SuiteResults, TestBody, TestCase, TestClass, TestHarness, TestResult,
};
pub use lifecycle::{SessionLifecycleController, TestOutcome};
pub use locator::{LocatorStrategy, NativeQuery, Selector, SelectorKind};
pub use page::{Page, PageAsserts, PageMap};
pub use result::{NativeFault, NativeFaultKind, NativeResult, PagewrightError, PagewrightResult};
pub use session::{
    DriverFactory, DriverSession, Lifecycle, NativeDriver, Platform, ScriptArg,
    SessionConfiguration,
};
pub use validate::{Expectation, Validate};
pub use wait::{poll_until, ConditionKind, WaitCondition, WaitResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::component::*;
    pub use super::components::*;
    pub use super::config::*;
    pub use super::events::*;
    pub use super::factory::*;
    pub use super::harness::*;
    pub use super::lifecycle::*;
    pub use super::locator::*;
    pub use super::page::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::validate::*;
    pub use super::wait::*;
}
