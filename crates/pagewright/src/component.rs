//! Component handles and the resolution engine.
//!
//! A [`ComponentHandle`] is a lazily resolved reference to the `index`-th
//! element matched by a locator strategy, optionally scoped under a parent
//! element. Nothing touches the driver until the handle is used:
//!
//! ```text
//! factory.by_id::<Button>("save")      no driver call
//!     .ensure_visible()                queue: [Visible]
//!     .ensure_clickable()              queue: [Visible, Clickable]
//!     .click()?                        queue: [.., Exists, Clickable]
//!                                      poll each condition in order
//!                                      re-locate, scroll, settle, click
//!                                      queue: []
//! ```
//!
//! Native faults raised while resolving are not errors by themselves: they are
//! logged and reported as [`Resolution::TransientFault`], leaving the caller to
//! decide whether a stale element is good enough.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Settings;
use crate::events::{ComponentAction, ComponentEvent, EventBus};
use crate::factory::ComponentFactory;
use crate::locator::LocatorStrategy;
use crate::result::{NativeFault, NativeFaultKind, NativeResult, PagewrightError, PagewrightResult};
use crate::session::{NativeDriver, ScriptArg};
use crate::wait::{ConditionKind, WaitCondition, WaitResult};

const SCROLL_INTO_VIEW_SCRIPT: &str = "arguments[0].scrollIntoView(true);";
const SET_ATTRIBUTE_SCRIPT: &str = "arguments[0].setAttribute(arguments[1], arguments[2]);";
const WINDOW_FOCUS_SCRIPT: &str = "window.focus();";
const ELEMENT_FOCUS_SCRIPT: &str = "arguments[0].focus();";
const HOVER_SCRIPT: &str =
    "arguments[0].dispatchEvent(new MouseEvent('mouseover', {bubbles: true, cancelable: true}));";

// =============================================================================
// CONTEXT
// =============================================================================

/// Everything a handle borrows from the running session
pub struct ComponentContext<'a, D: NativeDriver> {
    driver: &'a D,
    settings: &'a Settings,
    events: &'a EventBus,
}

impl<D: NativeDriver> Clone for ComponentContext<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: NativeDriver> Copy for ComponentContext<'_, D> {}

impl<D: NativeDriver> fmt::Debug for ComponentContext<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentContext")
            .field("settings", self.settings)
            .field("events", self.events)
            .finish_non_exhaustive()
    }
}

impl<'a, D: NativeDriver> ComponentContext<'a, D> {
    /// Create a context
    #[must_use]
    pub const fn new(driver: &'a D, settings: &'a Settings, events: &'a EventBus) -> Self {
        Self {
            driver,
            settings,
            events,
        }
    }

    /// Borrow the driver
    #[must_use]
    pub const fn driver(&self) -> &'a D {
        self.driver
    }

    /// Borrow the settings
    #[must_use]
    pub const fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// Borrow the event bus
    #[must_use]
    pub const fn events(&self) -> &'a EventBus {
        self.events
    }

    /// Build a condition with the configured timeout for its kind
    #[must_use]
    pub const fn condition(&self, kind: ConditionKind) -> WaitCondition {
        WaitCondition::from_settings(kind, &self.settings.timeouts)
    }
}

// =============================================================================
// PARENT SCOPE
// =============================================================================

/// Snapshot of a parent handle: how to find it again and what it last resolved to
pub(crate) struct ParentScope<D: NativeDriver> {
    strategy: Arc<dyn LocatorStrategy<D>>,
    index: usize,
    element: Option<D::Element>,
    parent: Option<Box<ParentScope<D>>>,
}

impl<D: NativeDriver> Clone for ParentScope<D> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
            index: self.index,
            element: self.element.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<D: NativeDriver> ParentScope<D> {
    /// Run `strategy` under this scope's element.
    ///
    /// A missing or stale element is located again (ancestors first) and the
    /// lookup retried once. If the scope itself cannot be found the result is
    /// empty; the search never widens to the whole document.
    pub(crate) fn find_in(
        &mut self,
        driver: &D,
        strategy: &dyn LocatorStrategy<D>,
    ) -> NativeResult<Vec<D::Element>> {
        if self.element.is_none() && self.relocate(driver)?.is_none() {
            return Ok(Vec::new());
        }
        let Some(element) = self.element.clone() else {
            return Ok(Vec::new());
        };
        match strategy.find_all(driver, Some(&element)) {
            Err(fault) if fault.kind == NativeFaultKind::StaleElement => {
                debug!(parent = %self.strategy.describe(), "parent went stale, re-locating");
                match self.relocate(driver)? {
                    Some(fresh) => strategy.find_all(driver, Some(&fresh)),
                    None => Ok(Vec::new()),
                }
            }
            other => other,
        }
    }

    fn relocate(&mut self, driver: &D) -> NativeResult<Option<D::Element>> {
        let found = match &mut self.parent {
            Some(grandparent) => grandparent.find_in(driver, &*self.strategy),
            None => self.strategy.find_all(driver, None),
        };
        self.element = match found {
            Ok(found) => found.into_iter().nth(self.index),
            Err(fault) if fault.is_absence() => None,
            Err(fault) => return Err(fault),
        };
        Ok(self.element.clone())
    }
}

fn locate<D: NativeDriver>(
    driver: &D,
    strategy: &dyn LocatorStrategy<D>,
    parent: Option<&mut ParentScope<D>>,
) -> NativeResult<Vec<D::Element>> {
    match parent {
        Some(scope) => scope.find_in(driver, strategy),
        None => strategy.find_all(driver, None),
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// Outcome of resolving a handle
#[derive(Debug)]
pub enum Resolution<E> {
    /// Every condition held and the element was located
    Resolved(E),
    /// The element never matched, or a condition timed out
    NotFound(PagewrightError),
    /// A native fault interrupted resolution
    TransientFault {
        /// Element obtained earlier in the same attempt, if any
        last_known: Option<E>,
        /// The fault, wrapped with the component name
        error: PagewrightError,
    },
}

impl<E> Resolution<E> {
    /// Whether resolution fully succeeded
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Resolved element, or the last known one after a transient fault
    #[must_use]
    pub const fn element(&self) -> Option<&E> {
        match self {
            Self::Resolved(e) => Some(e),
            Self::TransientFault { last_known, .. } => last_known.as_ref(),
            Self::NotFound(_) => None,
        }
    }

    /// Accept a transient fault if it still produced an element.
    ///
    /// # Errors
    /// Returns the resolution error when no element is available.
    pub fn best_effort(self) -> PagewrightResult<E> {
        match self {
            Self::Resolved(e)
            | Self::TransientFault {
                last_known: Some(e),
                ..
            } => Ok(e),
            Self::NotFound(error) | Self::TransientFault { error, .. } => Err(error),
        }
    }

    /// Treat anything but full resolution as an error.
    ///
    /// # Errors
    /// Returns the resolution error for `NotFound` and `TransientFault`.
    pub fn into_result(self) -> PagewrightResult<E> {
        match self {
            Self::Resolved(e) => Ok(e),
            Self::NotFound(error) | Self::TransientFault { error, .. } => Err(error),
        }
    }
}

enum Attempt<E> {
    Located(E),
    Unmet(WaitCondition, WaitResult),
    Vanished { expected: bool },
    Faulted(NativeFault, Option<E>),
}

// =============================================================================
// HANDLE
// =============================================================================

/// Lazily resolved reference to one native element
pub struct ComponentHandle<'a, D: NativeDriver> {
    context: ComponentContext<'a, D>,
    strategy: Arc<dyn LocatorStrategy<D>>,
    parent: Option<ParentScope<D>>,
    index: usize,
    type_name: &'static str,
    pending: Vec<WaitCondition>,
    cached: Option<D::Element>,
}

impl<D: NativeDriver> fmt::Debug for ComponentHandle<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name())
            .field("index", &self.index)
            .field("scoped", &self.parent.is_some())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl<'a, D: NativeDriver> ComponentHandle<'a, D> {
    pub(crate) fn new(
        context: ComponentContext<'a, D>,
        strategy: Arc<dyn LocatorStrategy<D>>,
        parent: Option<ParentScope<D>>,
        index: usize,
    ) -> Self {
        Self {
            context,
            strategy,
            parent,
            index,
            type_name: "Component",
            pending: Vec::new(),
            cached: None,
        }
    }

    pub(crate) fn with_type_name(mut self, type_name: &'static str) -> Self {
        self.type_name = type_name;
        self
    }

    /// Session context the handle resolves against
    #[must_use]
    pub const fn context(&self) -> ComponentContext<'a, D> {
        self.context
    }

    /// Position among the strategy's matches
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether the handle is scoped under a parent element
    #[must_use]
    pub const fn is_scoped(&self) -> bool {
        self.parent.is_some()
    }

    /// Locator description
    #[must_use]
    pub fn describe(&self) -> String {
        self.strategy.describe()
    }

    /// Derived diagnostic name, `"{TypeName} ({locator})"`
    #[must_use]
    pub fn name(&self) -> String {
        format!("{} ({})", self.type_name, self.strategy.describe())
    }

    /// Conditions waiting for the next resolution
    #[must_use]
    pub fn pending(&self) -> &[WaitCondition] {
        &self.pending
    }

    /// Element from the last successful resolution
    #[must_use]
    pub const fn cached(&self) -> Option<&D::Element> {
        self.cached.as_ref()
    }

    /// Queue a condition for the next resolution
    pub fn push(&mut self, condition: WaitCondition) {
        self.cached = None;
        self.pending.push(condition);
    }

    /// Resolve the handle, consuming the pending queue
    pub fn resolve(&mut self) -> Resolution<D::Element> {
        let attempt = self.attempt();
        self.conclude(attempt)
    }

    /// Resolve, treating transient faults as errors.
    ///
    /// # Errors
    /// Returns an error unless every condition held and the element was located.
    pub fn resolve_strict(&mut self) -> PagewrightResult<D::Element> {
        self.resolve().into_result()
    }

    /// Resolve, accepting the last known element after a transient fault.
    ///
    /// # Errors
    /// Returns an error if no element could be obtained.
    pub fn element(&mut self) -> PagewrightResult<D::Element> {
        self.resolve().best_effort()
    }

    fn attempt(&mut self) -> Attempt<D::Element> {
        self.cached = None;
        let mut chain = std::mem::take(&mut self.pending);
        if chain.is_empty() {
            chain.push(self.context.condition(ConditionKind::Exists));
        }

        let driver = self.context.driver;
        let index = self.index;
        let strategy = Arc::clone(&self.strategy);
        let parent = &mut self.parent;
        let mut last_known: Option<D::Element> = None;

        for condition in &chain {
            debug!(
                component = %self.type_name,
                selector = %strategy.describe(),
                condition = %condition,
                "waiting"
            );
            let outcome = condition.wait_for(driver, index, || {
                let found = locate(driver, &*strategy, parent.as_mut())?;
                if let Some(element) = found.get(index) {
                    last_known = Some(element.clone());
                }
                Ok(found)
            });
            match outcome {
                Ok(result) if result.success => {}
                Ok(result) => return Attempt::Unmet(*condition, result),
                Err(fault) => return Attempt::Faulted(fault, last_known),
            }
        }

        let expected = chain.iter().any(|c| c.kind().accepts_absence());
        let element = match locate(driver, &*strategy, parent.as_mut()) {
            Ok(found) => match found.into_iter().nth(index) {
                Some(element) => element,
                None => return Attempt::Vanished { expected },
            },
            Err(fault) if fault.is_absence() => return Attempt::Vanished { expected },
            Err(fault) => return Attempt::Faulted(fault, last_known),
        };

        if let Err(fault) = self.settle(&element) {
            return Attempt::Faulted(fault, Some(element));
        }
        self.cached = Some(element.clone());
        Attempt::Located(element)
    }

    /// Post-location side effects configured in [`Settings`]
    fn settle(&self, element: &D::Element) -> NativeResult<()> {
        let driver = self.context.driver;
        let settings = self.context.settings;
        if settings.automatically_scroll_to_visible {
            scroll_into_view(driver, element, &self.name())?;
        }
        if settings.wait_until_ready_on_element_found {
            driver.wait_for_network_idle()?;
        }
        if settings.wait_for_client_framework_on_element_found {
            driver.wait_for_client_framework_ready()?;
        }
        let delay = settings.artificial_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        Ok(())
    }

    fn conclude(&self, attempt: Attempt<D::Element>) -> Resolution<D::Element> {
        let component = self.name();
        let selector = self.describe();
        match attempt {
            Attempt::Located(element) => Resolution::Resolved(element),
            Attempt::Vanished { .. } => {
                warn!(%component, %selector, "element was not found or didn't fulfill conditions");
                Resolution::NotFound(PagewrightError::ElementNotFound { component })
            }
            Attempt::Unmet(condition, result) => {
                warn!(
                    %component,
                    %selector,
                    condition = %condition.kind(),
                    attempts = result.attempts,
                    "element was not found or didn't fulfill conditions"
                );
                let error = if condition.kind() == ConditionKind::Exists {
                    PagewrightError::ElementNotFound { component }
                } else {
                    PagewrightError::WaitTimeout {
                        component,
                        condition: condition.kind().to_string(),
                        timeout_ms: u64::try_from(condition.timeout().as_millis())
                            .unwrap_or(u64::MAX),
                    }
                };
                Resolution::NotFound(error)
            }
            Attempt::Faulted(fault, last_known) => {
                warn!(%component, %selector, %fault, "element was not found or didn't fulfill conditions");
                Resolution::TransientFault {
                    last_known,
                    error: PagewrightError::TransientNativeFault { component, fault },
                }
            }
        }
    }

    pub(crate) fn emit(&self, action: ComponentAction, value: Option<&str>) {
        let mut event = ComponentEvent::new(action, self.name(), self.describe());
        if let Some(value) = value {
            event = event.with_value(value);
        }
        self.context.events.emit(&event);
    }

    // -------------------------------------------------------------------------
    // Child creation
    // -------------------------------------------------------------------------

    /// Snapshot of this handle as a parent scope, resolving it first
    pub(crate) fn scope(&mut self) -> PagewrightResult<ParentScope<D>> {
        let element = self.element()?;
        Ok(ParentScope {
            strategy: Arc::clone(&self.strategy),
            index: self.index,
            element: Some(element),
            parent: self.parent.clone().map(Box::new),
        })
    }

    /// Factory for components scoped under this one, resolving it first.
    ///
    /// # Errors
    /// Returns an error if this handle cannot be resolved.
    pub fn children(&mut self) -> PagewrightResult<ComponentFactory<'a, D>> {
        let scope = self.scope()?;
        Ok(ComponentFactory::scoped(self.context, scope))
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    /// Resolve and wait out the queued conditions.
    ///
    /// A chain containing a negative condition (`NotExists`, `NotVisible`)
    /// also succeeds when the element is gone at the end.
    ///
    /// # Errors
    /// Returns an error if a condition timed out.
    pub fn wait_to_be(&mut self) -> PagewrightResult<()> {
        match self.attempt() {
            Attempt::Vanished { expected: true } => Ok(()),
            attempt => self.conclude(attempt).best_effort().map(drop),
        }
    }

    /// Scroll the element into view.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or the script fails.
    pub fn scroll_to_visible(&mut self) -> PagewrightResult<()> {
        let element = self.element()?;
        self.emit(ComponentAction::ScrollingToVisible, None);
        scroll_into_view(self.context.driver, &element, &self.name())?;
        self.emit(ComponentAction::ScrolledToVisible, None);
        Ok(())
    }

    /// Read an attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn attribute(&mut self, name: &str) -> PagewrightResult<Option<String>> {
        let element = self.element()?;
        Ok(self.context.driver.attribute(&element, name)?)
    }

    /// Read the `class` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn html_class(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("class")
    }

    /// Read the `title` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn title(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("title")
    }

    /// Read the `style` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn style(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("style")
    }

    /// Read the `tabindex` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn tab_index(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("tabindex")
    }

    /// Read the `accesskey` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn access_key(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("accesskey")
    }

    /// Read the `dir` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn dir(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("dir")
    }

    /// Read the `lang` attribute.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn lang(&mut self) -> PagewrightResult<Option<String>> {
        self.attribute("lang")
    }

    /// Read the rendered text.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or read.
    pub fn text(&mut self) -> PagewrightResult<String> {
        let element = self.element()?;
        Ok(self.context.driver.text(&element)?)
    }

    /// Check visibility once, without waiting. Missing elements are not visible.
    ///
    /// # Errors
    /// Returns an error on native faults other than absence.
    pub fn is_visible(&mut self) -> PagewrightResult<bool> {
        self.check_now(ConditionKind::Visible)
    }

    /// Check enablement once, without waiting. Missing elements are not enabled.
    ///
    /// # Errors
    /// Returns an error on native faults other than absence.
    pub fn is_enabled(&mut self) -> PagewrightResult<bool> {
        Ok(self.read_now(D::is_enabled)?.unwrap_or(false))
    }

    /// Set an attribute through a script.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or the script fails.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> PagewrightResult<()> {
        let element = self.element()?;
        self.emit(ComponentAction::SettingAttribute, Some(value));
        self.context.driver.run_script(
            SET_ATTRIBUTE_SCRIPT,
            &[
                ScriptArg::Element(&element),
                ScriptArg::string(name),
                ScriptArg::string(value),
            ],
        )?;
        self.emit(ComponentAction::AttributeSet, Some(value));
        Ok(())
    }

    /// Focus the window, then the element.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or the script fails.
    pub fn focus(&mut self) -> PagewrightResult<()> {
        let element = self.element()?;
        let driver = self.context.driver;
        self.emit(ComponentAction::Focusing, None);
        driver.run_script(WINDOW_FOCUS_SCRIPT, &[])?;
        driver.run_script(ELEMENT_FOCUS_SCRIPT, &[ScriptArg::Element(&element)])?;
        self.emit(ComponentAction::Focused, None);
        Ok(())
    }

    /// Move the pointer over the element.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or the script fails.
    pub fn hover(&mut self) -> PagewrightResult<()> {
        let element = self.element()?;
        self.emit(ComponentAction::Hovering, None);
        self.context
            .driver
            .run_script(HOVER_SCRIPT, &[ScriptArg::Element(&element)])?;
        self.emit(ComponentAction::Hovered, None);
        Ok(())
    }

    /// Wait until clickable, then click.
    ///
    /// # Errors
    /// Returns an error if the element never becomes clickable or the click fails.
    pub fn click(&mut self) -> PagewrightResult<()> {
        self.push(self.context.condition(ConditionKind::Exists));
        self.push(self.context.condition(ConditionKind::Clickable));
        let element = self.element()?;
        self.emit(ComponentAction::Clicking, None);
        self.context.driver.click(&element)?;
        self.emit(ComponentAction::Clicked, None);
        Ok(())
    }

    /// Replace the element's text.
    ///
    /// # Errors
    /// Returns an error if the element cannot be resolved or does not accept input.
    pub fn set_text(&mut self, value: &str) -> PagewrightResult<()> {
        let element = self.element()?;
        let driver = self.context.driver;
        self.emit(ComponentAction::SettingText, Some(value));
        driver.clear(&element)?;
        driver.send_keys(&element, value)?;
        self.emit(ComponentAction::TextSet, Some(value));
        Ok(())
    }

    /// Locate once and read from the element, without waiting, logging or
    /// touching the queue. `None` when the element is absent or goes stale.
    ///
    /// # Errors
    /// Returns an error on native faults other than absence.
    pub fn read_now<T, F>(&mut self, read: F) -> PagewrightResult<Option<T>>
    where
        F: FnOnce(&D, &D::Element) -> NativeResult<T>,
    {
        let Some(element) = self.current()? else {
            return Ok(None);
        };
        match read(self.context.driver, &element) {
            Ok(value) => Ok(Some(value)),
            Err(fault) if fault.is_absence() => Ok(None),
            Err(fault) => Err(fault.into()),
        }
    }

    /// Locate once without waiting, leaving the queue alone
    fn current(&mut self) -> PagewrightResult<Option<D::Element>> {
        match locate(self.context.driver, &*self.strategy, self.parent.as_mut()) {
            Ok(found) => Ok(found.into_iter().nth(self.index)),
            Err(fault) if fault.is_absence() => Ok(None),
            Err(fault) => Err(fault.into()),
        }
    }

    fn check_now(&mut self, kind: ConditionKind) -> PagewrightResult<bool> {
        let found: Vec<D::Element> = self.current()?.into_iter().collect();
        let condition = self.context.condition(kind);
        Ok(condition.evaluate(self.context.driver, &found, 0)?)
    }
}

fn scroll_into_view<D: NativeDriver>(driver: &D, element: &D::Element, component: &str) -> NativeResult<()> {
    match driver.run_script(SCROLL_INTO_VIEW_SCRIPT, &[ScriptArg::Element(element)]) {
        Ok(_) => Ok(()),
        Err(fault) if fault.kind == NativeFaultKind::NotInteractable => {
            debug!(%component, %fault, "could not scroll element into view");
            Ok(())
        }
        Err(fault) => Err(fault),
    }
}

// =============================================================================
// COMPONENT TRAIT
// =============================================================================

/// A typed component backed by a [`ComponentHandle`].
///
/// Chain methods queue a wait condition and hand the component back by value,
/// so `factory.by_id::<Button>("save").ensure_visible().click()` reads
/// top to bottom.
pub trait Component<'a, D: NativeDriver + 'a>: Sized {
    /// Type name used in the derived diagnostic name
    const TYPE_NAME: &'static str;

    /// Wrap a handle
    fn from_handle(handle: ComponentHandle<'a, D>) -> Self;

    /// Borrow the handle
    fn handle(&self) -> &ComponentHandle<'a, D>;

    /// Borrow the handle mutably
    fn handle_mut(&mut self) -> &mut ComponentHandle<'a, D>;

    /// Derived diagnostic name
    fn name(&self) -> String {
        self.handle().name()
    }

    /// Queue an arbitrary condition
    #[must_use]
    fn ensure(mut self, condition: WaitCondition) -> Self {
        self.handle_mut().push(condition);
        self
    }

    /// Queue a condition of `kind` with the configured timeout
    #[must_use]
    fn ensure_kind(self, kind: ConditionKind) -> Self {
        let condition = self.handle().context().condition(kind);
        self.ensure(condition)
    }

    /// Queue an `Exists` condition
    #[must_use]
    fn ensure_exists(self) -> Self {
        self.ensure_kind(ConditionKind::Exists)
    }

    /// Queue a `NotExists` condition
    #[must_use]
    fn ensure_not_exists(self) -> Self {
        self.ensure_kind(ConditionKind::NotExists)
    }

    /// Queue a `Visible` condition
    #[must_use]
    fn ensure_visible(self) -> Self {
        self.ensure_kind(ConditionKind::Visible)
    }

    /// Queue a `NotVisible` condition
    #[must_use]
    fn ensure_not_visible(self) -> Self {
        self.ensure_kind(ConditionKind::NotVisible)
    }

    /// Queue a `Clickable` condition
    #[must_use]
    fn ensure_clickable(self) -> Self {
        self.ensure_kind(ConditionKind::Clickable)
    }

    /// Queue a `Disabled` condition
    #[must_use]
    fn ensure_disabled(self) -> Self {
        self.ensure_kind(ConditionKind::Disabled)
    }

    /// Resolve this component, then create a child scoped under it.
    ///
    /// # Errors
    /// Returns an error if this component cannot be resolved.
    fn create<C, S>(&mut self, strategy: S) -> PagewrightResult<C>
    where
        C: Component<'a, D>,
        S: LocatorStrategy<D> + 'static,
    {
        Ok(self.handle_mut().children()?.create(strategy))
    }

    /// Resolve this component, then create one child per match under it.
    ///
    /// # Errors
    /// Returns an error if this component cannot be resolved or the lookup fails.
    fn create_all<C, S>(&mut self, strategy: S) -> PagewrightResult<Vec<C>>
    where
        C: Component<'a, D>,
        S: LocatorStrategy<D> + 'static,
    {
        self.handle_mut().children()?.create_all(strategy)
    }
}

impl<'a, D: NativeDriver + 'a> Component<'a, D> for ComponentHandle<'a, D> {
    const TYPE_NAME: &'static str = "Component";

    fn from_handle(handle: ComponentHandle<'a, D>) -> Self {
        handle
    }

    fn handle(&self) -> &ComponentHandle<'a, D> {
        self
    }

    fn handle_mut(&mut self) -> &mut ComponentHandle<'a, D> {
        self
    }
}
