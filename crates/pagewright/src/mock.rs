//! In-memory driver for testing page objects without a browser.
//!
//! [`MockDriver`] keeps a small element tree. Elements can appear, become
//! visible, become enabled or disappear after a delay, which is enough to
//! exercise every wait condition deterministically. Element references carry
//! a generation; [`MockDriver::invalidate_all`] bumps it, so every reference
//! handed out before goes stale, the way a re-rendered page behaves.
//!
//! Supported lookups are the ones [`Selector`](crate::Selector) produces:
//! compound CSS (`tag`, `#id`, `.class`, `[attr="v"]`, `[attr~="v"]`,
//! `[attr*="v"]`), `.//*[contains(text(), 'v')]` and `//tag` XPath, link text,
//! tag name and accessibility id (`accessibility-id` attribute).

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::locator::NativeQuery;
use crate::result::{NativeFault, NativeResult, PagewrightError, PagewrightResult};
use crate::session::{DriverFactory, NativeDriver, ScriptArg, SessionConfiguration};

// =============================================================================
// ELEMENTS
// =============================================================================

/// Blueprint for a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    visible: bool,
    enabled: bool,
    present_after: Duration,
    visible_after: Duration,
    enabled_after: Duration,
    removed_after: Option<Duration>,
}

impl MockElement {
    /// Create a visible, enabled element
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            visible: true,
            enabled: true,
            present_after: Duration::ZERO,
            visible_after: Duration::ZERO,
            enabled_after: Duration::ZERO,
            removed_after: None,
        }
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    /// Add one or more space-separated classes
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        let merged = match self.attributes.get("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attributes.insert("class".into(), merged);
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the inner text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Never displayed
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Never enabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Attach to the document only after `delay`
    #[must_use]
    pub const fn present_after(mut self, delay: Duration) -> Self {
        self.present_after = delay;
        self
    }

    /// Display only after `delay`
    #[must_use]
    pub const fn visible_after(mut self, delay: Duration) -> Self {
        self.visible_after = delay;
        self
    }

    /// Enable only after `delay`
    #[must_use]
    pub const fn enabled_after(mut self, delay: Duration) -> Self {
        self.enabled_after = delay;
        self
    }

    /// Detach from the document after `delay`
    #[must_use]
    pub const fn removed_after(mut self, delay: Duration) -> Self {
        self.removed_after = Some(delay);
        self
    }
}

/// Test-side identifier of a node added to a [`MockDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element reference handed to the resolution engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockRef {
    id: usize,
    generation: u64,
}

impl MockRef {
    /// Node this reference points at
    #[must_use]
    pub const fn node(&self) -> NodeId {
        NodeId(self.id)
    }
}

#[derive(Debug)]
struct Node {
    element: MockElement,
    parent: Option<usize>,
    children: Vec<usize>,
    created: Instant,
    removed: bool,
    clicks: u32,
}

impl Node {
    fn attached(&self, now: Instant) -> bool {
        let age = now.saturating_duration_since(self.created);
        !self.removed
            && age >= self.element.present_after
            && self.element.removed_after.map_or(true, |gone| age < gone)
    }

    fn displayed(&self, now: Instant) -> bool {
        self.element.visible && now.saturating_duration_since(self.created) >= self.element.visible_after
    }

    fn enabled(&self, now: Instant) -> bool {
        self.element.enabled && now.saturating_duration_since(self.created) >= self.element.enabled_after
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.element.attributes.get(name).map(String::as_str)
    }
}

// =============================================================================
// DRIVER
// =============================================================================

#[derive(Debug, Default)]
struct MockState {
    nodes: Vec<Node>,
    roots: Vec<usize>,
    generation: u64,
    calls: u64,
    scheduled_faults: Vec<(u64, NativeFault)>,
    script_faults: Vec<(String, NativeFault)>,
    close_fault: Option<NativeFault>,
    closed: bool,
    find_calls: usize,
    close_calls: usize,
    network_idle_calls: usize,
    framework_ready_calls: usize,
    scripts: Vec<String>,
    navigations: Vec<String>,
}

impl MockState {
    /// Count a fallible call and fire any fault scheduled for it
    fn enter(&mut self) -> NativeResult<()> {
        if self.closed {
            return Err(NativeFault::driver("session closed"));
        }
        let call = self.calls;
        self.calls += 1;
        if let Some(pos) = self.scheduled_faults.iter().position(|(at, _)| *at == call) {
            return Err(self.scheduled_faults.remove(pos).1);
        }
        Ok(())
    }

    fn attached(&self, id: usize, now: Instant) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            if !node.attached(now) {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn live(&self, element: &MockRef, now: Instant) -> NativeResult<&Node> {
        if element.generation != self.generation || !self.attached(element.id, now) {
            return Err(NativeFault::stale(format!("node {} is detached", element.id)));
        }
        self.nodes
            .get(element.id)
            .ok_or_else(|| NativeFault::stale(format!("node {} is unknown", element.id)))
    }

    fn live_mut(&mut self, element: &MockRef, now: Instant) -> NativeResult<&mut Node> {
        self.live(element, now)?;
        self.nodes
            .get_mut(element.id)
            .ok_or_else(|| NativeFault::stale(format!("node {} is unknown", element.id)))
    }

    /// Attached nodes under `from` (whole document when `None`), in document order
    fn descendants(&self, from: Option<usize>, now: Instant) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = match from {
            Some(id) => self.nodes.get(id).map(|n| n.children.clone()).unwrap_or_default(),
            None => self.roots.clone(),
        };
        stack.reverse();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.attached(now) {
                continue;
            }
            out.push(id);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    fn query(&self, context: Option<usize>, query: &NativeQuery, now: Instant) -> NativeResult<Vec<usize>> {
        let matcher = Matcher::parse(query)?;
        Ok(self
            .descendants(context, now)
            .into_iter()
            .filter(|id| self.nodes.get(*id).is_some_and(|n| matcher.matches(n)))
            .collect())
    }
}

/// Scriptable in-memory [`NativeDriver`].
///
/// Clones share state, so a test can keep one clone for setup and
/// inspection while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, parent: Option<NodeId>, element: MockElement) -> NodeId {
        let mut state = self.state();
        let id = state.nodes.len();
        state.nodes.push(Node {
            element,
            parent: parent.map(|p| p.0),
            children: Vec::new(),
            created: Instant::now(),
            removed: false,
            clicks: 0,
        });
        match parent.and_then(|p| state.nodes.get_mut(p.0)) {
            Some(parent) => parent.children.push(id),
            None => state.roots.push(id),
        }
        NodeId(id)
    }

    /// Append an element at the document root
    pub fn add(&self, element: MockElement) -> NodeId {
        self.insert(None, element)
    }

    /// Append an element under `parent`
    pub fn add_child(&self, parent: &NodeId, element: MockElement) -> NodeId {
        self.insert(Some(*parent), element)
    }

    /// Detach a node and its subtree
    pub fn remove(&self, node: &NodeId) {
        if let Some(node) = self.state().nodes.get_mut(node.0) {
            node.removed = true;
        }
    }

    /// Detach every node matching a query
    pub fn remove_all(&self, selector: &crate::locator::Selector) {
        let mut state = self.state();
        let now = Instant::now();
        let matched = state
            .query(None, &selector.to_native_query(), now)
            .unwrap_or_default();
        for id in matched {
            if let Some(node) = state.nodes.get_mut(id) {
                node.removed = true;
            }
        }
    }

    /// Show or hide a node
    pub fn set_visible(&self, node: &NodeId, visible: bool) {
        if let Some(node) = self.state().nodes.get_mut(node.0) {
            node.element.visible = visible;
            node.element.visible_after = Duration::ZERO;
        }
    }

    /// Enable or disable a node
    pub fn set_enabled(&self, node: &NodeId, enabled: bool) {
        if let Some(node) = self.state().nodes.get_mut(node.0) {
            node.element.enabled = enabled;
            node.element.enabled_after = Duration::ZERO;
        }
    }

    /// Set an attribute on a node
    pub fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        if let Some(node) = self.state().nodes.get_mut(node.0) {
            node.element.attributes.insert(name.into(), value.into());
        }
    }

    /// Replace a node's inner text
    pub fn set_text(&self, node: &NodeId, text: &str) {
        if let Some(node) = self.state().nodes.get_mut(node.0) {
            node.element.text = text.into();
        }
    }

    /// Make every element reference handed out so far stale
    pub fn invalidate_all(&self) {
        self.state().generation += 1;
    }

    /// Fail the next fallible driver call
    pub fn fail_next(&self, fault: NativeFault) {
        self.fail_after(0, fault);
    }

    /// Let `calls` fallible driver calls succeed, then fail the next one
    pub fn fail_after(&self, calls: u64, fault: NativeFault) {
        let mut state = self.state();
        let at = state.calls + calls;
        state.scheduled_faults.push((at, fault));
    }

    /// Fail every script whose source contains `fragment`
    pub fn fail_script(&self, fragment: &str, fault: NativeFault) {
        self.state().script_faults.push((fragment.into(), fault));
    }

    /// Fail the next `close`
    pub fn fail_close(&self, fault: NativeFault) {
        self.state().close_fault = Some(fault);
    }

    /// Number of `find_elements` calls
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.state().find_calls
    }

    /// Number of `close` calls
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.state().close_calls
    }

    /// Number of network-idle waits
    #[must_use]
    pub fn network_idle_calls(&self) -> usize {
        self.state().network_idle_calls
    }

    /// Number of client-framework waits
    #[must_use]
    pub fn framework_ready_calls(&self) -> usize {
        self.state().framework_ready_calls
    }

    /// Number of clicks a node received
    #[must_use]
    pub fn clicks(&self, node: &NodeId) -> u32 {
        self.state().nodes.get(node.0).map_or(0, |n| n.clicks)
    }

    /// Current `value` attribute of a node
    #[must_use]
    pub fn value_of(&self, node: &NodeId) -> Option<String> {
        self.attribute_of(node, "value")
    }

    /// Current attribute of a node
    #[must_use]
    pub fn attribute_of(&self, node: &NodeId, name: &str) -> Option<String> {
        self.state()
            .nodes
            .get(node.0)
            .and_then(|n| n.attr(name).map(str::to_string))
    }

    /// Sources of every script run, in order
    #[must_use]
    pub fn scripts(&self) -> Vec<String> {
        self.state().scripts.clone()
    }

    /// Every URL navigated to, in order
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.state().navigations.clone()
    }

    /// Whether `close` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl NativeDriver for MockDriver {
    type Element = MockRef;

    fn find_elements(&self, context: Option<&MockRef>, query: &NativeQuery) -> NativeResult<Vec<MockRef>> {
        let mut state = self.state();
        state.find_calls += 1;
        state.enter()?;
        let now = Instant::now();
        let scope = match context {
            Some(element) => {
                state.live(element, now)?;
                Some(element.id)
            }
            None => None,
        };
        let generation = state.generation;
        Ok(state
            .query(scope, query, now)?
            .into_iter()
            .map(|id| MockRef { id, generation })
            .collect())
    }

    fn is_displayed(&self, element: &MockRef) -> NativeResult<bool> {
        let mut state = self.state();
        state.enter()?;
        let now = Instant::now();
        Ok(state.live(element, now)?.displayed(now))
    }

    fn is_enabled(&self, element: &MockRef) -> NativeResult<bool> {
        let mut state = self.state();
        state.enter()?;
        let now = Instant::now();
        Ok(state.live(element, now)?.enabled(now))
    }

    fn attribute(&self, element: &MockRef, name: &str) -> NativeResult<Option<String>> {
        let mut state = self.state();
        state.enter()?;
        let node = state.live(element, Instant::now())?;
        Ok(node.attr(name).map(str::to_string))
    }

    fn text(&self, element: &MockRef) -> NativeResult<String> {
        let mut state = self.state();
        state.enter()?;
        Ok(state.live(element, Instant::now())?.element.text.clone())
    }

    fn click(&self, element: &MockRef) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        let now = Instant::now();
        let node = state.live_mut(element, now)?;
        if !node.displayed(now) || !node.enabled(now) {
            return Err(NativeFault::not_interactable(format!(
                "node {} cannot be clicked",
                element.id
            )));
        }
        node.clicks += 1;
        Ok(())
    }

    fn clear(&self, element: &MockRef) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        let node = state.live_mut(element, Instant::now())?;
        node.element.attributes.insert("value".into(), String::new());
        Ok(())
    }

    fn send_keys(&self, element: &MockRef, text: &str) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        let now = Instant::now();
        let node = state.live_mut(element, now)?;
        if !node.enabled(now) {
            return Err(NativeFault::not_interactable(format!(
                "node {} does not accept input",
                element.id
            )));
        }
        node.element
            .attributes
            .entry("value".into())
            .or_default()
            .push_str(text);
        Ok(())
    }

    fn run_script(&self, source: &str, args: &[ScriptArg<'_, MockRef>]) -> NativeResult<serde_json::Value> {
        let mut state = self.state();
        state.enter()?;
        state.scripts.push(source.to_string());
        if let Some((_, fault)) = state.script_faults.iter().find(|(f, _)| source.contains(f.as_str())) {
            return Err(fault.clone());
        }
        let now = Instant::now();
        if let Some(ScriptArg::Element(element)) = args.first() {
            let node = state.live_mut(element, now)?;
            if source.contains("setAttribute") {
                if let (Some(ScriptArg::Value(name)), Some(ScriptArg::Value(value))) = (args.get(1), args.get(2)) {
                    let name = name.as_str().unwrap_or_default().to_string();
                    let value = value.as_str().unwrap_or_default().to_string();
                    node.element.attributes.insert(name, value);
                }
            }
        }
        Ok(serde_json::Value::Null)
    }

    fn navigate(&self, url: &str) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        state.navigations.push(url.to_string());
        Ok(())
    }

    fn wait_for_network_idle(&self) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        state.network_idle_calls += 1;
        Ok(())
    }

    fn wait_for_client_framework_ready(&self) -> NativeResult<()> {
        let mut state = self.state();
        state.enter()?;
        state.framework_ready_calls += 1;
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.state().closed
    }

    fn close(&mut self) -> NativeResult<()> {
        let mut state = self.state();
        state.close_calls += 1;
        state.closed = true;
        match state.close_fault.take() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

// =============================================================================
// QUERY MATCHING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    HasWord,
    Contains,
}

#[derive(Debug)]
enum Matcher {
    Compound {
        tag: Option<String>,
        attributes: Vec<(String, AttrOp, String)>,
    },
    TextContains(String),
    LinkText(String),
}

impl Matcher {
    fn parse(query: &NativeQuery) -> NativeResult<Self> {
        match query {
            NativeQuery::Css(css) => parse_css(css),
            NativeQuery::XPath(xpath) => parse_xpath(xpath),
            NativeQuery::LinkText(text) => Ok(Self::LinkText(text.clone())),
            NativeQuery::TagName(tag) => Ok(Self::Compound {
                tag: Some(tag.to_ascii_lowercase()),
                attributes: Vec::new(),
            }),
            NativeQuery::AccessibilityId(id) => Ok(Self::Compound {
                tag: None,
                attributes: vec![("accessibility-id".into(), AttrOp::Equals, id.clone())],
            }),
        }
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Compound { tag, attributes } => {
                tag.as_ref().map_or(true, |t| *t == node.element.tag)
                    && attributes.iter().all(|(name, op, value)| {
                        node.attr(name).is_some_and(|actual| match op {
                            AttrOp::Equals => actual == value,
                            AttrOp::HasWord => actual.split_whitespace().any(|w| w == value),
                            AttrOp::Contains => actual.contains(value.as_str()),
                        })
                    })
            }
            Self::TextContains(text) => node.element.text.contains(text.as_str()),
            Self::LinkText(text) => node.element.tag == "a" && node.element.text == *text,
        }
    }
}

fn unsupported(kind: &str, query: &str) -> NativeFault {
    NativeFault::driver(format!("mock driver does not support {kind} '{query}'"))
}

fn parse_css(css: &str) -> NativeResult<Matcher> {
    let mut chars = css.trim().chars().peekable();
    let mut tag = None;
    let mut attributes = Vec::new();

    if chars.peek().is_some_and(|c| is_ident(*c) || *c == '*') {
        let name = read_ident(&mut chars);
        if name.is_empty() {
            chars.next();
        } else {
            tag = Some(name.to_ascii_lowercase());
        }
    }
    while let Some(c) = chars.next() {
        match c {
            '#' => attributes.push(("id".into(), AttrOp::Equals, read_ident(&mut chars))),
            '.' => attributes.push(("class".into(), AttrOp::HasWord, read_ident(&mut chars))),
            '[' => {
                let name = read_ident(&mut chars);
                let op = match chars.next() {
                    Some('=') => AttrOp::Equals,
                    Some(c @ ('~' | '*')) => {
                        if chars.next() != Some('=') {
                            return Err(unsupported("css", css));
                        }
                        if c == '~' {
                            AttrOp::HasWord
                        } else {
                            AttrOp::Contains
                        }
                    }
                    _ => return Err(unsupported("css", css)),
                };
                let value = read_value(&mut chars).ok_or_else(|| unsupported("css", css))?;
                if chars.next() != Some(']') {
                    return Err(unsupported("css", css));
                }
                attributes.push((name, op, value));
            }
            _ => return Err(unsupported("css", css)),
        }
    }
    Ok(Matcher::Compound { tag, attributes })
}

fn parse_xpath(xpath: &str) -> NativeResult<Matcher> {
    let body = xpath.trim().trim_start_matches('.');
    if let Some(rest) = body.strip_prefix("//*[contains(text(), ") {
        let literal = rest
            .strip_suffix(")]")
            .ok_or_else(|| unsupported("xpath", xpath))?;
        let mut chars = literal.chars().peekable();
        let text = read_value(&mut chars).ok_or_else(|| unsupported("xpath", xpath))?;
        if chars.next().is_some() {
            return Err(unsupported("xpath", xpath));
        }
        return Ok(Matcher::TextContains(text));
    }
    match body.strip_prefix("//") {
        Some(tag) if !tag.is_empty() && tag.chars().all(is_ident) => Ok(Matcher::Compound {
            tag: Some(tag.to_ascii_lowercase()),
            attributes: Vec::new(),
        }),
        _ => Err(unsupported("xpath", xpath)),
    }
}

const fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(c) = chars.peek().copied().filter(|c| is_ident(*c)) {
        out.push(c);
        chars.next();
    }
    out
}

/// Read a quoted string with backslash escapes
fn read_value(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let quote = chars.next().filter(|q| *q == '"' || *q == '\'')?;
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => out.push(chars.next()?),
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Page setup run on every driver a [`MockDriverFactory`] starts
pub type PageSetupFn = Arc<dyn Fn(&MockDriver) + Send + Sync>;

#[derive(Default)]
struct FactoryState {
    started: Vec<(SessionConfiguration, MockDriver)>,
    start_failures: Vec<String>,
    close_fault: Option<NativeFault>,
}

/// [`DriverFactory`] producing [`MockDriver`]s, with start/close bookkeeping.
///
/// Clones share bookkeeping, so a test keeps one clone while the lifecycle
/// controller owns another.
#[derive(Clone, Default)]
pub struct MockDriverFactory {
    state: Arc<Mutex<FactoryState>>,
    setup: Option<PageSetupFn>,
}

impl std::fmt::Debug for MockDriverFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDriverFactory")
            .field("starts", &self.starts())
            .field("closes", &self.closes())
            .finish_non_exhaustive()
    }
}

impl MockDriverFactory {
    /// Create a factory producing empty documents
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate every started driver with `setup`
    #[must_use]
    pub fn with_page<F>(mut self, setup: F) -> Self
    where
        F: Fn(&MockDriver) + Send + Sync + 'static,
    {
        self.setup = Some(Arc::new(setup));
        self
    }

    fn state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail the next start with `message`
    pub fn fail_next_start(&self, message: &str) {
        self.state().start_failures.push(message.into());
    }

    /// Make the close of every driver started from now on fail
    pub fn fail_closes(&self, fault: NativeFault) {
        self.state().close_fault = Some(fault);
    }

    /// Number of drivers started
    #[must_use]
    pub fn starts(&self) -> usize {
        self.state().started.len()
    }

    /// Number of driver closes across all started drivers
    #[must_use]
    pub fn closes(&self) -> usize {
        self.state().started.iter().map(|(_, d)| d.close_calls()).sum()
    }

    /// Configurations passed to `start`, in order
    #[must_use]
    pub fn started_configs(&self) -> Vec<SessionConfiguration> {
        self.state().started.iter().map(|(c, _)| *c).collect()
    }

    /// Most recently started driver
    #[must_use]
    pub fn last_driver(&self) -> Option<MockDriver> {
        self.state().started.last().map(|(_, d)| d.clone())
    }
}

impl DriverFactory for MockDriverFactory {
    type Driver = MockDriver;

    fn start(&mut self, config: &SessionConfiguration) -> PagewrightResult<MockDriver> {
        let mut state = self.state();
        if !state.start_failures.is_empty() {
            let message = state.start_failures.remove(0);
            return Err(PagewrightError::SessionStart {
                platform: config.platform.to_string(),
                message,
            });
        }
        let driver = MockDriver::new();
        if let Some(fault) = &state.close_fault {
            driver.fail_close(fault.clone());
        }
        state.started.push((*config, driver.clone()));
        drop(state);
        if let Some(setup) = &self.setup {
            setup(&driver);
        }
        Ok(driver)
    }
}
