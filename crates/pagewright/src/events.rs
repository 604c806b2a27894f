//! Component action events.
//!
//! State-changing actions on a component fire one event before and one after
//! the native call. Listeners are optional; an empty bus costs nothing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Action an event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentAction {
    /// Before a click
    Clicking,
    /// After a click
    Clicked,
    /// Before focusing
    Focusing,
    /// After focusing
    Focused,
    /// Before hovering
    Hovering,
    /// After hovering
    Hovered,
    /// Before setting an attribute
    SettingAttribute,
    /// After setting an attribute
    AttributeSet,
    /// Before typing text
    SettingText,
    /// After typing text
    TextSet,
    /// Before typing a password. Never carries the value.
    SettingPassword,
    /// After typing a password. Never carries the value.
    PasswordSet,
    /// Before scrolling into view
    ScrollingToVisible,
    /// After scrolling into view
    ScrolledToVisible,
}

impl ComponentAction {
    /// Get the action name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Clicking => "clicking",
            Self::Clicked => "clicked",
            Self::Focusing => "focusing",
            Self::Focused => "focused",
            Self::Hovering => "hovering",
            Self::Hovered => "hovered",
            Self::SettingAttribute => "setting_attribute",
            Self::AttributeSet => "attribute_set",
            Self::SettingText => "setting_text",
            Self::TextSet => "text_set",
            Self::SettingPassword => "setting_password",
            Self::PasswordSet => "password_set",
            Self::ScrollingToVisible => "scrolling_to_visible",
            Self::ScrolledToVisible => "scrolled_to_visible",
        }
    }

    /// Whether this is the "before" half of a pair
    #[must_use]
    pub const fn is_before(&self) -> bool {
        matches!(
            self,
            Self::Clicking
                | Self::Focusing
                | Self::Hovering
                | Self::SettingAttribute
                | Self::SettingText
                | Self::SettingPassword
                | Self::ScrollingToVisible
        )
    }
}

impl fmt::Display for ComponentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An action performed on a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEvent {
    /// What happened
    pub action: ComponentAction,
    /// Derived component name
    pub component: String,
    /// Locator description
    pub selector: String,
    /// Value involved (typed text, attribute value), if any
    pub value: Option<String>,
}

impl ComponentEvent {
    /// Create an event without a value
    #[must_use]
    pub fn new(
        action: ComponentAction,
        component: impl Into<String>,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            action,
            component: component.into(),
            selector: selector.into(),
            value: None,
        }
    }

    /// Attach a value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Listener function type for component events
pub type ListenerFn = Arc<dyn Fn(&ComponentEvent) + Send + Sync>;

/// Fan-out of component events to registered listeners
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Vec<ListenerFn>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(&ComponentEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(listener));
    }

    /// Register a shared listener
    pub fn subscribe(&self, listener: ListenerFn) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver an event to every listener, in registration order
    pub fn emit(&self, event: &ComponentEvent) {
        // Snapshot so a listener may register another without deadlocking
        let listeners = match self.listeners.lock() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };
        for listener in &listeners {
            listener(event);
        }
    }
}

/// Listener that stores every event, for assertions in tests
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<ComponentEvent>>>,
}

impl EventRecorder {
    /// Create a recorder and attach it to a bus
    #[must_use]
    pub fn attach(bus: &EventBus) -> Self {
        let recorder = Self::default();
        let sink = recorder.clone();
        bus.on(move |event| {
            if let Ok(mut events) = sink.events.lock() {
                events.push(event.clone());
            }
        });
        recorder
    }

    /// All recorded events
    #[must_use]
    pub fn events(&self) -> Vec<ComponentEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Recorded actions only
    #[must_use]
    pub fn actions(&self) -> Vec<ComponentAction> {
        self.events().into_iter().map(|e| e.action).collect()
    }

    /// Forget recorded events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}
