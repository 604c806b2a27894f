//! Retrying validations on components.
//!
//! Every validation re-reads the component until the expectation holds or the
//! configured `validations_timeout` elapses. Reads go straight to the current
//! element: they neither wait on nor consume the component's condition queue.
//!
//! ```rust,ignore
//! banner.validate_text_is("Saved")?;
//! row.validate_class_contains("selected")?;
//! link.validate_attribute_not_set("disabled")?;
//! ```

use std::fmt;

use tracing::debug;

use crate::component::{Component, ComponentHandle};
use crate::result::{PagewrightError, PagewrightResult};
use crate::session::NativeDriver;
use crate::wait::poll_until;

/// What a read value is expected to look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Exactly equal
    Is(String),
    /// Present and non-empty
    IsSet,
    /// Absent or empty
    NotSet,
    /// Present and containing a substring
    Contains(String),
    /// Absent or not containing a substring
    NotContains(String),
    /// Present and containing a whitespace-separated word
    HasWord(String),
    /// Absent or not containing a whitespace-separated word
    LacksWord(String),
}

impl Expectation {
    /// Check a read value
    #[must_use]
    pub fn matches(&self, actual: Option<&str>) -> bool {
        match (self, actual) {
            (Self::Is(expected), Some(actual)) => actual == expected,
            (Self::IsSet, Some(actual)) => !actual.is_empty(),
            (Self::NotSet, actual) => actual.map_or(true, str::is_empty),
            (Self::Contains(part), Some(actual)) => actual.contains(part.as_str()),
            (Self::NotContains(part), actual) => {
                actual.map_or(true, |a| !a.contains(part.as_str()))
            }
            (Self::HasWord(word), Some(actual)) => actual.split_whitespace().any(|w| w == word),
            (Self::LacksWord(word), actual) => {
                actual.map_or(true, |a| a.split_whitespace().all(|w| w != word))
            }
            (Self::Is(_) | Self::IsSet | Self::Contains(_) | Self::HasWord(_), None) => false,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Is(v) => write!(f, "to be '{v}'"),
            Self::IsSet => write!(f, "to be set"),
            Self::NotSet => write!(f, "not to be set"),
            Self::Contains(v) => write!(f, "to contain '{v}'"),
            Self::NotContains(v) => write!(f, "not to contain '{v}'"),
            Self::HasWord(v) => write!(f, "to include '{v}'"),
            Self::LacksWord(v) => write!(f, "not to include '{v}'"),
        }
    }
}

/// Retry `check` against the handle until it passes or validations time out.
///
/// `check` returns whether it passed plus a rendering of what it saw. Errors
/// from `check` count as "not yet" and are reported if the validation fails.
fn retry<'a, D, F>(handle: &mut ComponentHandle<'a, D>, subject: &str, mut check: F) -> PagewrightResult<()>
where
    D: NativeDriver + 'a,
    F: FnMut(&mut ComponentHandle<'a, D>) -> PagewrightResult<(bool, String)>,
{
    let timeouts = handle.context().settings().timeouts;
    let mut last_seen = String::from("nothing");
    let result = poll_until(
        timeouts.validations_timeout(),
        timeouts.sleep_interval(),
        || -> PagewrightResult<bool> {
            match check(handle) {
                Ok((passed, seen)) => {
                    last_seen = seen;
                    Ok(passed)
                }
                Err(e) => {
                    last_seen = format!("error: {e}");
                    Ok(false)
                }
            }
        },
    )?;

    if result.success {
        debug!(component = %handle.name(), subject, attempts = result.attempts, "validation passed");
        return Ok(());
    }
    Err(PagewrightError::ValidationFailed {
        message: format!(
            "{}: expected {subject}, last saw {last_seen} ({} attempts in {}ms)",
            handle.name(),
            result.attempts,
            result.elapsed.as_millis()
        ),
    })
}

fn render(value: Option<&str>) -> String {
    value.map_or_else(|| "<absent>".to_string(), |v| format!("'{v}'"))
}

/// Retrying validations, available on every [`Component`]
pub trait Validate<'a, D: NativeDriver + 'a>: Component<'a, D> {
    /// Validate an attribute against an expectation.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute(&mut self, name: &str, expectation: &Expectation) -> PagewrightResult<()> {
        let subject = format!("attribute '{name}' {expectation}");
        retry(self.handle_mut(), &subject, |handle| {
            match handle.read_now(|driver, element| driver.attribute(element, name))? {
                None => Ok((false, "no element".into())),
                Some(value) => Ok((expectation.matches(value.as_deref()), render(value.as_deref()))),
            }
        })
    }

    /// Validate an attribute equals `value`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute_is(&mut self, name: &str, value: &str) -> PagewrightResult<()> {
        self.validate_attribute(name, &Expectation::Is(value.into()))
    }

    /// Validate an attribute is present and non-empty.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute_is_set(&mut self, name: &str) -> PagewrightResult<()> {
        self.validate_attribute(name, &Expectation::IsSet)
    }

    /// Validate an attribute is absent or empty.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute_not_set(&mut self, name: &str) -> PagewrightResult<()> {
        self.validate_attribute(name, &Expectation::NotSet)
    }

    /// Validate an attribute contains `part`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute_contains(&mut self, name: &str, part: &str) -> PagewrightResult<()> {
        self.validate_attribute(name, &Expectation::Contains(part.into()))
    }

    /// Validate an attribute does not contain `part`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_attribute_not_contains(&mut self, name: &str, part: &str) -> PagewrightResult<()> {
        self.validate_attribute(name, &Expectation::NotContains(part.into()))
    }

    /// Validate the `class` attribute equals `value`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_class_is(&mut self, value: &str) -> PagewrightResult<()> {
        self.validate_attribute("class", &Expectation::Is(value.into()))
    }

    /// Validate the element has at least one class.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_class_is_set(&mut self) -> PagewrightResult<()> {
        self.validate_attribute("class", &Expectation::IsSet)
    }

    /// Validate the element has no class.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_class_not_set(&mut self) -> PagewrightResult<()> {
        self.validate_attribute("class", &Expectation::NotSet)
    }

    /// Validate the element has class `class`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_class_contains(&mut self, class: &str) -> PagewrightResult<()> {
        self.validate_attribute("class", &Expectation::HasWord(class.into()))
    }

    /// Validate the element lacks class `class`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_class_not_contains(&mut self, class: &str) -> PagewrightResult<()> {
        self.validate_attribute("class", &Expectation::LacksWord(class.into()))
    }

    /// Validate the rendered text.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_text(&mut self, expectation: &Expectation) -> PagewrightResult<()> {
        let subject = format!("text {expectation}");
        retry(self.handle_mut(), &subject, |handle| {
            match handle.read_now(|driver, element| driver.text(element))? {
                None => Ok((false, "no element".into())),
                Some(text) => Ok((expectation.matches(Some(&text)), render(Some(&text)))),
            }
        })
    }

    /// Validate the rendered text equals `text`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_text_is(&mut self, text: &str) -> PagewrightResult<()> {
        self.validate_text(&Expectation::Is(text.into()))
    }

    /// Validate the rendered text contains `part`.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_text_contains(&mut self, part: &str) -> PagewrightResult<()> {
        self.validate_text(&Expectation::Contains(part.into()))
    }

    /// Validate the element is displayed.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_is_visible(&mut self) -> PagewrightResult<()> {
        retry(self.handle_mut(), "to be visible", |handle| {
            let visible = handle.is_visible()?;
            Ok((visible, if visible { "visible" } else { "hidden or absent" }.into()))
        })
    }

    /// Validate the element is hidden or absent.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_is_not_visible(&mut self) -> PagewrightResult<()> {
        retry(self.handle_mut(), "not to be visible", |handle| {
            let visible = handle.is_visible()?;
            Ok((!visible, if visible { "visible" } else { "hidden or absent" }.into()))
        })
    }

    /// Validate the element is present and disabled.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_is_disabled(&mut self) -> PagewrightResult<()> {
        retry(self.handle_mut(), "to be disabled", |handle| {
            match handle.read_now(D::is_enabled)? {
                None => Ok((false, "no element".into())),
                Some(enabled) => Ok((!enabled, if enabled { "enabled" } else { "disabled" }.into())),
            }
        })
    }

    /// Validate the element is present and enabled.
    ///
    /// # Errors
    /// Returns [`PagewrightError::ValidationFailed`] if it never holds.
    fn validate_is_enabled(&mut self) -> PagewrightResult<()> {
        retry(self.handle_mut(), "to be enabled", |handle| {
            let enabled = handle.is_enabled()?;
            Ok((enabled, if enabled { "enabled" } else { "disabled or absent" }.into()))
        })
    }
}

impl<'a, D: NativeDriver + 'a, C: Component<'a, D>> Validate<'a, D> for C {}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::component::ComponentContext;
    use crate::config::{Settings, TimeoutSettings};
    use crate::events::EventBus;
    use crate::factory::ComponentFactory;
    use crate::locator::Selector;
    use crate::mock::{MockDriver, MockElement};
    use std::time::Duration;

    fn settings() -> Settings {
        Settings::default().with_timeouts(
            TimeoutSettings::default()
                .with_all_timeouts(120)
                .with_sleep_interval(10),
        )
    }

    mod expectation_tests {
        use super::*;

        #[test]
        fn test_is_set_and_not_set() {
            assert!(Expectation::IsSet.matches(Some("x")));
            assert!(!Expectation::IsSet.matches(Some("")));
            assert!(!Expectation::IsSet.matches(None));
            assert!(Expectation::NotSet.matches(None));
            assert!(Expectation::NotSet.matches(Some("")));
            assert!(!Expectation::NotSet.matches(Some("x")));
        }

        #[test]
        fn test_contains_and_words() {
            assert!(Expectation::Contains("act".into()).matches(Some("active")));
            assert!(!Expectation::HasWord("act".into()).matches(Some("active")));
            assert!(Expectation::HasWord("active".into()).matches(Some("btn active")));
            assert!(Expectation::LacksWord("act".into()).matches(Some("btn active")));
            assert!(Expectation::NotContains("x".into()).matches(None));
        }

        #[test]
        fn test_display() {
            assert_eq!(Expectation::Is("on".into()).to_string(), "to be 'on'");
            assert_eq!(Expectation::NotSet.to_string(), "not to be set");
        }
    }

    mod retry_tests {
        use super::*;

        #[test]
        fn test_attribute_becomes_expected() {
            let driver = MockDriver::new();
            let node = driver.add(MockElement::new("div").with_id("status").with_attr("data-state", "busy"));
            let settings = settings();
            let events = EventBus::new();
            let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
            let mut status: ComponentHandle<'_, MockDriver> = factory.by_id("status");

            let flipper = driver.clone();
            let worker = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(30));
                flipper.set_attribute(&node, "data-state", "idle");
            });
            status.validate_attribute_is("data-state", "idle").unwrap();
            worker.join().unwrap();
            assert!(status.pending().is_empty());
        }

        #[test]
        fn test_failure_reports_last_value() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("div").with_id("status").with_class("card"));
            let settings = settings();
            let events = EventBus::new();
            let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
            let mut status: ComponentHandle<'_, MockDriver> = factory.by_id("status");

            let err = status.validate_class_contains("selected").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("Component (id = status)"), "{message}");
            assert!(message.contains("'card'"), "{message}");
        }

        #[test]
        fn test_missing_element_fails_validation() {
            let driver = MockDriver::new();
            let settings = settings();
            let events = EventBus::new();
            let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
            let mut ghost: ComponentHandle<'_, MockDriver> = factory.by_id("ghost");
            assert!(matches!(
                ghost.validate_attribute_not_set("href"),
                Err(PagewrightError::ValidationFailed { .. })
            ));
            ghost.validate_is_not_visible().unwrap();
        }

        #[test]
        fn test_state_validations() {
            let driver = MockDriver::new();
            driver.add(MockElement::new("button").with_id("save").disabled().with_text("Save"));
            let settings = settings();
            let events = EventBus::new();
            let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
            let mut save: ComponentHandle<'_, MockDriver> = factory.by_id("save");
            save.validate_is_visible().unwrap();
            save.validate_is_disabled().unwrap();
            save.validate_text_is("Save").unwrap();
            save.validate_text_contains("av").unwrap();
            assert!(save.validate_is_enabled().is_err());
            assert!(save.validate_attribute_is_set("class").is_err());
        }
    }
}
