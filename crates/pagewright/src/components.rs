//! Typed components for common controls.
//!
//! Each wrapper owns a [`ComponentHandle`] and carries its own type name, so
//! diagnostics read `Button (id = save)` rather than a bare locator.

use std::fmt;

use crate::component::{Component, ComponentHandle};
use crate::events::ComponentAction;
use crate::result::PagewrightResult;
use crate::session::NativeDriver;

macro_rules! typed_component {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        pub struct $name<'a, D: NativeDriver> {
            handle: ComponentHandle<'a, D>,
        }

        impl<D: NativeDriver> fmt::Debug for $name<'_, D> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.handle).finish()
            }
        }

        impl<'a, D: NativeDriver + 'a> Component<'a, D> for $name<'a, D> {
            const TYPE_NAME: &'static str = stringify!($name);

            fn from_handle(handle: ComponentHandle<'a, D>) -> Self {
                Self { handle }
            }

            fn handle(&self) -> &ComponentHandle<'a, D> {
                &self.handle
            }

            fn handle_mut(&mut self) -> &mut ComponentHandle<'a, D> {
                &mut self.handle
            }
        }
    };
}

typed_component!(
    /// A clickable button
    Button
);

typed_component!(
    /// A text input
    TextField
);

typed_component!(
    /// A password input
    PasswordField
);

typed_component!(
    /// Static text
    Label
);

typed_component!(
    /// A hyperlink
    Anchor
);

impl<'a, D: NativeDriver + 'a> Button<'a, D> {
    /// Wait until clickable, then click.
    ///
    /// # Errors
    /// Returns an error if the button never becomes clickable.
    pub fn click(&mut self) -> PagewrightResult<()> {
        self.handle.click()
    }

    /// Caption text.
    ///
    /// # Errors
    /// Returns an error if the button cannot be resolved.
    pub fn caption(&mut self) -> PagewrightResult<String> {
        self.handle.text()
    }
}

impl<'a, D: NativeDriver + 'a> TextField<'a, D> {
    /// Replace the field's value.
    ///
    /// # Errors
    /// Returns an error if the field cannot be resolved or rejects input.
    pub fn set_text(&mut self, value: &str) -> PagewrightResult<()> {
        self.handle.set_text(value)
    }

    /// Current value, empty when unset.
    ///
    /// # Errors
    /// Returns an error if the field cannot be resolved.
    pub fn text(&mut self) -> PagewrightResult<String> {
        Ok(self.handle.attribute("value")?.unwrap_or_default())
    }

    /// Placeholder hint.
    ///
    /// # Errors
    /// Returns an error if the field cannot be resolved.
    pub fn placeholder(&mut self) -> PagewrightResult<Option<String>> {
        self.handle.attribute("placeholder")
    }
}

impl<'a, D: NativeDriver + 'a> PasswordField<'a, D> {
    /// Replace the password. Events fire around the input but never carry
    /// the value.
    ///
    /// # Errors
    /// Returns an error if the field cannot be resolved or rejects input.
    pub fn set_password(&mut self, password: &str) -> PagewrightResult<()> {
        let element = self.handle.element()?;
        let driver = self.handle.context().driver();
        self.handle.emit(ComponentAction::SettingPassword, None);
        driver.clear(&element)?;
        driver.send_keys(&element, password)?;
        self.handle.emit(ComponentAction::PasswordSet, None);
        Ok(())
    }

    /// Current value, empty when unset.
    ///
    /// # Errors
    /// Returns an error if the field cannot be resolved.
    pub fn get_password(&mut self) -> PagewrightResult<String> {
        Ok(self.handle.attribute("value")?.unwrap_or_default())
    }
}

impl<'a, D: NativeDriver + 'a> Label<'a, D> {
    /// Rendered text.
    ///
    /// # Errors
    /// Returns an error if the label cannot be resolved.
    pub fn text(&mut self) -> PagewrightResult<String> {
        self.handle.text()
    }
}

impl<'a, D: NativeDriver + 'a> Anchor<'a, D> {
    /// Link target.
    ///
    /// # Errors
    /// Returns an error if the link cannot be resolved.
    pub fn href(&mut self) -> PagewrightResult<Option<String>> {
        self.handle.attribute("href")
    }

    /// Wait until clickable, then follow the link.
    ///
    /// # Errors
    /// Returns an error if the link never becomes clickable.
    pub fn click(&mut self) -> PagewrightResult<()> {
        self.handle.click()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::component::ComponentContext;
    use crate::config::{Settings, TimeoutSettings};
    use crate::events::{EventBus, EventRecorder};
    use crate::factory::ComponentFactory;
    use crate::mock::{MockDriver, MockElement};

    fn settings() -> Settings {
        Settings::default().with_timeouts(
            TimeoutSettings::default()
                .with_all_timeouts(100)
                .with_sleep_interval(10),
        )
    }

    #[test]
    fn test_type_names_in_diagnostics() {
        let driver = MockDriver::new();
        let settings = settings();
        let events = EventBus::new();
        let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
        let button: Button<'_, MockDriver> = factory.by_id("save");
        let link: Anchor<'_, MockDriver> = factory.by_css("a.home");
        assert_eq!(button.name(), "Button (id = save)");
        assert_eq!(link.name(), "Anchor (css = a.home)");
    }

    #[test]
    fn test_login_form_round_trip() {
        let driver = MockDriver::new();
        let user = driver.add(MockElement::new("input").with_id("user").with_attr("placeholder", "Email"));
        let pass = driver.add(MockElement::new("input").with_id("pass"));
        let submit = driver.add(MockElement::new("button").with_id("go").with_text("Sign in"));
        let settings = settings();
        let events = EventBus::new();
        let recorder = EventRecorder::attach(&events);
        let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));

        let mut email: TextField<'_, MockDriver> = factory.by_id("user");
        let mut password: PasswordField<'_, MockDriver> = factory.by_id("pass");
        let mut button: Button<'_, MockDriver> = factory.by_id("go");

        assert_eq!(email.placeholder().unwrap().as_deref(), Some("Email"));
        email.set_text("ada@example.com").unwrap();
        password.set_password("hunter2").unwrap();
        assert_eq!(button.caption().unwrap(), "Sign in");
        button.click().unwrap();

        assert_eq!(email.text().unwrap(), "ada@example.com");
        assert_eq!(driver.value_of(&pass).as_deref(), Some("hunter2"));
        assert_eq!(driver.value_of(&user).as_deref(), Some("ada@example.com"));
        assert_eq!(driver.clicks(&submit), 1);
        assert_eq!(password.get_password().unwrap(), "hunter2");
        assert!(recorder
            .events()
            .iter()
            .all(|e| e.value.as_deref() != Some("hunter2")));
        let secret: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| e.component.starts_with("PasswordField"))
            .collect();
        assert_eq!(
            secret.iter().map(|e| e.action).collect::<Vec<_>>(),
            vec![ComponentAction::SettingPassword, ComponentAction::PasswordSet]
        );
        assert!(secret.iter().all(|e| e.value.is_none() && e.selector == "id = pass"));
        assert!(recorder.actions().contains(&ComponentAction::Clicked));
    }

    #[test]
    fn test_anchor_and_label() {
        let driver = MockDriver::new();
        let link = driver.add(MockElement::new("a").with_attr("href", "/home").with_text("Home"));
        driver.add(MockElement::new("span").with_class("greeting").with_text("Hello"));
        let settings = settings();
        let events = EventBus::new();
        let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));

        let mut home: Anchor<'_, MockDriver> = factory.by_text("Home");
        let mut greeting: Label<'_, MockDriver> = factory.by_class("greeting");
        assert_eq!(home.href().unwrap().as_deref(), Some("/home"));
        home.click().unwrap();
        assert_eq!(driver.clicks(&link), 1);
        assert_eq!(greeting.text().unwrap(), "Hello");
    }

    #[test]
    fn test_text_field_empty_value() {
        let driver = MockDriver::new();
        driver.add(MockElement::new("input").with_attr("name", "q"));
        let settings = settings();
        let events = EventBus::new();
        let factory = ComponentFactory::new(ComponentContext::new(&driver, &settings, &events));
        let mut search: TextField<'_, MockDriver> = factory.by_name("q");
        assert_eq!(search.text().unwrap(), "");
    }
}
