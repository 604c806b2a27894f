//! Page objects.
//!
//! A page is split into a map (its components, built from a factory) and an
//! asserts type (validations over a map). Both are built on demand, so each
//! call to [`Page::map`] hands out fresh, unresolved handles.
//!
//! ```rust,ignore
//! struct LoginMap<'a, D: NativeDriver> {
//!     user: TextField<'a, D>,
//!     submit: Button<'a, D>,
//! }
//!
//! impl<'a, D: NativeDriver + 'a> PageMap<'a, D> for LoginMap<'a, D> {
//!     fn from_factory(factory: &ComponentFactory<'a, D>) -> Self {
//!         Self {
//!             user: factory.by_id("user"),
//!             submit: factory.by_css("button[type=submit]"),
//!         }
//!     }
//! }
//! ```

use crate::factory::ComponentFactory;
use crate::result::{PagewrightError, PagewrightResult};
use crate::session::NativeDriver;
use crate::wait::poll_until;

/// The components of a page
pub trait PageMap<'a, D: NativeDriver + 'a>: Sized {
    /// Build every component through `factory`. Nothing is resolved yet.
    fn from_factory(factory: &ComponentFactory<'a, D>) -> Self;
}

/// Validations over a page's components
pub trait PageAsserts<'a, D: NativeDriver + 'a>: Sized {
    /// Map the validations read from
    type Map: PageMap<'a, D>;

    /// Wrap a freshly built map
    fn from_map(map: Self::Map) -> Self;
}

/// A page reachable by URL
pub trait Page<'a, D: NativeDriver + 'a>: Sized {
    /// Component map
    type Map: PageMap<'a, D>;
    /// Validations
    type Asserts: PageAsserts<'a, D, Map = Self::Map>;

    /// Wrap a factory
    fn new(factory: ComponentFactory<'a, D>) -> Self;

    /// Factory the page builds its components with
    fn factory(&self) -> &ComponentFactory<'a, D>;

    /// Address [`Page::open`] navigates to
    fn url(&self) -> String;

    /// Name used in diagnostics
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Fresh component map
    fn map(&self) -> Self::Map {
        Self::Map::from_factory(self.factory())
    }

    /// Fresh validations
    fn asserts(&self) -> Self::Asserts {
        Self::Asserts::from_map(self.map())
    }

    /// Whether the page is ready for interaction. Checked once per poll.
    ///
    /// # Errors
    /// Implementations may propagate native faults.
    fn is_loaded(&self) -> PagewrightResult<bool> {
        Ok(true)
    }

    /// Navigate to [`Page::url`] and wait for [`Page::is_loaded`].
    ///
    /// # Errors
    /// Returns an error if navigation fails or the page never loads within the
    /// validations timeout.
    fn open(&self) -> PagewrightResult<()> {
        let context = self.factory().context();
        let url = self.url();
        tracing::debug!(page = self.page_name(), %url, "opening page");
        context.driver().navigate(&url)?;

        let timeouts = context.settings().timeouts;
        let result = poll_until(
            timeouts.validations_timeout(),
            timeouts.sleep_interval(),
            || self.is_loaded(),
        )?;
        if result.success {
            return Ok(());
        }
        Err(PagewrightError::ValidationFailed {
            message: format!(
                "{} did not load from {url} within {}ms",
                self.page_name(),
                result.elapsed.as_millis()
            ),
        })
    }
}
