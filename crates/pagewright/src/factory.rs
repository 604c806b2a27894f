//! Component factory.
//!
//! The factory is the only way to obtain handles. At the root it searches the
//! whole document; obtained through [`ComponentHandle::children`] it searches
//! under one resolved parent element.

use std::fmt;
use std::sync::Arc;

use crate::component::{Component, ComponentContext, ComponentHandle, ParentScope};
use crate::locator::{LocatorStrategy, Selector};
use crate::result::PagewrightResult;
use crate::session::NativeDriver;

/// Creates typed component handles
pub struct ComponentFactory<'a, D: NativeDriver> {
    context: ComponentContext<'a, D>,
    parent: Option<ParentScope<D>>,
}

impl<D: NativeDriver> Clone for ComponentFactory<'_, D> {
    fn clone(&self) -> Self {
        Self {
            context: self.context,
            parent: self.parent.clone(),
        }
    }
}

impl<D: NativeDriver> fmt::Debug for ComponentFactory<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("scoped", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, D: NativeDriver + 'a> ComponentFactory<'a, D> {
    /// Create a root-level factory
    #[must_use]
    pub const fn new(context: ComponentContext<'a, D>) -> Self {
        Self {
            context,
            parent: None,
        }
    }

    pub(crate) fn scoped(context: ComponentContext<'a, D>, parent: ParentScope<D>) -> Self {
        Self {
            context,
            parent: Some(parent),
        }
    }

    /// Session context handed to every created handle
    #[must_use]
    pub const fn context(&self) -> ComponentContext<'a, D> {
        self.context
    }

    /// Whether handles from this factory are scoped under a parent
    #[must_use]
    pub const fn is_scoped(&self) -> bool {
        self.parent.is_some()
    }

    /// Create an untyped handle for the first match
    #[must_use]
    pub fn handle<S>(&self, strategy: S) -> ComponentHandle<'a, D>
    where
        S: LocatorStrategy<D> + 'static,
    {
        self.create(strategy)
    }

    /// Create a component for the first match. Nothing is resolved yet.
    #[must_use]
    pub fn create<C, S>(&self, strategy: S) -> C
    where
        C: Component<'a, D>,
        S: LocatorStrategy<D> + 'static,
    {
        self.create_at(strategy, 0)
    }

    /// Create a component for the `index`-th match. Nothing is resolved yet.
    #[must_use]
    pub fn create_at<C, S>(&self, strategy: S, index: usize) -> C
    where
        C: Component<'a, D>,
        S: LocatorStrategy<D> + 'static,
    {
        self.build(Arc::new(strategy), index)
    }

    /// Create one component per current match, using a single native lookup.
    ///
    /// No matches gives an empty list.
    ///
    /// # Errors
    /// Returns an error on native faults other than absence.
    pub fn create_all<C, S>(&self, strategy: S) -> PagewrightResult<Vec<C>>
    where
        C: Component<'a, D>,
        S: LocatorStrategy<D> + 'static,
    {
        let strategy: Arc<dyn LocatorStrategy<D>> = Arc::new(strategy);
        let driver = self.context.driver();
        let found = match self.parent.clone() {
            Some(mut scope) => scope.find_in(driver, &*strategy),
            None => strategy.find_all(driver, None),
        };
        let count = match found {
            Ok(found) => found.len(),
            Err(fault) if fault.is_absence() => 0,
            Err(fault) => return Err(fault.into()),
        };
        tracing::debug!(selector = %strategy.describe(), count, "created component list");
        Ok((0..count)
            .map(|index| self.build(Arc::clone(&strategy), index))
            .collect())
    }

    /// Create a component by exact id
    #[must_use]
    pub fn by_id<C: Component<'a, D>>(&self, id: &str) -> C {
        self.create(Selector::id(id))
    }

    /// Create a component by CSS selector
    #[must_use]
    pub fn by_css<C: Component<'a, D>>(&self, css: &str) -> C {
        self.create(Selector::css(css))
    }

    /// Create a component by XPath expression
    #[must_use]
    pub fn by_xpath<C: Component<'a, D>>(&self, xpath: &str) -> C {
        self.create(Selector::xpath(xpath))
    }

    /// Create a component by `name` attribute
    #[must_use]
    pub fn by_name<C: Component<'a, D>>(&self, name: &str) -> C {
        self.create(Selector::name(name))
    }

    /// Create a component by class name
    #[must_use]
    pub fn by_class<C: Component<'a, D>>(&self, class: &str) -> C {
        self.create(Selector::class_name(class))
    }

    /// Create a component by contained inner text
    #[must_use]
    pub fn by_text<C: Component<'a, D>>(&self, text: &str) -> C {
        self.create(Selector::text_containing(text))
    }

    fn build<C: Component<'a, D>>(&self, strategy: Arc<dyn LocatorStrategy<D>>, index: usize) -> C {
        let handle = ComponentHandle::new(self.context, strategy, self.parent.clone(), index)
            .with_type_name(C::TYPE_NAME);
        C::from_handle(handle)
    }
}
