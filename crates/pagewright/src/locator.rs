//! Selectors and locator strategies.
//!
//! A [`Selector`] is the logical rule test authors write (`id = submit`,
//! `css = nav li`). Drivers never see it directly: it is lowered to a
//! [`NativeQuery`], the small set of lookups every WebDriver/Appium-style
//! backend understands, and executed through [`LocatorStrategy`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::NativeResult;
use crate::session::NativeDriver;

/// Kind of logical selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectorKind {
    /// Exact `id` attribute
    Id,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Single class name
    ClassName,
    /// Exact anchor text
    LinkText,
    /// Tag name
    Tag,
    /// `name` attribute
    Name,
    /// `id` attribute containing a substring
    IdContaining,
    /// Inner text containing a substring
    TextContaining,
    /// Mobile accessibility identifier
    AccessibilityId,
}

impl SelectorKind {
    /// Get the short name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::ClassName => "class",
            Self::LinkText => "linkText",
            Self::Tag => "tag",
            Self::Name => "name",
            Self::IdContaining => "idContaining",
            Self::TextContaining => "innerTextContains",
            Self::AccessibilityId => "accessibilityId",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical selector for locating elements. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    kind: SelectorKind,
    value: String,
}

impl Selector {
    /// Create a selector of any kind
    #[must_use]
    pub fn new(kind: SelectorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, id)
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(css: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, css)
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new(SelectorKind::XPath, xpath)
    }

    /// Create a class-name selector
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::new(SelectorKind::ClassName, class)
    }

    /// Create a link-text selector
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(SelectorKind::LinkText, text)
    }

    /// Create a tag selector
    #[must_use]
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::new(SelectorKind::Tag, tag)
    }

    /// Create a `name` attribute selector
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(SelectorKind::Name, name)
    }

    /// Create an id-substring selector
    #[must_use]
    pub fn id_containing(fragment: impl Into<String>) -> Self {
        Self::new(SelectorKind::IdContaining, fragment)
    }

    /// Create an inner-text-substring selector
    #[must_use]
    pub fn text_containing(text: impl Into<String>) -> Self {
        Self::new(SelectorKind::TextContaining, text)
    }

    /// Create an accessibility-id selector
    #[must_use]
    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::new(SelectorKind::AccessibilityId, id)
    }

    /// Get the selector kind
    #[must_use]
    pub const fn kind(&self) -> SelectorKind {
        self.kind
    }

    /// Get the raw selector value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lower the logical selector to a native query
    #[must_use]
    pub fn to_native_query(&self) -> NativeQuery {
        let v = &self.value;
        match self.kind {
            SelectorKind::Id => NativeQuery::Css(format!("[id={}]", css_string(v))),
            SelectorKind::Css => NativeQuery::Css(v.clone()),
            SelectorKind::XPath => NativeQuery::XPath(v.clone()),
            SelectorKind::ClassName => NativeQuery::Css(format!("[class~={}]", css_string(v))),
            SelectorKind::LinkText => NativeQuery::LinkText(v.clone()),
            SelectorKind::Tag => NativeQuery::TagName(v.clone()),
            SelectorKind::Name => NativeQuery::Css(format!("[name={}]", css_string(v))),
            SelectorKind::IdContaining => NativeQuery::Css(format!("[id*={}]", css_string(v))),
            SelectorKind::TextContaining => NativeQuery::XPath(format!(
                ".//*[contains(text(), {})]",
                xpath_literal(v)
            )),
            SelectorKind::AccessibilityId => NativeQuery::AccessibilityId(v.clone()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.kind, self.value)
    }
}

/// Query in the vocabulary native drivers understand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeQuery {
    /// CSS selector
    Css(String),
    /// XPath expression, relative to the search context
    XPath(String),
    /// Exact anchor text
    LinkText(String),
    /// Tag name
    TagName(String),
    /// Mobile accessibility identifier
    AccessibilityId(String),
}

impl NativeQuery {
    /// W3C / Appium locator strategy name
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css selector",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link text",
            Self::TagName(_) => "tag name",
            Self::AccessibilityId(_) => "accessibility id",
        }
    }

    /// Locator value sent along with the strategy
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::XPath(v)
            | Self::LinkText(v)
            | Self::TagName(v)
            | Self::AccessibilityId(v) => v,
        }
    }
}

/// Pluggable rule for finding native elements under a search context.
///
/// `context` is `None` for document-level lookups and the parent element for
/// scoped ones.
pub trait LocatorStrategy<D: NativeDriver> {
    /// Find every match, in document order
    fn find_all(&self, driver: &D, context: Option<&D::Element>) -> NativeResult<Vec<D::Element>>;

    /// Find the first match, if any
    fn find_one(&self, driver: &D, context: Option<&D::Element>) -> NativeResult<Option<D::Element>> {
        Ok(self.find_all(driver, context)?.into_iter().next())
    }

    /// Human-readable description used in diagnostics
    fn describe(&self) -> String;
}

impl<D: NativeDriver> LocatorStrategy<D> for Selector {
    fn find_all(&self, driver: &D, context: Option<&D::Element>) -> NativeResult<Vec<D::Element>> {
        driver.find_elements(context, &self.to_native_query())
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Quote a value as a CSS string literal
fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Quote a value as an XPath 1.0 literal (which has no escape syntax)
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
