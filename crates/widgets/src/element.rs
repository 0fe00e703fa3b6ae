//! Declarative accordion tree.
//!
//! An `Element` describes what to show; a [`Host`](crate::Host) turns it into
//! mounted items with live registry subscriptions.

/// One node of a composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Owns one registry shared by every item below it.
    Group(Vec<Element>),
    /// One collapsible unit; must sit inside a `Group`.
    Item(Vec<Element>),
    /// Always visible; activating it toggles the enclosing item.
    Header(Vec<Element>),
    /// Shown only while the enclosing item is open.
    Panel(Vec<Element>),
    Text(String),
}

/// Variant of an [`Element`] without its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Group,
    Item,
    Header,
    Panel,
    Text,
}

impl ElementKind {
    /// Component name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Group => "Group",
            ElementKind::Item => "Item",
            ElementKind::Header => "Header",
            ElementKind::Panel => "Panel",
            ElementKind::Text => "Text",
        }
    }
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Group(_) => ElementKind::Group,
            Element::Item(_) => ElementKind::Item,
            Element::Header(_) => ElementKind::Header,
            Element::Panel(_) => ElementKind::Panel,
            Element::Text(_) => ElementKind::Text,
        }
    }

    pub fn children(&self) -> &[Element] {
        match self {
            Element::Group(children)
            | Element::Item(children)
            | Element::Header(children)
            | Element::Panel(children) => children,
            Element::Text(_) => &[],
        }
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::Text(text.to_string())
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::Text(text)
    }
}

pub fn group(children: impl IntoIterator<Item = Element>) -> Element {
    Element::Group(children.into_iter().collect())
}

pub fn item(children: impl IntoIterator<Item = Element>) -> Element {
    Element::Item(children.into_iter().collect())
}

pub fn header(children: impl IntoIterator<Item = Element>) -> Element {
    Element::Header(children.into_iter().collect())
}

pub fn panel(children: impl IntoIterator<Item = Element>) -> Element {
    Element::Panel(children.into_iter().collect())
}

pub fn text(text: impl Into<String>) -> Element {
    Element::Text(text.into())
}

/// Shorthand for the common `Item { Header(title), Panel(body) }` shape.
pub fn section(title: impl Into<String>, body: impl Into<String>) -> Element {
    item([header([text(title)]), panel([text(body)])])
}
