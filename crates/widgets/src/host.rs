//! Mounting and reconciling accordion trees.
//!
//! `Host` owns the mounted form of an [`Element`] tree. Each `Group` node owns
//! a fresh [`GroupContext`]; each `Item` node owns an [`ItemBinding`] drawn
//! from that context; `Header` and `Panel` nodes hold the [`ItemContext`] of
//! the item they sit in. Contexts are passed down explicitly while mounting.
//!
//! Updating with a new tree reconciles by position: a node whose kind is
//! unchanged keeps its registry or binding, anything else is unmounted and
//! mounted fresh.

use std::fmt;

use termcordion_core::{
    CompositionError, GroupContext, IdSource, InstanceId, ItemBinding, ItemContext, RandomIdSource,
};

use crate::element::{Element, ElementKind};

/// Mounted accordion tree.
pub struct Host {
    root: Option<Node>,
    ids: Box<dyn IdSource>,
}

enum Node {
    Group {
        context: GroupContext,
        children: Vec<Node>,
    },
    Item {
        binding: ItemBinding,
        children: Vec<Node>,
    },
    Header {
        item: ItemContext,
        children: Vec<Node>,
    },
    Panel {
        item: ItemContext,
        children: Vec<Node>,
    },
    Text(String),
}

/// Contexts visible at one point of the tree.
#[derive(Clone, Copy, Default)]
struct Scope<'a> {
    group: Option<&'a GroupContext>,
    item: Option<&'a ItemContext>,
}

/// One line of rendered output.
#[derive(Debug, Clone)]
pub struct RenderedLine {
    pub text: String,
    pub kind: LineKind,
    /// Number of open panels this line sits inside.
    pub depth: usize,
    /// Set for header lines.
    pub header: Option<HeaderHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header { open: bool },
    Content,
}

/// An activatable header in the rendered output.
#[derive(Debug, Clone)]
pub struct HeaderHandle {
    label: String,
    item: ItemContext,
}

impl HeaderHandle {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> &InstanceId {
        self.item.id()
    }

    pub fn is_open(&self) -> bool {
        self.item.is_open()
    }

    /// Toggle the item this header belongs to.
    pub fn activate(&self) {
        self.item.toggle();
    }
}

impl Host {
    /// Empty host drawing ids from `ids`.
    pub fn new(ids: Box<dyn IdSource>) -> Self {
        Self { root: None, ids }
    }

    /// Mount `root` with the given id policy.
    pub fn mount(root: &Element, ids: Box<dyn IdSource>) -> Result<Self, CompositionError> {
        let mut host = Self::new(ids);
        host.update(root)?;
        Ok(host)
    }

    /// Mount `root` with random ids.
    pub fn mount_default(root: &Element) -> Result<Self, CompositionError> {
        Self::mount(root, Box::new(RandomIdSource))
    }

    /// Replace the tree, keeping bindings of nodes that did not change kind.
    ///
    /// The tree is checked before anything is touched, so on error the
    /// previously mounted tree is left as it was.
    pub fn update(&mut self, root: &Element) -> Result<(), CompositionError> {
        validate(root, false, false)?;

        let ids = self.ids.as_ref();
        let scope = Scope::default();
        self.root = Some(match self.root.take() {
            Some(node) => node.reconcile(root, scope, ids)?,
            None => Node::mount(root, scope, ids)?,
        });
        Ok(())
    }

    /// Unmount everything, releasing every subscription.
    pub fn unmount(mut self) {
        if let Some(node) = self.root.take() {
            node.unmount();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    /// Every mounted group's registry handle, in tree order.
    pub fn groups(&self) -> Vec<GroupContext> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.collect_groups(&mut out);
        }
        out
    }

    /// Rendered output for the current registry state.
    pub fn lines(&self) -> Vec<RenderedLine> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.render(0, &mut out);
        }
        out
    }

    /// Headers currently visible, in display order.
    pub fn headers(&self) -> Vec<HeaderHandle> {
        self.lines()
            .into_iter()
            .filter_map(|line| line.header)
            .collect()
    }

    pub fn header_by_label(&self, label: &str) -> Option<HeaderHandle> {
        self.headers().into_iter().find(|h| h.label == label)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("mounted", &self.is_mounted())
            .field("groups", &self.groups())
            .finish()
    }
}

fn validate(element: &Element, in_group: bool, in_item: bool) -> Result<(), CompositionError> {
    let kind = element.kind();
    let (in_group, in_item) = match kind {
        ElementKind::Group => (true, in_item),
        ElementKind::Item if !in_group => {
            return Err(CompositionError::MissingGroupContext {
                component: kind.name(),
            })
        }
        ElementKind::Item => (true, true),
        ElementKind::Header | ElementKind::Panel if !in_item => {
            return Err(CompositionError::MissingItemContext {
                component: kind.name(),
            })
        }
        _ => (in_group, in_item),
    };

    element
        .children()
        .iter()
        .try_for_each(|child| validate(child, in_group, in_item))
}

impl Node {
    fn mount(
        element: &Element,
        scope: Scope<'_>,
        ids: &dyn IdSource,
    ) -> Result<Self, CompositionError> {
        match element {
            Element::Group(children) => {
                let context = GroupContext::new();
                termcordion_logger::debug("host: group mounted");
                let children = mount_all(
                    children,
                    Scope {
                        group: Some(&context),
                        ..scope
                    },
                    ids,
                )?;
                Ok(Node::Group { context, children })
            }
            Element::Item(children) => {
                // Children that fail to mount drop `binding`, which unsubscribes
                let binding = ItemBinding::mount(scope.group, ids)?;
                let children = mount_all(
                    children,
                    Scope {
                        item: Some(binding.context()),
                        ..scope
                    },
                    ids,
                )?;
                Ok(Node::Item { binding, children })
            }
            Element::Header(children) => {
                let item = enclosing_item(scope, ElementKind::Header)?;
                let children = mount_all(children, scope, ids)?;
                Ok(Node::Header { item, children })
            }
            Element::Panel(children) => {
                let item = enclosing_item(scope, ElementKind::Panel)?;
                let children = mount_all(children, scope, ids)?;
                Ok(Node::Panel { item, children })
            }
            Element::Text(text) => Ok(Node::Text(text.clone())),
        }
    }

    fn reconcile(
        self,
        element: &Element,
        scope: Scope<'_>,
        ids: &dyn IdSource,
    ) -> Result<Self, CompositionError> {
        match (self, element) {
            (Node::Group { context, children }, Element::Group(next)) => {
                let children = reconcile_all(
                    children,
                    next,
                    Scope {
                        group: Some(&context),
                        ..scope
                    },
                    ids,
                )?;
                Ok(Node::Group { context, children })
            }
            (Node::Item { binding, children }, Element::Item(next)) => {
                let children = reconcile_all(
                    children,
                    next,
                    Scope {
                        item: Some(binding.context()),
                        ..scope
                    },
                    ids,
                )?;
                Ok(Node::Item { binding, children })
            }
            (Node::Header { children, .. }, Element::Header(next)) => {
                let item = enclosing_item(scope, ElementKind::Header)?;
                let children = reconcile_all(children, next, scope, ids)?;
                Ok(Node::Header { item, children })
            }
            (Node::Panel { children, .. }, Element::Panel(next)) => {
                let item = enclosing_item(scope, ElementKind::Panel)?;
                let children = reconcile_all(children, next, scope, ids)?;
                Ok(Node::Panel { item, children })
            }
            (Node::Text(_), Element::Text(text)) => Ok(Node::Text(text.clone())),
            (stale, element) => {
                stale.unmount();
                Node::mount(element, scope, ids)
            }
        }
    }

    fn unmount(self) {
        match self {
            Node::Group { children, .. } => {
                children.into_iter().for_each(Node::unmount);
                termcordion_logger::debug("host: group unmounted");
            }
            Node::Item { binding, children } => {
                children.into_iter().for_each(Node::unmount);
                binding.release();
            }
            Node::Header { children, .. } | Node::Panel { children, .. } => {
                children.into_iter().for_each(Node::unmount);
            }
            Node::Text(_) => {}
        }
    }

    fn collect_groups(&self, out: &mut Vec<GroupContext>) {
        if let Node::Group { context, .. } = self {
            out.push(context.clone());
        }
        for child in self.children() {
            child.collect_groups(out);
        }
    }

    fn children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. }
            | Node::Item { children, .. }
            | Node::Header { children, .. }
            | Node::Panel { children, .. } => children,
            Node::Text(_) => &[],
        }
    }

    fn render(&self, depth: usize, out: &mut Vec<RenderedLine>) {
        match self {
            Node::Group { children, .. } | Node::Item { children, .. } => {
                for child in children {
                    child.render(depth, out);
                }
            }
            Node::Header { item, children } => {
                let mut parts = Vec::new();
                for child in children {
                    child.collect_text(&mut parts);
                }
                let label = parts.join(" ");
                out.push(RenderedLine {
                    text: label.clone(),
                    kind: LineKind::Header {
                        open: item.is_open(),
                    },
                    depth,
                    header: Some(HeaderHandle {
                        label,
                        item: item.clone(),
                    }),
                });
            }
            Node::Panel { item, children } => {
                if item.is_open() {
                    for child in children {
                        child.render(depth + 1, out);
                    }
                }
            }
            Node::Text(text) => {
                for line in text.lines() {
                    out.push(RenderedLine {
                        text: line.to_string(),
                        kind: LineKind::Content,
                        depth,
                        header: None,
                    });
                }
            }
        }
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Text(text) => out.push(text.trim()),
            other => {
                for child in other.children() {
                    child.collect_text(out);
                }
            }
        }
    }
}

fn enclosing_item(scope: Scope<'_>, kind: ElementKind) -> Result<ItemContext, CompositionError> {
    scope
        .item
        .cloned()
        .ok_or(CompositionError::MissingItemContext {
            component: kind.name(),
        })
}

fn mount_all(
    elements: &[Element],
    scope: Scope<'_>,
    ids: &dyn IdSource,
) -> Result<Vec<Node>, CompositionError> {
    elements
        .iter()
        .map(|element| Node::mount(element, scope, ids))
        .collect()
}

fn reconcile_all(
    old: Vec<Node>,
    next: &[Element],
    scope: Scope<'_>,
    ids: &dyn IdSource,
) -> Result<Vec<Node>, CompositionError> {
    let mut old = old.into_iter();
    let mut out = Vec::with_capacity(next.len());

    for element in next {
        let node = match old.next() {
            Some(node) => node.reconcile(element, scope, ids)?,
            None => Node::mount(element, scope, ids)?,
        };
        out.push(node);
    }

    // Trailing nodes with no counterpart
    old.for_each(Node::unmount);
    Ok(out)
}
