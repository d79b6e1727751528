//! In-memory document tree the menu operates on.
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. It keeps just enough
//! of the browser DOM for a navigation menu: attributes and class lists,
//! ancestor/descendant queries, an id index, keyboard focus and a registry of
//! installed event listeners.

mod parse;
mod selector;

use std::fmt::Write as _;

use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

use crate::error::Result;

pub use selector::Selector;

/// Handle to a node inside a [`Document`].
///
/// Handles are only meaningful for the document that created them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena index of the node.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Element payload: lowercase tag name and ordered attributes.
#[derive(Clone, Debug)]
pub struct Element {
    tag: String,
    attrs: SmallVec<[(String, String); 4]>,
}

impl Element {
    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over the whitespace-separated class list.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Returns `true` if the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    /// Markup inserted verbatim (icons); never parsed or queried.
    Raw(String),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Event types the menu listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    MouseEnter,
    MouseLeave,
    AnimationEnd,
}

/// Where a listener is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Document,
    Node(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Listener {
    target: ListenerTarget,
    kind: EventKind,
    // Menu root that installed the listener.
    owner: NodeId,
}

/// Arena-backed document tree.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    ids: FxHashMap<String, SmallVec<[NodeId; 1]>>,
    listeners: Vec<Listener>,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document containing only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            ids: FxHashMap::with_capacity_and_hasher(16, FxBuildHasher),
            listeners: Vec::new(),
            active: None,
        }
    }

    /// Parses `html` and appends the resulting nodes to the document node.
    pub fn parse(html: &str) -> Result<Self> {
        let mut doc = Self::new();
        let root = doc.document_node();
        doc.append_html(root, html)?;
        Ok(doc)
    }

    /// Parses `html` and appends the resulting top-level nodes to `parent`.
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
        parse::parse_into(self, parent, html)
    }

    /// The document node (root of the tree, not an element).
    #[inline]
    pub const fn document_node(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: SmallVec::new(),
        }))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Creates a detached node holding verbatim markup.
    pub fn create_raw(&mut self, markup: impl Into<String>) -> NodeId {
        self.push(NodeKind::Raw(markup.into()))
    }

    /// Node payload, or `None` for a handle from another document.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node.index()).map(|n| &n.kind)
    }

    /// Element payload if `node` is an element.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.kind(node) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(node.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(Element::tag)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index()).and_then(|n| n.parent)
    }

    /// Parent node if it is an element (the document node is not).
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|&p| self.is_element(p))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map_or(&[], |n| n.children.as_slice())
    }

    /// Element children only.
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    /// Removes `node` from its parent, keeping its subtree intact.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        self.nodes[parent.index()].children.retain(|&c| c != node);
        self.nodes[node.index()].parent = None;
    }

    /// Appends `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.contains(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Inserts `node` right after `reference` among its siblings.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if self.contains(node, parent) {
            return;
        }
        self.detach(node);
        let siblings = &mut self.nodes[parent.index()].children;
        let at = siblings
            .iter()
            .position(|&c| c == reference)
            .map_or(siblings.len(), |pos| pos + 1);
        siblings.insert(at, node);
        self.nodes[node.index()].parent = Some(parent);
    }

    /// Attribute value of an element.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Returns `true` if the attribute is present and equal to `value`.
    pub fn attr_is(&self, node: NodeId, name: &str, value: &str) -> bool {
        self.attr(node, name) == Some(value)
    }

    /// Sets an attribute, keeping the id index current.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "id" {
            self.unindex_id(node);
            self.ids.entry(value.clone()).or_default().push(node);
        }
        let Some(element) = self.element_mut(node) else {
            return;
        };
        if let Some(slot) = element.attrs.iter_mut().find(|(key, _)| key == name) {
            slot.1 = value;
        } else {
            element.attrs.push((name.to_owned(), value));
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if name == "id" {
            self.unindex_id(node);
        }
        if let Some(element) = self.element_mut(node) {
            element.attrs.retain(|(key, _)| key != name);
        }
    }

    fn unindex_id(&mut self, node: NodeId) {
        let Some(old) = self.attr(node, "id").map(str::to_owned) else {
            return;
        };
        if let Some(entries) = self.ids.get_mut(&old) {
            entries.retain(|&mut n| n != node);
            if entries.is_empty() {
                self.ids.remove(&old);
            }
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class))
    }

    /// Adds `class` to the class list; empty names are ignored.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if class.is_empty() || self.has_class(node, class) || !self.is_element(node) {
            return;
        }
        let value = match self.attr(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr(node, "class", value);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if class.is_empty() || !self.has_class(node, class) {
            return;
        }
        let value = self
            .element(node)
            .map(|e| e.classes().filter(|c| *c != class).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        self.set_attr(node, "class", value);
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(text)) = self.kind(node) {
            out.push_str(text);
        }
        for child in self.descendants(node) {
            if let Some(NodeKind::Text(text)) = self.kind(child) {
                out.push_str(text);
            }
        }
        out
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Ancestors of `node` from the parent upwards, excluding `node`.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |&n| self.parent(n))
    }

    /// Descendants in document (pre-)order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: SmallVec<[NodeId; 16]> = SmallVec::new();
        stack.extend(self.children(node).iter().rev().copied());
        Descendants { doc: self, stack }
    }

    /// Nearest inclusive ancestor element satisfying `pred`.
    pub fn closest(&self, node: NodeId, mut pred: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| self.is_element(n) && pred(n))
    }

    /// Nearest inclusive ancestor element matching `selector`.
    pub fn closest_matching(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.closest(node, |n| selector.matches(self, n))
    }

    /// First descendant element satisfying `pred`.
    pub fn find_descendant(
        &self,
        node: NodeId,
        mut pred: impl FnMut(NodeId) -> bool,
    ) -> Option<NodeId> {
        self.descendants(node)
            .find(|&n| self.is_element(n) && pred(n))
    }

    /// Descendant elements matching `selector`, in document order.
    pub fn query_all(&self, node: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(node)
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// First descendant element matching `selector`.
    pub fn query(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(node).find(|&n| selector.matches(self, n))
    }

    /// Returns `true` if the node is attached to the document node.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.document_node(), node)
    }

    /// First connected element carrying `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids
            .get(id)?
            .iter()
            .copied()
            .find(|&n| self.is_connected(n))
    }

    /// Currently focused element.
    pub const fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.is_element(node) {
            self.active = Some(node);
        }
    }

    pub const fn blur(&mut self) {
        self.active = None;
    }

    /// Registers a listener; registering the same triple twice is a no-op.
    pub fn add_listener(&mut self, target: ListenerTarget, kind: EventKind, owner: NodeId) {
        let listener = Listener {
            target,
            kind,
            owner,
        };
        if !self.listeners.contains(&listener) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, target: ListenerTarget, kind: EventKind, owner: NodeId) {
        self.listeners
            .retain(|l| !(l.target == target && l.kind == kind && l.owner == owner));
    }

    pub fn has_listener(&self, target: ListenerTarget, kind: EventKind, owner: NodeId) -> bool {
        self.listeners
            .iter()
            .any(|l| l.target == target && l.kind == kind && l.owner == owner)
    }

    /// Total number of installed listeners.
    pub const fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Serializes `node` and its subtree.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    /// Serializes the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_node(&mut out, child);
        }
        out
    }

    fn write_node(&self, out: &mut String, node: NodeId) {
        match self.kind(node) {
            Some(NodeKind::Document) => {
                for &child in self.children(node) {
                    self.write_node(out, child);
                }
            }
            Some(NodeKind::Element(element)) => {
                let _ = write!(out, "<{}", element.tag);
                for (key, value) in &element.attrs {
                    if value.is_empty() {
                        let _ = write!(out, " {key}");
                    } else {
                        let _ = write!(out, " {key}=\"{}\"", escape(value, true));
                    }
                }
                out.push('>');
                if parse::is_void(&element.tag) {
                    return;
                }
                for &child in self.children(node) {
                    self.write_node(out, child);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
            Some(NodeKind::Text(text)) => out.push_str(&escape(text, false)),
            Some(NodeKind::Raw(markup)) => out.push_str(markup),
            None => {}
        }
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: SmallVec<[NodeId; 16]>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}
