//! Owned page document
//!
//! `Document` is an arena of element and text nodes rooted at `<html>` with a
//! single `<body>`. Behaviors never hold references into the tree; they keep
//! `NodeId`s and pass the document by `&mut` when they need to mutate it.
//!
//! Mutations on unknown or detached ids are silent no-ops, mirroring how the
//! browser ignores writes to elements that are no longer in the page.
//!
//! `remove` releases the node and its subtree back to the arena. Slots are
//! reused by later allocations under a new generation, so an id kept past
//! its node's removal goes stale instead of aliasing the new occupant.

pub mod markup;
pub mod selector;

pub use selector::{Selector, SelectorError};

use std::fmt;

/// Handle to a node in a `Document` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => write!(f, "#{}", self.index),
            g => write!(f, "#{}v{g}", self.index),
        }
    }
}

/// Vertical box of an element in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutBox {
    pub top: f64,
    pub height: f64,
}

impl LayoutBox {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ElementData {
    tag: String,
    // insertion order is kept so serialized markup matches its source
    attrs: Vec<(String, String)>,
    style: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: LayoutBox,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    body: NodeId,
    active: Option<NodeId>,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let placeholder = NodeId {
            index: 0,
            generation: 0,
        };
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: placeholder,
            body: placeholder,
            active: None,
            viewport: Viewport::default(),
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.append_child(root, body);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// Build a document whose body holds the parsed `markup`.
    pub fn from_markup(markup: &str) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        doc.append_html(body, markup);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport.height = height.max(0.0);
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.viewport.scroll_y = scroll_y.max(0.0);
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            ..ElementData::default()
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
            layout: LayoutBox::default(),
        };
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index)
        {
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Return `id`'s slot to the free list. Its children are not touched.
    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return;
        };
        if slot.generation != id.generation || slot.node.take().is_none() {
            return;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    /// Arena slots in use or waiting for reuse.
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Nodes currently alive, attached or not.
    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    // ---- tree structure ----

    /// Append `child` to `parent`, detaching it from any previous parent.
    /// Refuses to create cycles.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Detach `node` from its parent and free it with its whole subtree.
    /// Focus inside the removed subtree is dropped.
    pub fn remove(&mut self, node: NodeId) {
        if node == self.root || node == self.body || self.node(node).is_none() {
            return;
        }
        if let Some(active) = self.active
            && self.is_inclusive_ancestor(node, active)
        {
            self.active = None;
        }
        self.detach(node);
        let mut doomed = self.descendants(node);
        doomed.push(node);
        for id in doomed {
            self.release(id);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = None;
        }
    }

    pub fn clear_children(&mut self, node: NodeId) {
        let children = self.children(node).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element children only.
    pub fn child_elements(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    /// Whether `node` is `ancestor` or lives somewhere beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.is_inclusive_ancestor(ancestor, node)
    }

    /// Whether `node` is attached to the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    /// Pre-order descendants of `node`, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    // ---- element data ----

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| {
            e.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        self.element(node).map(|e| e.attrs.as_slice()).unwrap_or(&[])
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        if let Some(slot) = el.attrs.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value.to_string();
        } else {
            el.attrs.push((name, value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn id_attr(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    pub fn classes(&self, node: NodeId) -> impl Iterator<Item = &str> {
        self.attr(node, "class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.classes(node).any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.is_element(node) || self.has_class(node, class) {
            return;
        }
        let mut list: Vec<String> = self.classes(node).map(str::to_string).collect();
        list.push(class.to_string());
        self.set_attr(node, "class", &list.join(" "));
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let list: Vec<String> = self
            .classes(node)
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        self.set_attr(node, "class", &list.join(" "));
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).and_then(|e| {
            e.style
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        if let Some(slot) = el.style.iter_mut().find(|(k, _)| k == property) {
            slot.1 = value.to_string();
        } else {
            el.style.push((property.to_string(), value.to_string()));
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.element_mut(node) {
            el.style.retain(|(k, _)| k != property);
        }
    }

    /// Raw text of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text(t) => Some(t.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    /// Concatenated text of every text node under `node`.
    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Replace the children of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            if let Some(Node {
                kind: NodeKind::Text(t),
                ..
            }) = self.node_mut(node)
            {
                *t = text.to_string();
            }
            return;
        }
        self.clear_children(node);
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(node, t);
        }
    }

    pub fn layout(&self, node: NodeId) -> LayoutBox {
        self.node(node).map(|n| n.layout).unwrap_or_default()
    }

    pub fn set_layout(&mut self, node: NodeId, layout: LayoutBox) {
        if let Some(n) = self.node_mut(node) {
            n.layout = layout;
        }
    }

    /// Whether the element or one of its ancestors carries `hidden`.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if self.has_attr(id, "hidden") {
                return true;
            }
            cur = self.parent(id);
        }
        false
    }

    // ---- markup ----

    /// Serialized markup of the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        markup::serialize_children(self, node)
    }

    /// Replace the children of `node` with parsed `html`.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) {
        if !self.is_element(node) {
            return;
        }
        self.clear_children(node);
        self.append_html(node, html);
    }

    /// Parse `html` and append the resulting nodes to `node`.
    pub fn append_html(&mut self, node: NodeId, html: &str) {
        if !self.is_element(node) {
            return;
        }
        markup::parse_into(self, node, html);
    }

    // ---- queries ----

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    /// First connected element matching `selector`, in document order.
    pub fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_selector(self.root, selector)
    }

    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_selector_all(self.root, selector)
    }

    /// Parse `selector` and return the first match.
    pub fn query_str(&self, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        Ok(self.query(&Selector::parse(selector)?))
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.id_attr(*n) == Some(id))
    }

    /// `node` itself or its nearest ancestor matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if selector.matches(self, id) {
                return Some(id);
            }
            cur = self.parent(id);
        }
        None
    }

    // ---- focus ----

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Move focus to `node`. Detached, hidden and non-element targets are
    /// ignored. Returns whether focus is now on `node`.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if !self.is_element(node) || !self.is_connected(node) || self.is_hidden(node) {
            return false;
        }
        self.active = Some(node);
        true
    }

    pub fn blur(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_remove_maintain_parent_links() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let p = doc.create_element("p");
        doc.append_child(doc.body(), div);
        doc.append_child(div, p);
        assert_eq!(doc.parent(p), Some(div));
        assert!(doc.is_connected(p));

        doc.remove(div);
        assert!(!doc.is_connected(p));
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn append_refuses_cycles() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner);
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), None);
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn class_helpers_round_trip() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.add_class(div, "modal");
        doc.add_class(div, "active");
        doc.add_class(div, "active");
        assert_eq!(doc.attr(div, "class"), Some("modal active"));
        doc.remove_class(div, "modal");
        assert_eq!(doc.attr(div, "class"), Some("active"));
        doc.toggle_class(div, "active", false);
        assert!(!doc.has_class(div, "active"));
    }

    #[test]
    fn focus_ignores_detached_and_hidden_elements() {
        let mut doc = Document::from_markup(
            r#"<div hidden><button id="a">A</button></div><button id="b">B</button>"#,
        );
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        assert!(!doc.focus(a));
        assert!(doc.focus(b));
        assert_eq!(doc.active_element(), Some(b));

        let loose = doc.create_element("button");
        assert!(!doc.focus(loose));
        assert_eq!(doc.active_element(), Some(b));
    }

    #[test]
    fn removing_focused_subtree_drops_focus() {
        let mut doc = Document::from_markup(r#"<div id="wrap"><a href="x">x</a></div>"#);
        let wrap = doc.element_by_id("wrap").unwrap();
        let link = doc.children(wrap)[0];
        doc.focus(link);
        doc.remove(wrap);
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn removed_slots_are_reused_and_old_ids_go_stale() {
        let mut doc = Document::from_markup("<div id=\"box\"><p>a</p></div>");
        let before = doc.allocated();
        let div = doc.element_by_id("box").unwrap();
        let p = doc.children(div)[0];
        doc.remove(div);
        assert_eq!(doc.live_nodes(), before - 3);
        assert_eq!(doc.tag(p), None);

        let fresh = doc.create_element("section");
        assert_eq!(doc.allocated(), before);
        assert_ne!(fresh, p);
        assert_ne!(fresh, div);
        doc.set_attr(div, "id", "ghost");
        assert_eq!(doc.attr(fresh, "id"), None);
        assert_eq!(doc.tag(fresh), Some("section"));
    }

    #[test]
    fn repeated_set_text_keeps_arena_flat() {
        let mut doc = Document::from_markup("<textarea></textarea>");
        let area = doc.child_elements(doc.body())[0];
        doc.set_text(area, "x");
        let settled = doc.allocated();
        let mut value = String::new();
        for ch in "hello world".chars().cycle().take(500) {
            value.push(ch);
            doc.set_text(area, &value);
        }
        assert_eq!(doc.allocated(), settled);
        assert_eq!(doc.text_content(area), value);
    }

    #[test]
    fn root_and_body_survive_remove() {
        let mut doc = Document::new();
        doc.remove(doc.body());
        doc.remove(doc.root());
        assert!(doc.is_connected(doc.body()));
    }

    #[test]
    fn text_content_concatenates_in_order() {
        let doc = Document::from_markup("<p>Hello <b>big</b> world</p>");
        assert_eq!(doc.text_content(doc.body()), "Hello big world");
    }

    #[test]
    fn style_set_and_remove() {
        let mut doc = Document::new();
        let body = doc.body();
        assert_eq!(doc.style(body, "overflow"), None);
        doc.set_style(body, "overflow", "hidden");
        assert_eq!(doc.style(body, "overflow"), Some("hidden"));
        doc.remove_style(body, "overflow");
        assert_eq!(doc.style(body, "overflow"), None);
    }
}
