//! Host Document - The node tree components render into.
//!
//! A small DOM: elements (tag, classes, attributes, animation property, event
//! listeners) and text nodes, stored in an arena and addressed by [`NodeId`].
//! The terminal renderer reads it; fragments and transitions write it.
//!
//! # Handles
//!
//! Components hold a [`Dom`] (shared handle). Every operation borrows the
//! document for its own duration only, so listeners and transition ticks can
//! freely call back into it.
//!
//! Detaching a node frees its whole subtree. Ids are never reused, and every
//! operation on a freed id is a no-op, so late transition ticks on removed
//! nodes are harmless.

mod stylesheet;

pub use stylesheet::StyleSheet;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::runtime::Cleanup;

/// Arena index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementData {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    /// Inline `animation` style property.
    pub animation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

struct Listener {
    id: u64,
    event: String,
    handler: Rc<dyn Fn()>,
}

struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
}

/// The node arena plus its stylesheet.
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    stylesheet: StyleSheet,
    next_listener: u64,
    revision: u64,
}

impl Document {
    fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            stylesheet: StyleSheet::default(),
            next_listener: 0,
            revision: 0,
        };
        doc.root = doc.alloc(NodeKind::Element(ElementData {
            tag: "body".into(),
            ..ElementData::default()
        }));
        doc
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|node| node.parent);
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        for child in node.children {
            self.free_subtree(child);
        }
    }

    // =========================================================================
    // Read access (used by the renderer)
    // =========================================================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn has_listener(&self, id: NodeId, event: &str) -> bool {
        self.node(id)
            .is_some_and(|node| node.listeners.iter().any(|l| l.event == event))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(data)) => out.push_str(data),
            Some(NodeKind::Element(_)) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            None => {}
        }
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    /// Incremented on every mutation; the renderer repaints when it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Shared handle to a [`Document`].
#[derive(Clone)]
pub struct Dom(Rc<RefCell<Document>>);

impl Dom {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Document::new())))
    }

    /// Borrow the document for reading.
    pub fn read<R>(&self, read: impl FnOnce(&Document) -> R) -> R {
        read(&self.0.borrow())
    }

    pub fn ptr_eq(&self, other: &Dom) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn root(&self) -> NodeId {
        self.0.borrow().root
    }

    /// Arena slots ever allocated, live or freed.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.0.borrow().nodes.len()
    }

    pub fn revision(&self) -> u64 {
        self.0.borrow().revision
    }

    // =========================================================================
    // Node constructors
    // =========================================================================

    pub fn element(&self, tag: &str) -> NodeId {
        let mut doc = self.0.borrow_mut();
        doc.touch();
        doc.alloc(NodeKind::Element(ElementData {
            tag: tag.to_string(),
            ..ElementData::default()
        }))
    }

    pub fn text(&self, data: &str) -> NodeId {
        let mut doc = self.0.borrow_mut();
        doc.touch();
        doc.alloc(NodeKind::Text(data.to_string()))
    }

    pub fn space(&self) -> NodeId {
        self.text(" ")
    }

    /// Empty text node, used as a stable anchor.
    pub fn empty(&self) -> NodeId {
        self.text("")
    }

    // =========================================================================
    // Tree operations
    // =========================================================================

    pub fn append(&self, target: NodeId, node: NodeId) {
        self.insert(target, node, None);
    }

    /// Insert `node` into `target` before `anchor` (or at the end).
    pub fn insert(&self, target: NodeId, node: NodeId, anchor: Option<NodeId>) {
        let mut doc = self.0.borrow_mut();
        if !doc.contains(target) || !doc.contains(node) || target == node {
            return;
        }
        doc.unlink(node);
        let Some(parent) = doc.node_mut(target) else { return };
        let position = anchor
            .and_then(|anchor| parent.children.iter().position(|child| *child == anchor))
            .unwrap_or(parent.children.len());
        parent.children.insert(position, node);
        if let Some(child) = doc.node_mut(node) {
            child.parent = Some(target);
        }
        doc.touch();
    }

    /// Remove a node from its parent and free it with its subtree.
    pub fn detach(&self, node: NodeId) {
        let mut doc = self.0.borrow_mut();
        if node == doc.root || !doc.contains(node) {
            return;
        }
        doc.unlink(node);
        doc.free_subtree(node);
        doc.touch();
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0.borrow().contains(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.0.borrow().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.0.borrow().children(node).to_vec()
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.0.borrow().kind(node), Some(NodeKind::Text(_)))
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Update a text node; no-op when the data is unchanged.
    pub fn set_data(&self, node: NodeId, data: &str) {
        let mut doc = self.0.borrow_mut();
        let Some(Node {
            kind: NodeKind::Text(current),
            ..
        }) = doc.node_mut(node)
        else {
            return;
        };
        if current != data {
            *current = data.to_string();
            doc.touch();
        }
    }

    pub fn data(&self, node: NodeId) -> Option<String> {
        match self.0.borrow().kind(node) {
            Some(NodeKind::Text(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.0.borrow().text_content(node)
    }

    /// Replace all children with a single text node (none for `""`).
    ///
    /// A lone text child is updated in place.
    pub fn set_text_content(&self, node: NodeId, text: &str) {
        let children = {
            let doc = self.0.borrow();
            if doc.element(node).is_none() {
                return;
            }
            doc.children(node).to_vec()
        };
        if let ([only], false) = (children.as_slice(), text.is_empty()) {
            if self.is_text(*only) {
                self.set_data(*only, text);
                return;
            }
        }
        for child in children {
            self.detach(child);
        }
        if !text.is_empty() {
            let child = self.text(text);
            self.append(node, child);
        }
        self.0.borrow_mut().touch();
    }

    /// Set or remove an attribute.
    pub fn attr(&self, node: NodeId, name: &str, value: Option<&str>) {
        let mut doc = self.0.borrow_mut();
        let Some(element) = doc.element_mut(node) else { return };
        let changed = match value {
            None => element.attrs.remove(name).is_some(),
            Some(value) if element.attrs.get(name).map(String::as_str) != Some(value) => {
                element.attrs.insert(name.to_string(), value.to_string());
                true
            }
            Some(_) => false,
        };
        if changed {
            doc.touch();
        }
    }

    pub fn get_attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.0
            .borrow()
            .element(node)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    pub fn toggle_class(&self, node: NodeId, class: &str, on: bool) {
        let mut doc = self.0.borrow_mut();
        let Some(element) = doc.element_mut(node) else { return };
        let present = element.classes.iter().any(|c| c == class);
        if on && !present {
            element.classes.push(class.to_string());
        } else if !on && present {
            element.classes.retain(|c| c != class);
        } else {
            return;
        }
        doc.touch();
    }

    pub fn add_class(&self, node: NodeId, class: &str) {
        self.toggle_class(node, class, true);
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.0
            .borrow()
            .element(node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    // =========================================================================
    // Animation property and stylesheet
    // =========================================================================

    pub fn animation(&self, node: NodeId) -> String {
        self.0
            .borrow()
            .element(node)
            .map(|element| element.animation.clone())
            .unwrap_or_default()
    }

    pub fn set_animation(&self, node: NodeId, animation: &str) {
        let mut doc = self.0.borrow_mut();
        let Some(element) = doc.element_mut(node) else { return };
        if element.animation != animation {
            element.animation = animation.to_string();
            doc.touch();
        }
    }

    /// Register `@keyframes name rule` unless a rule with that name exists.
    ///
    /// Returns true if a rule was inserted.
    pub fn insert_keyframes(&self, name: &str, rule: &str) -> bool {
        self.0.borrow_mut().stylesheet.insert_keyframes(name, rule)
    }

    pub fn rule_count(&self) -> usize {
        self.0.borrow().stylesheet.len()
    }

    pub fn clear_stylesheet(&self) {
        self.0.borrow_mut().stylesheet.clear();
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Attach an event listener. The returned cleanup removes it.
    pub fn listen(&self, node: NodeId, event: &str, handler: impl Fn() + 'static) -> Cleanup {
        let id = {
            let mut doc = self.0.borrow_mut();
            let id = doc.next_listener;
            doc.next_listener += 1;
            if let Some(target) = doc.node_mut(node) {
                target.listeners.push(Listener {
                    id,
                    event: event.to_string(),
                    handler: Rc::new(handler),
                });
            }
            id
        };

        let doc = Rc::downgrade(&self.0);
        Box::new(move || {
            let Some(doc) = doc.upgrade() else { return };
            if let Some(target) = doc.borrow_mut().node_mut(node) {
                target.listeners.retain(|listener| listener.id != id);
            }
        })
    }

    /// Invoke the node's listeners for `event`. Returns how many ran.
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        let handlers: Vec<Rc<dyn Fn()>> = self
            .0
            .borrow()
            .node(node)
            .map(|target| {
                target
                    .listeners
                    .iter()
                    .filter(|listener| listener.event == event)
                    .map(|listener| listener.handler.clone())
                    .collect()
            })
            .unwrap_or_default();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// All elements with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let doc = self.0.borrow();
        let mut found = Vec::new();
        let mut stack = vec![doc.root];
        while let Some(id) = stack.pop() {
            if doc.element(id).is_some_and(|element| element.tag == tag) {
                found.push(id);
            }
            stack.extend(doc.children(id).iter().rev().copied());
        }
        found
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let doc = self.0.borrow();
        f.debug_struct("Dom")
            .field("nodes", &doc.nodes.iter().filter(|n| n.is_some()).count())
            .field("rules", &doc.stylesheet.len())
            .field("revision", &doc.revision)
            .finish()
    }
}
