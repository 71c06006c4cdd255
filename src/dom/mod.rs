//! In-memory document model.
//!
//! The page runtime never talks to a browser directly; it manipulates this
//! tree, which carries the same contract the page markup relies on: element
//! kind, id, classes, attributes, inline style, content and parent links.
//!
//! # Architecture
//!
//! - `element`: a single element and its class/attribute/style API; content
//!   that spans children is read and written through `Document`
//! - `selector`: the CSS selector subset used to find elements
//! - `markup`: stripping markup to plain text and escaping text
//! - `page`: JSON page fixtures in, JSON snapshots out

mod element;
pub mod markup;
mod page;
mod selector;

pub use element::{Content, Element, ElementKind};
pub use page::{FixtureError, NodeSnapshot, NodeSpec, PageSnapshot, PageSpec};
pub use selector::{Selector, SelectorError};

use markup::escape_attribute;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Handle to an element in a [`Document`]. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// How a scroll request should animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

/// Vertical alignment of the scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

/// A recorded `scrollIntoView` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScrollRequest {
    pub target: NodeId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Element>>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    title: String,
    scroll_requests: Vec<ScrollRequest>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty `<html>` document with `<head>` and `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            title: String::new(),
            scroll_requests: Vec::new(),
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    // ==================== Tree ====================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Element::new(tag)));
        id
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Returns `false` if either handle is stale or the
    /// move would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            return false;
        }
        self.detach(child);
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
        true
    }

    /// Remove `node` and its subtree from the document. Handles to removed
    /// elements stay invalid.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.root || self.get(node).is_none() {
            return false;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(el) = self.nodes.get_mut(id.0).and_then(Option::take) {
                stack.extend(el.children);
            }
        }
        true
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_ancestor_or_self(self.root, node)
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Element::parent);
        }
        false
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.get_mut(node).and_then(|el| el.parent.take());
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|c| *c != node);
        }
    }

    /// Attached elements in document (pre-)order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(el) = self.get(id) {
                order.push(id);
                stack.extend(el.children.iter().rev().copied());
            }
        }
        order
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors_inclusive(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.get(node).map(|_| node);
        while let Some(id) = current {
            chain.push(id);
            current = self.get(id).and_then(Element::parent);
        }
        chain
    }

    // ==================== Content ====================

    /// Text of `node` and all of its descendants, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(node, &mut text);
        text
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Some(el) = self.get(node) {
            out.push_str(&el.own_text());
            for child in &el.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Markup of everything inside `node`: its own content followed by its
    /// serialized children.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut html = String::new();
        if let Some(el) = self.get(node) {
            html.push_str(&el.own_html());
            for child in &el.children {
                self.write_outer_html(*child, &mut html);
            }
        }
        html
    }

    fn write_outer_html(&self, node: NodeId, out: &mut String) {
        let Some(el) = self.get(node) else {
            return;
        };
        out.push('<');
        out.push_str(el.tag());
        if !el.classes().is_empty() {
            out.push_str(&format!(r#" class="{}""#, escape_attribute(&el.classes().join(" "))));
        }
        for (name, value) in el.attributes() {
            out.push_str(&format!(r#" {}="{}""#, name, escape_attribute(value)));
        }
        if !el.styles().is_empty() {
            let style: Vec<String> = el
                .styles()
                .iter()
                .map(|(property, value)| format!("{}: {}", property, value))
                .collect();
            out.push_str(&format!(r#" style="{}""#, escape_attribute(&style.join("; "))));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&el.tag()) {
            return;
        }
        out.push_str(&el.own_html());
        for child in &el.children {
            self.write_outer_html(*child, out);
        }
        out.push_str(&format!("</{}>", el.tag()));
    }

    /// Replace everything inside `node` with literal text. Child elements
    /// are removed from the document.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> bool {
        self.replace_content(node, Content::Text(text.to_string()))
    }

    /// Replace everything inside `node` with a markup fragment. Child
    /// elements are removed from the document.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) -> bool {
        self.replace_content(node, Content::Markup(html.to_string()))
    }

    /// Replace everything inside `node` with `content`.
    pub fn replace_content(&mut self, node: NodeId, content: Content) -> bool {
        let Some(children) = self.get(node).map(|el| el.children.clone()) else {
            return false;
        };
        for child in children {
            self.remove(child);
        }
        if let Some(el) = self.get_mut(node) {
            el.set_content(content);
        }
        true
    }

    /// Everything inside `node` as a single [`Content`] value that
    /// [`replace_content`](Self::replace_content) can put back.
    pub fn content_snapshot(&self, node: NodeId) -> Option<Content> {
        let el = self.get(node)?;
        if el.children.is_empty() {
            Some(el.content().clone())
        } else {
            Some(Content::Markup(self.inner_html(node)))
        }
    }

    // ==================== Queries ====================

    /// All attached elements matching `selector`, in document order.
    ///
    /// An invalid selector matches nothing.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select(&parsed),
            Err(e) => {
                debug!("Ignoring invalid selector: {}", e);
                Vec::new()
            }
        }
    }

    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|el| selector.matches(el)))
            .collect()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants()
            .into_iter()
            .find(|node| self.get(*node).and_then(Element::id) == Some(id))
    }

    // ==================== Scrolling ====================

    /// Record a request to scroll `target` into view.
    pub fn scroll_into_view(&mut self, target: NodeId, behavior: ScrollBehavior, block: ScrollBlock) {
        self.scroll_requests.push(ScrollRequest {
            target,
            behavior,
            block,
        });
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.scroll_requests
    }
}

/// A document shared between event handlers and timer tasks.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<Document>>);

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self(Arc::new(Mutex::new(document)))
    }

    /// Lock the document. A poisoned lock is recovered: the tree holds no
    /// invariants a panicking handler could leave half-applied.
    pub fn lock(&self) -> MutexGuard<'_, Document> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
