use super::markup::{escape_text, strip_markup};
use super::NodeId;
use std::collections::BTreeMap;

/// Element role as far as bilingual rendering is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<input>`
    Input,
    /// `<textarea>`
    TextArea,
    /// `<button>`
    Button,
    /// `<a>`
    Link,
    /// Anything else
    Other,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "input" => ElementKind::Input,
            "textarea" => ElementKind::TextArea,
            "button" => ElementKind::Button,
            "a" => ElementKind::Link,
            _ => ElementKind::Other,
        }
    }
}

/// The element's own inline content.
///
/// `Text` is literal text; `Markup` is a fragment that may carry inline tags
/// (icons, emphasis) and is rendered as markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Markup(String),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    kind: ElementKind,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    content: Content,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        Self {
            kind: ElementKind::from_tag(&tag),
            tag,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            content: Content::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    // ==================== Classes ====================

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Add `class` when `present` is true, remove it otherwise.
    pub fn toggle_class(&mut self, class: &str, present: bool) {
        if present {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Replace the class list from a whitespace separated string.
    pub fn set_class_name(&mut self, class_name: &str) {
        self.classes.clear();
        for class in class_name.split_whitespace() {
            self.add_class(class);
        }
    }

    // ==================== Attributes ====================

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "class" {
            self.set_class_name(value);
        } else {
            self.attributes.insert(name, value.to_string());
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn placeholder(&self) -> Option<&str> {
        self.attribute("placeholder")
    }

    pub fn set_placeholder(&mut self, text: &str) {
        self.set_attribute("placeholder", text);
    }

    // ==================== Inline style ====================

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.style
    }

    /// Set an inline style property. An empty value clears the property.
    pub fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.style.remove(property);
        } else {
            self.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn remove_style(&mut self, property: &str) {
        self.style.remove(property);
    }

    // ==================== Content ====================

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Replace the element's own content. Children are left in place; the
    /// document's content setters replace both.
    pub(super) fn set_content(&mut self, content: Content) {
        self.content = content;
    }

    /// Text of the element's own content, children excluded.
    pub(super) fn own_text(&self) -> String {
        match &self.content {
            Content::Text(text) => text.clone(),
            Content::Markup(markup) => strip_markup(markup),
        }
    }

    /// The element's own content as markup, children excluded. Literal text
    /// is escaped.
    pub(super) fn own_html(&self) -> String {
        match &self.content {
            Content::Text(text) => escape_text(text),
            Content::Markup(markup) => markup.clone(),
        }
    }
}
