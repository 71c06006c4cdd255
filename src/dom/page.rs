//! Page fixtures (JSON in) and document snapshots (JSON out).

use super::{Content, Document, Element, NodeId, ScrollRequest};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("invalid page JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("element at {path} has an empty tag")]
    EmptyTag { path: String },

    #[error("element <{tag}> at {path} sets both text and html")]
    AmbiguousContent { tag: String, path: String },
}

/// Description of a page to load into a [`Document`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub head: Vec<NodeSpec>,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl PageSpec {
    /// Parse and validate a page description.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let page: PageSpec = serde_json::from_str(json)?;
        for (i, node) in page.head.iter().enumerate() {
            node.validate(&format!("head[{}]", i))?;
        }
        for (i, node) in page.body.iter().enumerate() {
            node.validate(&format!("body[{}]", i))?;
        }
        Ok(page)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page file {}", path.display()))?;
        let page = Self::from_json(&json)
            .with_context(|| format!("Failed to load page file {}", path.display()))?;
        Ok(page)
    }

    /// Build a fresh document from this description.
    pub fn build(&self) -> Document {
        let mut doc = Document::new();
        doc.set_title(&self.title);
        let (head, body) = (doc.head(), doc.body());
        for node in &self.head {
            node.build_into(&mut doc, head);
        }
        for node in &self.body {
            node.build_into(&mut doc, body);
        }
        doc
    }
}

impl NodeSpec {
    fn validate(&self, path: &str) -> Result<(), FixtureError> {
        if self.tag.trim().is_empty() {
            return Err(FixtureError::EmptyTag {
                path: path.to_string(),
            });
        }
        if self.text.is_some() && self.html.is_some() {
            return Err(FixtureError::AmbiguousContent {
                tag: self.tag.clone(),
                path: path.to_string(),
            });
        }
        for (i, child) in self.children.iter().enumerate() {
            child.validate(&format!("{}.children[{}]", path, i))?;
        }
        Ok(())
    }

    fn build_into(&self, doc: &mut Document, parent: NodeId) {
        let node = doc.create_element(self.tag.trim());
        if let Some(el) = doc.get_mut(node) {
            for (name, value) in &self.attrs {
                el.set_attribute(name, value);
            }
            if let Some(id) = &self.id {
                el.set_attribute("id", id);
            }
            if let Some(class) = &self.class {
                el.set_class_name(class);
            }
        }
        if let Some(text) = &self.text {
            doc.set_text_content(node, text);
        } else if let Some(html) = &self.html {
            doc.set_inner_html(node, html);
        }
        doc.append_child(parent, node);
        for child in &self.children {
            child.build_into(doc, node);
        }
    }
}

/// Serializable view of a document, as printed by the preview binary.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub title: String,
    pub head: Vec<NodeSnapshot>,
    pub body: Vec<NodeSnapshot>,
    pub scroll_requests: Vec<ScrollRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub node: NodeId,
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl PageSnapshot {
    pub fn capture(doc: &Document) -> Self {
        Self {
            title: doc.title().to_string(),
            head: children_of(doc, doc.head()),
            body: children_of(doc, doc.body()),
            scroll_requests: doc.scroll_requests().to_vec(),
        }
    }
}

fn children_of(doc: &Document, parent: NodeId) -> Vec<NodeSnapshot> {
    doc.get(parent)
        .map(|el| {
            el.children()
                .iter()
                .filter_map(|child| snapshot_node(doc, *child))
                .collect()
        })
        .unwrap_or_default()
}

fn snapshot_node(doc: &Document, node: NodeId) -> Option<NodeSnapshot> {
    let el: &Element = doc.get(node)?;
    let (text, html) = match el.content() {
        Content::Text(t) if t.is_empty() => (None, None),
        Content::Text(t) => (Some(t.clone()), None),
        Content::Markup(m) => (None, Some(m.clone())),
    };
    Some(NodeSnapshot {
        node,
        tag: el.tag().to_string(),
        classes: el.classes().to_vec(),
        attrs: el.attributes().clone(),
        style: el.styles().clone(),
        text,
        html,
        children: children_of(doc, node),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"{
        "title": "Test page",
        "body": [
            { "tag": "nav", "children": [
                { "tag": "button", "id": "langBn", "class": "lang-btn active", "text": "বাংলা" },
                { "tag": "button", "id": "langEn", "class": "lang-btn", "text": "English" }
            ]},
            { "tag": "h1", "class": "bilingual",
              "attrs": { "data-bn": "স্বাগতম", "data-en": "Welcome" },
              "text": "স্বাগতম" },
            { "tag": "a", "class": "copy-btn", "attrs": { "href": "#" },
              "html": "<i class=\"fas fa-copy\"></i> Copy" }
        ]
    }"##;

    #[test]
    fn test_build_page() {
        let page = PageSpec::from_json(PAGE).expect("valid page");
        let doc = page.build();

        assert_eq!(doc.title(), "Test page");
        let en = doc.get_element_by_id("langEn").unwrap();
        assert!(doc.get(en).unwrap().has_class("lang-btn"));

        let heading = doc.query_selector(".bilingual").unwrap();
        assert_eq!(doc.get(heading).unwrap().attribute("data-en"), Some("Welcome"));

        let copy = doc.query_selector(".copy-btn").unwrap();
        assert_eq!(
            doc.get(copy).unwrap().content(),
            &Content::Markup(r#"<i class="fas fa-copy"></i> Copy"#.to_string())
        );
    }

    #[test]
    fn test_rejects_empty_tag() {
        let err = PageSpec::from_json(r#"{ "body": [ { "tag": "div", "children": [ { "tag": " " } ] } ] }"#)
            .unwrap_err();
        assert!(matches!(err, FixtureError::EmptyTag { ref path } if path == "body[0].children[0]"));
    }

    #[test]
    fn test_rejects_text_and_html() {
        let err = PageSpec::from_json(r#"{ "body": [ { "tag": "p", "text": "a", "html": "<b>a</b>" } ] }"#)
            .unwrap_err();
        assert!(matches!(err, FixtureError::AmbiguousContent { .. }));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            PageSpec::from_json("{ not json"),
            Err(FixtureError::Json(_))
        ));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = PageSpec::load("/nonexistent/page.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read page file"));
    }

    #[test]
    fn test_snapshot_serializes_tree() {
        let doc = PageSpec::from_json(PAGE).unwrap().build();
        let snapshot = PageSnapshot::capture(&doc);
        assert_eq!(snapshot.body.len(), 3);
        assert_eq!(snapshot.body[0].children.len(), 2);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["title"], "Test page");
        assert_eq!(json["body"][1]["text"], "স্বাগতম");
        assert!(json["body"][0].get("text").is_none());
    }
}
