//! Markup tree for rich-text fragments

use serde::{Deserialize, Serialize};

/// Zero-width space used as a caret anchor inside freshly styled spans
pub const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// A node in a fragment tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element(Element),
    Text { content: String },
}

/// An element with ordered attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// A parsed rich-text fragment (a forest of nodes)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text {
            content: content.into(),
        }
    }

    pub fn element(element: Element) -> Self {
        Node::Element(element)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text { .. } => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    /// Number of characters of text content under this node
    pub fn text_len(&self) -> usize {
        match self {
            Node::Text { content } => content.chars().count(),
            Node::Element(el) => el.children.iter().map(Node::text_len).sum(),
        }
    }

    /// Concatenated text content
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { content } => out.push_str(content),
            Node::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Element(el) => Some(&el.children),
            Node::Text { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(el) => Some(&mut el.children),
            Node::Text { .. } => None,
        }
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_style(mut self, property: &str, value: &str) -> Self {
        self.set_style(property, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// A childless copy of this element (tag and attributes only)
    pub fn shell(&self) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    /// Parsed `style` attribute as ordered (property, value) pairs
    pub fn styles(&self) -> Vec<(String, String)> {
        self.attribute("style").map(parse_style).unwrap_or_default()
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.styles()
            .into_iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v)
    }

    pub fn set_style(&mut self, property: &str, value: &str) {
        let mut styles = self.styles();
        match styles.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => styles.push((property.to_string(), value.to_string())),
        }
        self.set_attribute("style", format_style(&styles));
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub fn is_block(&self) -> bool {
        is_block_tag(&self.tag)
    }

    pub fn is_inline_formatting(&self) -> bool {
        is_inline_formatting_tag(&self.tag)
    }
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn text_len(&self) -> usize {
        self.nodes.iter().map(Node::text_len).sum()
    }

    pub fn text_content(&self) -> String {
        self.nodes.iter().map(Node::text_content).collect()
    }
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let prop = prop.trim();
            let value = value.trim();
            if prop.is_empty() {
                None
            } else {
                Some((prop.to_ascii_lowercase(), value.to_string()))
            }
        })
        .collect()
}

fn format_style(styles: &[(String, String)]) -> String {
    styles
        .iter()
        .map(|(k, v)| format!("{}: {};", k, v))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "br" | "hr" | "input" | "meta" | "link" | "col" | "wbr" | "source" | "area"
    )
}

pub fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "li"
            | "blockquote"
            | "td"
            | "th"
            | "pre"
    )
}

/// Inline wrappers that carry only formatting and may be pruned when empty
pub fn is_inline_formatting_tag(tag: &str) -> bool {
    matches!(
        tag,
        "span" | "b" | "strong" | "i" | "em" | "u" | "s" | "strike" | "font"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_roundtrip() {
        let mut el = Element::new("span").with_style("font-size", "12pt");
        el.set_style("color", "#ff0000");
        el.set_style("font-size", "14pt");

        assert_eq!(el.style("font-size").as_deref(), Some("14pt"));
        assert_eq!(
            el.attribute("style"),
            Some("font-size: 14pt; color: #ff0000;")
        );
    }

    #[test]
    fn test_text_len_counts_chars() {
        let node = Node::element(
            Element::new("b").with_children(vec![Node::text("héllo"), Node::text("!")]),
        );
        assert_eq!(node.text_len(), 6);
        assert_eq!(node.text_content(), "héllo!");
    }

    #[test]
    fn test_node_serializes_tagged() {
        let json = serde_json::to_string(&Node::text("a")).unwrap();
        assert_eq!(json, r#"{"type":"text","content":"a"}"#);
    }
}
