//! Tolerant tree builder for fragment markup
//!
//! Editable surfaces can hand back markup with stray or mismatched tags.
//! The builder repairs rather than rejects:
//! - a close tag with no matching open element is dropped
//! - a close tag for an outer element implicitly closes the inner ones
//! - unclosed elements are closed at end of input
//! - comments are discarded

use crate::ast::{is_void_tag, Element, Fragment, Node};
use crate::lexer::{lex, tag_name, Token};
use tracing::trace;

/// Parse fragment markup into a tree. Never fails.
pub fn parse(source: &str) -> Fragment {
    let mut builder = TreeBuilder::default();

    for spanned in lex(source) {
        match spanned.token {
            Token::OpenTag(slice) => builder.open(slice),
            Token::CloseTag(slice) => builder.close(&tag_name(slice)),
            Token::Text(text) => builder.text(&decode_entities(text)),
            Token::Lt => builder.text("<"),
            Token::Comment(_) => {}
        }
    }

    Fragment::new(builder.finish())
}

#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn children(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(el) => &mut el.children,
            None => &mut self.root,
        }
    }

    fn open(&mut self, slice: &str) {
        let (element, self_closing) = parse_open_tag(slice);
        if self_closing || is_void_tag(&element.tag) {
            self.children().push(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn close(&mut self, name: &str) {
        if !self.stack.iter().any(|el| el.tag == name) {
            trace!(tag = %name, "dropping unmatched close tag");
            return;
        }
        while let Some(el) = self.stack.pop() {
            let done = el.tag == name;
            self.children().push(Node::Element(el));
            if done {
                break;
            }
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let children = self.children();
        if let Some(Node::Text { content }) = children.last_mut() {
            content.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while let Some(el) = self.stack.pop() {
            self.children().push(Node::Element(el));
        }
        self.root
    }
}

/// Parse `<tag a="b" c='d' e=f g>` into an element shell
fn parse_open_tag(slice: &str) -> (Element, bool) {
    let inner = slice.trim_start_matches('<').trim_end_matches('>');
    let self_closing = inner.trim_end().ends_with('/');
    let inner = inner.trim_end().trim_end_matches('/');

    let name_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(inner.len());
    let mut element = Element::new(inner[..name_len].to_ascii_lowercase());

    let chars: Vec<char> = inner[name_len..].chars().collect();
    let mut i = 0;
    while i < chars.len() {
        while i < chars.len() && (chars[i].is_whitespace() || chars[i] == '/') {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '=' {
            i += 1;
        }
        let name: String = chars[start..i].iter().collect::<String>().to_ascii_lowercase();

        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }

        let mut value = String::new();
        if i < chars.len() && chars[i] == '=' {
            i += 1;
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let quote = chars[i];
                i += 1;
                let vstart = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
                i += 1;
            } else {
                let vstart = i;
                while i < chars.len() && !chars[i].is_whitespace() {
                    i += 1;
                }
                value = chars[vstart..i].iter().collect();
            }
        }

        if !name.is_empty() {
            element.set_attribute(name, decode_entities(&value));
        }
    }

    (element, self_closing)
}

/// Decode the character references a content-editable surface emits
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        match candidate.find(';').filter(|&semi| semi <= 10) {
            Some(semi) => match decode_reference(&candidate[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &candidate[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &candidate[1..];
                }
            },
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested() {
        let fragment = parse("<p>Hello <b>world</b></p>");
        assert_eq!(fragment.nodes.len(), 1);
        let p = fragment.nodes[0].as_element().unwrap();
        assert_eq!(p.tag, "p");
        assert_eq!(p.children.len(), 2);
        assert_eq!(fragment.text_content(), "Hello world");
    }

    #[test]
    fn test_parse_attributes() {
        let fragment = parse(r#"<span style="font-size: 12pt" data-x='1' hidden>x</span>"#);
        let span = fragment.nodes[0].as_element().unwrap();
        assert_eq!(span.attribute("style"), Some("font-size: 12pt"));
        assert_eq!(span.attribute("data-x"), Some("1"));
        assert_eq!(span.attribute("hidden"), Some(""));
    }

    #[test]
    fn test_parse_void_and_self_closing() {
        let fragment = parse(r#"a<br>b<img src="x.png"/>c"#);
        assert_eq!(fragment.nodes.len(), 5);
        assert_eq!(fragment.text_content(), "abc");
    }

    #[test]
    fn test_stray_close_is_dropped() {
        let fragment = parse("a</b>c");
        assert_eq!(fragment.nodes, vec![Node::text("ac")]);
    }

    #[test]
    fn test_mismatched_close_repairs() {
        let fragment = parse("<b><i>x</b>y");
        let b = fragment.nodes[0].as_element().unwrap();
        assert_eq!(b.tag, "b");
        assert_eq!(b.children[0].as_element().unwrap().tag, "i");
        assert_eq!(fragment.nodes[1], Node::text("y"));
    }

    #[test]
    fn test_unclosed_elements_are_closed() {
        let fragment = parse("<p>open");
        assert_eq!(fragment.nodes.len(), 1);
        assert_eq!(fragment.text_content(), "open");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt;"), "a & b <c>");
        assert_eq!(decode_entities("&#65;&#x42;&nbsp;"), "AB\u{a0}");
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }
}
