//! HTML parsing support.
//!
//! Parses an HTML string with `scraper` (html5ever underneath) and copies the
//! result into the arena [`Document`] used by the rewriting passes. The parser
//! is error tolerant: unclosed tags, unknown tags and stray text all end up in
//! the tree somewhere, and parsing never fails.

use scraper::{Html, Node as ScraperNode};

use crate::node::{Document, NodeId};
use crate::rules::{classify, TagRule};

/// Parse an HTML fragment into a [`Document`].
///
/// Comments, doctypes and processing instructions are dropped. `<br>` becomes
/// a line break marker.
///
/// # Example
///
/// ```rust
/// use telepost::parse_html;
///
/// let doc = parse_html("<p>Hello <em>World</em></p>");
/// assert_eq!(doc.text_content(doc.root()), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Document {
    let fragment = Html::parse_fragment(html);
    let mut doc = Document::new();
    let root = doc.root();
    // parse_fragment wraps everything in a synthetic <html> element
    let mut stack: Vec<_> = fragment
        .root_element()
        .children()
        .rev()
        .map(|child| (child, root))
        .collect();

    // Depth-first with an explicit stack: nesting depth is unbounded.
    while let Some((node, parent)) = stack.pop() {
        match node.value() {
            ScraperNode::Text(text) => {
                let id = doc.create_text(&text.text);
                doc.append(parent, id);
            }
            ScraperNode::Element(el) => {
                if classify(el.name()) == Some(TagRule::LineBreak) {
                    let id = doc.create_line_break();
                    doc.append(parent, id);
                    continue;
                }
                let id = doc.create_element_with_attrs(el.name(), el.attrs());
                doc.append(parent, id);
                stack.extend(node.children().rev().map(|child| (child, id)));
            }
            _ => {}
        }
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    #[test]
    fn test_parse_simple_html() {
        let doc = parse_html("<p>Hello World</p>");
        let children = doc.children(doc.root());
        assert_eq!(children.len(), 1);
        assert!(doc.is_tag(children[0], "p"));
        assert_eq!(doc.text_content(children[0]), "Hello World");
    }

    #[test]
    fn test_parse_empty() {
        let doc = parse_html("");
        assert!(doc.children(doc.root()).is_empty());
    }

    #[test]
    fn test_unclosed_and_unknown_tags_are_kept() {
        let doc = parse_html("<div><blink>odd<b>bold");
        assert_eq!(doc.text_content(doc.root()), "oddbold");
        let tags: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .filter_map(|id| doc.tag_name(id).map(str::to_string))
            .collect();
        assert_eq!(tags, vec!["div", "blink", "b"]);
    }

    #[test]
    fn test_br_becomes_line_break() {
        let doc = parse_html("a<br>b<br/>");
        let kinds: Vec<_> = doc
            .children(doc.root())
            .iter()
            .map(|&id| doc.kind(id).clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Text("a".into()),
                NodeKind::LineBreak,
                NodeKind::Text("b".into()),
                NodeKind::LineBreak,
            ]
        );
    }

    #[test]
    fn test_attributes_and_entities() {
        let doc = parse_html(r#"<a href="https://example.com/?a=1&amp;b=2" title="T">x &lt; y</a>"#);
        let a = doc.children(doc.root())[0];
        assert_eq!(doc.attr(a, "href"), Some("https://example.com/?a=1&b=2"));
        assert_eq!(doc.attr(a, "title"), Some("T"));
        assert_eq!(doc.text_content(a), "x < y");
    }

    #[test]
    fn test_children_keep_document_order() {
        let doc = parse_html("<div>a<b>b</b>c</div>d");
        assert_eq!(doc.text_content(doc.root()), "abcd");
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.children(div).len(), 3);
    }

    #[test]
    fn test_deep_nesting() {
        let html = format!("{}x", "<span>".repeat(50_000));
        let doc = parse_html(&html);
        assert_eq!(doc.descendants(doc.root()).len(), 50_001);
        assert_eq!(doc.text_content(doc.root()), "x");
    }

    #[test]
    fn test_comments_dropped() {
        let doc = parse_html("a<!-- hidden -->b");
        assert_eq!(doc.text_content(doc.root()), "ab");
    }
}
