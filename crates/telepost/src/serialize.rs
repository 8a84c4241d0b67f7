//! Document serialization.
//!
//! Writes a rewritten [`Document`] out as Telegram HTML and applies the final
//! whitespace normalization.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::{Document, NodeId, NodeKind};
use crate::utilities::{escape_attr, escape_text};

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"));

/// Serialize the children of the document root and normalize whitespace.
pub fn serialize(doc: &Document) -> String {
    let mut output = String::new();
    let mut stack: Vec<Step> = Vec::new();
    push_children(doc, doc.root(), &mut stack);

    while let Some(step) = stack.pop() {
        match step {
            Step::Open(id) => match doc.kind(id) {
                NodeKind::Text(text) => output.push_str(&escape_text(text)),
                NodeKind::LineBreak => output.push('\n'),
                NodeKind::Root => push_children(doc, id, &mut stack),
                NodeKind::Element { name, attrs } => {
                    output.push('<');
                    output.push_str(name);
                    for (key, value) in attrs {
                        output.push(' ');
                        output.push_str(key);
                        output.push_str("=\"");
                        output.push_str(&escape_attr(value));
                        output.push('"');
                    }
                    output.push('>');
                    stack.push(Step::Close {
                        name: name.as_str(),
                        start: output.len(),
                    });
                    push_children(doc, id, &mut stack);
                }
            },
            Step::Close { name, start } => close_element(&mut output, name, start),
        }
    }
    post_process(&output)
}

enum Step<'a> {
    Open(NodeId),
    /// `start` is where the element's content begins in the output.
    Close { name: &'a str, start: usize },
}

/// Queue the children of `id` so they pop in document order.
fn push_children<'a>(doc: &'a Document, id: NodeId, stack: &mut Vec<Step<'a>>) {
    stack.extend(doc.children(id).iter().rev().map(|&child| Step::Open(child)));
}

fn close_element(out: &mut String, name: &str, start: usize) {
    // Line breaks ending the content go after the closing tag.
    let content_end = start + out[start..].trim_end_matches('\n').len();
    let trailing = out.len() - content_end;
    out.truncate(content_end);

    // A parser drops the line feed right after <pre>, so leading ones
    // would not survive a second pass.
    if name == "pre" {
        let leading = out[start..].len() - out[start..].trim_start_matches('\n').len();
        out.replace_range(start..start + leading, "");
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
    out.extend(std::iter::repeat('\n').take(trailing));
}

/// Strip carriage returns, collapse runs of 3+ newlines to 2 and trim.
pub fn post_process(output: &str) -> String {
    let without_cr = output.replace('\r', "");
    EXCESS_NEWLINES
        .replace_all(&without_cr, "\n\n")
        .trim()
        .to_string()
}
