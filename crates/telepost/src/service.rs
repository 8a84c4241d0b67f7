//! Transformer - the main entry point for HTML to Telegram markup conversion.

use tracing::{debug, trace};

use crate::html::parse_html;
use crate::node::{Document, NodeId, NodeKind};
use crate::rules::{classify, rename_target, TagRule, LINK_ATTRIBUTE};
use crate::serialize::serialize;
use crate::utilities::escape_text;

/// Options for [`Transformer`]
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// Prefix of every unordered list line
    pub bullet_marker: String,

    /// Written between the item number and the text of ordered list lines
    pub ordered_delimiter: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            bullet_marker: "• ".to_string(),
            ordered_delimiter: ". ".to_string(),
        }
    }
}

/// Rewrites editor HTML into a Telegram message.
///
/// Each call parses its own [`Document`], so one transformer can be shared
/// freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    options: TransformOptions,
}

impl Transformer {
    /// Create a Transformer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a Transformer with custom options
    pub fn with_options(options: TransformOptions) -> Self {
        Self { options }
    }

    /// Build the final message: the bold title, a blank line, then the
    /// cleaned content.
    ///
    /// Never fails; malformed markup is handled on a best-effort basis.
    pub fn transform(&self, title: &str, html: &str) -> String {
        format!("<b>{}</b>\n\n{}", escape_text(title), self.clean(html))
    }

    /// Clean `html` down to Telegram's tag subset, without a title.
    pub fn clean(&self, html: &str) -> String {
        let mut doc = parse_html(html);
        self.rewrite(&mut doc);
        let output = serialize(&doc);
        debug!(input_len = html.len(), output_len = output.len(), "cleaned markup");
        output
    }

    /// Run only the final rename/unwrap pass and serialization.
    ///
    /// Output of [`Transformer::clean`] comes back unchanged.
    pub fn normalize(&self, html: &str) -> String {
        let mut doc = parse_html(html);
        rename_or_unwrap(&mut doc);
        serialize(&doc)
    }

    /// Apply every structural pass to `doc`, in order.
    pub fn rewrite(&self, doc: &mut Document) {
        mark_headings(doc);
        unwrap_paragraphs(doc);
        let flattened = flatten_lists(doc, &self.options);
        unwrap_orphan_items(doc);
        separate_lists(doc, &flattened);
        rename_or_unwrap(doc);
    }
}

/// Attached elements below the root whose tag satisfies `pred`, in document order.
fn elements_where<F>(doc: &Document, pred: F) -> Vec<NodeId>
where
    F: Fn(TagRule) -> bool,
{
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&id| {
            doc.tag_name(id)
                .and_then(classify)
                .is_some_and(|rule| pred(rule))
        })
        .collect()
}

fn mark_headings(doc: &mut Document) {
    for id in elements_where(doc, |rule| rule == TagRule::Heading) {
        doc.rename(id, "b");
        let br = doc.create_line_break();
        doc.append(id, br);
    }
}

fn unwrap_paragraphs(doc: &mut Document) {
    for id in elements_where(doc, |rule| rule == TagRule::Paragraph) {
        let br = doc.create_line_break();
        doc.insert_after(id, br);
        doc.unwrap(id);
    }
}

/// Replace every outermost list with one text node of marker-prefixed lines.
/// Returns the replacement nodes.
fn flatten_lists(doc: &mut Document, options: &TransformOptions) -> Vec<NodeId> {
    let mut flattened = Vec::new();
    for id in elements_where(doc, TagRule::is_list) {
        // Nested lists went away with their outer list.
        if !doc.is_attached(id) {
            continue;
        }
        let mut text = String::new();
        write_list_lines(doc, id, options, &mut text);
        let replacement = doc.create_text(text.trim());
        doc.replace_with(id, replacement);
        trace!(lines = text.lines().count(), "flattened list");
        flattened.push(replacement);
    }
    flattened
}

enum ListStep {
    List(NodeId),
    Item { item: NodeId, number: Option<usize> },
}

fn write_list_lines(doc: &Document, list: NodeId, options: &TransformOptions, out: &mut String) {
    // Nested lists are written right after the line of their item, before
    // the next sibling item, so the walk keeps its own stack.
    let mut stack = vec![ListStep::List(list)];
    while let Some(step) = stack.pop() {
        match step {
            ListStep::List(list) => {
                let ordered =
                    doc.tag_name(list).and_then(classify) == Some(TagRule::List { ordered: true });
                let items = find_below(doc, list, |rule| rule == TagRule::ListItem);
                stack.extend(items.into_iter().enumerate().rev().map(|(index, item)| {
                    ListStep::Item {
                        item,
                        number: ordered.then_some(index + 1),
                    }
                }));
            }
            ListStep::Item { item, number } => {
                match number {
                    Some(number) => {
                        out.push_str(&number.to_string());
                        out.push_str(&options.ordered_delimiter);
                    }
                    None => out.push_str(&options.bullet_marker),
                }
                write_item_text(doc, item, out);
                out.push('\n');

                let nested = find_below(doc, item, TagRule::is_list);
                stack.extend(nested.into_iter().rev().map(ListStep::List));
            }
        }
    }
}

/// Elements below `node` matching `pred`, in document order. The walk stops
/// at every match and at nested lists, so a list's items are only its own.
fn find_below<F>(doc: &Document, node: NodeId, pred: F) -> Vec<NodeId>
where
    F: Fn(TagRule) -> bool,
{
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(node).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let rule = doc.tag_name(id).and_then(classify);
        if rule.is_some_and(&pred) {
            found.push(id);
        } else if !rule.is_some_and(TagRule::is_list) {
            stack.extend(doc.children(id).iter().rev().copied());
        }
    }
    found
}

/// Text of an item, skipping nested lists. Markup is ignored.
fn write_item_text(doc: &Document, node: NodeId, out: &mut String) {
    let mut stack: Vec<NodeId> = doc.children(node).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        match doc.kind(id) {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { name, .. } => {
                if !classify(name).is_some_and(TagRule::is_list) {
                    stack.extend(doc.children(id).iter().rev().copied());
                }
            }
            NodeKind::LineBreak | NodeKind::Root => {}
        }
    }
}

fn unwrap_orphan_items(doc: &mut Document) {
    for id in elements_where(doc, |rule| rule == TagRule::ListItem) {
        doc.unwrap(id);
    }
}

/// Make sure lists, flattened or not, sit on lines of their own.
///
/// Whitespace-only text next to a list is dropped first; it would otherwise
/// start or end the neighbouring line.
fn separate_lists(doc: &mut Document, flattened: &[NodeId]) {
    let mut blocks = elements_where(doc, TagRule::is_list);
    blocks.extend(flattened.iter().copied().filter(|&id| doc.is_attached(id)));

    for id in blocks {
        while let Some(prev) = doc.previous_sibling(id).filter(|&n| is_blank_text(doc, n)) {
            doc.detach(prev);
        }
        while let Some(next) = doc.next_sibling(id).filter(|&n| is_blank_text(doc, n)) {
            doc.detach(next);
        }

        if let Some(prev) = doc.previous_sibling(id) {
            if !ends_with_break(doc, prev) {
                let br = doc.create_line_break();
                doc.insert_before(id, br);
            }
        }
        if let Some(next) = doc.next_sibling(id) {
            if !starts_with_break(doc, next) {
                let br = doc.create_line_break();
                doc.insert_after(id, br);
            }
        }
    }
}

fn is_blank_text(doc: &Document, id: NodeId) -> bool {
    matches!(doc.kind(id), NodeKind::Text(text) if text.bytes().all(|b| b.is_ascii_whitespace()))
}

fn ends_with_break(doc: &Document, id: NodeId) -> bool {
    let mut current = id;
    loop {
        match doc.kind(current) {
            NodeKind::LineBreak => return true,
            NodeKind::Text(text) => return text.ends_with('\n'),
            NodeKind::Element { name, .. } if classify(name) == Some(TagRule::Paragraph) => {
                return true
            }
            NodeKind::Element { .. } | NodeKind::Root => match doc.children(current).last() {
                Some(&last) => current = last,
                None => return false,
            },
        }
    }
}

fn starts_with_break(doc: &Document, id: NodeId) -> bool {
    let mut current = id;
    loop {
        match doc.kind(current) {
            NodeKind::LineBreak => return true,
            NodeKind::Text(text) => return text.starts_with('\n'),
            NodeKind::Element { name, .. } if classify(name) == Some(TagRule::Paragraph) => {
                return true
            }
            NodeKind::Element { .. } | NodeKind::Root => match doc.children(current).first() {
                Some(&first) => current = first,
                None => return false,
            },
        }
    }
}

/// Rename recognized tags to their Telegram names, unwrap everything else.
fn rename_or_unwrap(doc: &mut Document) {
    for id in doc.descendants(doc.root()) {
        let Some(tag) = doc.tag_name(id) else {
            continue;
        };
        match rename_target(tag) {
            Some(target) => {
                doc.rename(id, target);
                let keep_link = target == "a";
                doc.retain_attrs(id, |name| keep_link && name == LINK_ATTRIBUTE);
            }
            None => doc.unwrap(id),
        }
    }
}
