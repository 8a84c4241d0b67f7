//! Tag classification.
//!
//! A fixed table from recognized source tag names to the [`TagRule`] that
//! handles them. Tags missing from the table are unwrapped.

mod rule;

pub use rule::TagRule;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Tags Telegram's HTML parse mode accepts, and the only ones ever emitted.
pub const ALLOWED_TAGS: &[&str] = &["b", "i", "u", "s", "a", "code", "pre"];

/// The only attribute that survives, and only on `a`.
pub const LINK_ATTRIBUTE: &str = "href";

static RULES: Lazy<IndexMap<&'static str, TagRule>> = Lazy::new(|| {
    IndexMap::from([
        ("b", TagRule::Rename("b")),
        ("strong", TagRule::Rename("b")),
        ("i", TagRule::Rename("i")),
        ("em", TagRule::Rename("i")),
        ("u", TagRule::Rename("u")),
        ("ins", TagRule::Rename("u")),
        ("s", TagRule::Rename("s")),
        ("strike", TagRule::Rename("s")),
        ("del", TagRule::Rename("s")),
        ("a", TagRule::Rename("a")),
        ("code", TagRule::Rename("code")),
        ("pre", TagRule::Rename("pre")),
        ("h1", TagRule::Heading),
        ("h2", TagRule::Heading),
        ("h3", TagRule::Heading),
        ("p", TagRule::Paragraph),
        ("ul", TagRule::List { ordered: false }),
        ("ol", TagRule::List { ordered: true }),
        ("li", TagRule::ListItem),
        ("br", TagRule::LineBreak),
    ])
});

/// Look up the rule for a source tag name (case-insensitive).
pub fn classify(tag: &str) -> Option<TagRule> {
    RULES.get(tag.to_lowercase().as_str()).copied()
}

/// The Telegram tag a source tag is renamed to in the final pass, if any.
///
/// Only plain renames count here: by the time the final pass runs, headings
/// have already been relabelled `b`.
pub fn rename_target(tag: &str) -> Option<&'static str> {
    match classify(tag)? {
        TagRule::Rename(target) => Some(target),
        _ => None,
    }
}
