//! The rule attached to a recognized source tag.

/// What the transformer does with an element of a recognized tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRule {
    /// Keep the element, renamed to one of Telegram's tags.
    Rename(&'static str),
    /// `h1`-`h3`: bold, followed by a line break.
    Heading,
    /// `p`: unwrapped, followed by a line break.
    Paragraph,
    /// `ul` / `ol`: flattened into bulleted or numbered text lines.
    List { ordered: bool },
    /// `li` outside of any list is unwrapped.
    ListItem,
    /// `br`
    LineBreak,
}

impl TagRule {
    pub fn is_list(self) -> bool {
        matches!(self, TagRule::List { .. })
    }
}
