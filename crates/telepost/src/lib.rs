//! # telepost
//!
//! Rewrite rich-text HTML from a browser editor into the markup subset that
//! Telegram's HTML parse mode accepts.
//!
//! ## Design
//!
//! The input is parsed leniently into an arena [`Document`], rewritten in place
//! by a fixed sequence of passes and serialized back out:
//!
//! - `h1`-`h3` become bold, followed by a line break
//! - `p` is unwrapped, followed by a line break
//! - `ul` / `ol` are flattened to `• item` / `1. item` text lines
//! - `b strong i em u ins s strike del a code pre` map onto Telegram's
//!   `b i u s a code pre`; anything else is unwrapped, keeping its text
//!
//! The output never contains another tag and never three newlines in a row.
//!
//! ## Example
//!
//! ```rust
//! let message = telepost::transform("Hi", "<h1>Title</h1><p>Body</p>");
//! assert_eq!(message, "<b>Hi</b>\n\n<b>Title</b>\nBody");
//! ```

pub mod html;
pub mod node;
pub mod rules;
mod serialize;
mod service;
mod utilities;

pub use html::parse_html;
pub use node::{Document, NodeId, NodeKind};
pub use rules::{TagRule, ALLOWED_TAGS};
pub use serialize::{post_process, serialize};
pub use service::{TransformOptions, Transformer};
pub use utilities::{escape_attr, escape_text};

/// Transform `html` into a Telegram message headed by `title`, using the
/// default [`TransformOptions`].
pub fn transform(title: &str, html: &str) -> String {
    Transformer::new().transform(title, html)
}
