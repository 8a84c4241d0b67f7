//! Telegram Bot API delivery client.
//!
//! Sends one finished HTML message to a channel, either as plain text, as the
//! caption of a single photo, or as the caption of the first photo of a media
//! group.
//!
//! # Example
//!
//! ```rust,ignore
//! use telepost_telegram::{Deliver, TelegramClient, TelegramConfig};
//!
//! let client = TelegramClient::new(TelegramConfig::new("BOT_TOKEN", "@channel"));
//! client.send("<b>Hello</b>\n\nWorld", &[]).await?;
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{Deliver, TelegramClient, MAX_MEDIA_GROUP};
pub use config::{TelegramConfig, DEFAULT_API_BASE};
pub use error::TelegramError;

pub type Result<T> = std::result::Result<T, TelegramError>;
