use std::path::PathBuf;

/// Error type for delivery
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The Bot API answered with `ok: false`.
    #[error("Telegram API error {code}: {description}")]
    Api { code: i64, description: String },

    /// The request never got a usable answer.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a media group holds at most {max} photos, got {count}")]
    TooManyMedia { count: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the bot token.
        TelegramError::Http(err.without_url())
    }
}
