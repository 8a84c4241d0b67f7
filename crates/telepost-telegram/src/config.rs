use std::fmt;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Credentials and endpoint for the Bot API.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token as issued by BotFather.
    pub bot_token: String,
    /// Destination chat: a numeric id or an `@channelusername`.
    pub chat_id: String,
    /// Base URL of the Bot API, without the `/bot<token>` suffix.
    pub api_base: String,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }
}

// The token never shows up in logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}
