//! Bot API request and response shapes.

use serde::{Deserialize, Serialize};

pub(crate) const PARSE_MODE: &str = "HTML";

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

/// One entry of the `media` array of `sendMediaGroup`.
#[derive(Debug, Serialize)]
pub(crate) struct InputMediaPhoto {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

impl InputMediaPhoto {
    /// A photo uploaded in the same request under the multipart field `field`.
    pub fn attached(field: &str, caption: Option<&str>) -> Self {
        Self {
            kind: "photo",
            media: format!("attach://{field}"),
            caption: caption.map(str::to_string),
            parse_mode: caption.map(|_| PARSE_MODE),
        }
    }
}
