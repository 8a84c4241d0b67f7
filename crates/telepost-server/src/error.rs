//! Request outcomes that are not a success.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use telepost_telegram::TelegramError;
use tracing::{error, warn};

/// Why a publish request failed. Each variant maps to one HTTP status and a
/// `{"error": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Missing or invalid form input.
    #[error("{0}")]
    BadRequest(String),

    /// The multipart body could not be read.
    #[error("invalid form data: {}", .0.body_text())]
    Form(#[from] MultipartError),

    /// Bot token or channel not configured.
    #[error("Telegram is not configured")]
    NotConfigured,

    /// Telegram rejected the post or could not be reached.
    #[error("Telegram error: {0}")]
    Delivery(#[from] TelegramError),

    /// Anything else. The detail is logged, not returned.
    #[error("failed to publish the post")]
    Internal(String),
}

impl PublishError {
    pub fn status(&self) -> StatusCode {
        match self {
            PublishError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PublishError::Form(err) => err.status(),
            PublishError::NotConfigured
            | PublishError::Delivery(_)
            | PublishError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        match &self {
            PublishError::BadRequest(message) => warn!(%message, "rejected publish request"),
            PublishError::Form(err) => warn!(error = %err, "unreadable form data"),
            PublishError::NotConfigured => error!("TELEGRAM_TOKEN or TELEGRAM_CHANNEL is not set"),
            PublishError::Delivery(err) => error!(error = %err, "Telegram delivery failed"),
            PublishError::Internal(detail) => error!(%detail, "publish failed"),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statuses() {
        assert_eq!(
            PublishError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PublishError::NotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let delivery = PublishError::from(TelegramError::Api {
            code: 401,
            description: "Unauthorized".into(),
        });
        assert_eq!(delivery.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(delivery.to_string(), "Telegram error: Telegram API error 401: Unauthorized");
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = PublishError::Internal("disk full at /var/tmp".into());
        assert_eq!(err.to_string(), "failed to publish the post");
    }
}
