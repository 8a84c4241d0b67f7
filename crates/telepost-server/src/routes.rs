//! HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use telepost::Transformer;
use telepost_telegram::{Deliver, TelegramClient};
use tracing::{debug, info};

use crate::config::{ServerConfig, UploadLimits};
use crate::error::PublishError;
use crate::upload::{self, PendingFile, UploadBatch};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// The only platform there is.
pub const TELEGRAM_PLATFORM: &str = "telegram";

/// Shared, read-only state of the router.
#[derive(Clone)]
pub struct AppState {
    pub limits: Arc<UploadLimits>,
    pub upload_dir: PathBuf,
    pub transformer: Arc<Transformer>,
    /// `None` when credentials are missing.
    pub deliverer: Option<Arc<dyn Deliver>>,
}

impl AppState {
    pub fn from_config(config: &ServerConfig) -> Self {
        let deliverer = config
            .telegram
            .clone()
            .map(|telegram| Arc::new(TelegramClient::new(telegram)) as Arc<dyn Deliver>);
        Self {
            limits: Arc::new(config.limits.clone()),
            upload_dir: config.upload_dir.clone(),
            transformer: Arc::new(Transformer::new()),
            deliverer,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.limits.body_limit();
    Router::new()
        .route("/", get(index))
        .route("/publish", post(publish))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Fields of the publish form.
#[derive(Debug, Default)]
struct PublishForm {
    title: Option<String>,
    content: Option<String>,
    platforms: Vec<String>,
    photos: Vec<PendingFile>,
}

impl PublishForm {
    async fn read(multipart: &mut Multipart, limits: &UploadLimits) -> Result<Self, PublishError> {
        let mut form = Self::default();
        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = Some(field.text().await?),
                "content" => form.content = Some(field.text().await?),
                "platforms" => form.platforms.push(field.text().await?),
                "photos" => {
                    let mut photo = PendingFile::new(field.file_name().unwrap_or_default());
                    while let Some(chunk) = field.chunk().await? {
                        photo.push(&chunk, limits.max_file_size);
                    }
                    // Browsers send an empty part when no file was picked.
                    if !photo.file_name.is_empty() {
                        form.photos.push(photo);
                    }
                }
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    fn required(value: Option<String>, name: &str) -> Result<String, PublishError> {
        value.ok_or_else(|| PublishError::BadRequest(format!("missing form field: {name}")))
    }
}

async fn publish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, PublishError> {
    let form = PublishForm::read(&mut multipart, &state.limits).await?;
    let title = PublishForm::required(form.title, "title")?;
    let content = PublishForm::required(form.content, "content")?;

    if !form.platforms.iter().any(|p| p == TELEGRAM_PLATFORM) {
        return Err(PublishError::BadRequest(
            "only Telegram publishing is supported".to_string(),
        ));
    }
    upload::validate(&form.photos, &state.limits)?;

    let deliverer = state.deliverer.as_ref().ok_or(PublishError::NotConfigured)?;

    let batch = UploadBatch::persist(form.photos, &state.upload_dir)
        .await
        .map_err(|err| PublishError::Internal(format!("storing uploads: {err}")))?;

    let message = state.transformer.transform(&title, &content);
    deliverer.send(&message, batch.paths()).await?;

    info!(photos = batch.paths().len(), message_len = message.len(), "post published");
    Ok(Json(json!({ "success": "Post published to Telegram" })))
}
