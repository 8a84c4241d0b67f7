//! Bot API calls.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{ApiResponse, InputMediaPhoto, SendMessage, PARSE_MODE};
use crate::Result;

/// Telegram accepts between 2 and 10 items per media group.
pub const MAX_MEDIA_GROUP: usize = 10;

/// Something that can publish a finished message with its images.
#[async_trait]
pub trait Deliver: Send + Sync {
    /// Publish `message` (Telegram HTML) with zero or more image files.
    ///
    /// No files: a text message. One: a captioned photo. More: a media group
    /// whose first photo carries `message` as its caption.
    async fn send(&self, message: &str, files: &[PathBuf]) -> Result<()>;
}

/// Client for the handful of Bot API methods telepost needs.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing `reqwest::Client` (connection pool, proxies, timeouts).
    pub fn with_client(client: reqwest::Client, config: TelegramConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    /// `sendMessage`
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: PARSE_MODE,
        };
        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        check(response).await
    }

    /// `sendPhoto` with an HTML caption.
    pub async fn send_photo(&self, path: &Path, caption: &str) -> Result<()> {
        let form = Form::new()
            .text("chat_id", self.config.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", PARSE_MODE)
            .part("photo", file_part(path).await?);
        let response = self
            .client
            .post(self.config.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        check(response).await
    }

    /// `sendMediaGroup`; only the first photo carries `caption`.
    pub async fn send_media_group(&self, paths: &[PathBuf], caption: &str) -> Result<()> {
        if paths.len() > MAX_MEDIA_GROUP {
            return Err(TelegramError::TooManyMedia {
                count: paths.len(),
                max: MAX_MEDIA_GROUP,
            });
        }

        let mut media = Vec::with_capacity(paths.len());
        let mut form = Form::new().text("chat_id", self.config.chat_id.clone());
        for (index, path) in paths.iter().enumerate() {
            let field = format!("photo{index}");
            let item_caption = (index == 0).then_some(caption);
            media.push(InputMediaPhoto::attached(&field, item_caption));
            form = form.part(field, file_part(path).await?);
        }
        let form = form.text("media", serde_json::to_string(&media)?);

        let response = self
            .client
            .post(self.config.method_url("sendMediaGroup"))
            .multipart(form)
            .send()
            .await?;
        check(response).await
    }
}

#[async_trait]
impl Deliver for TelegramClient {
    async fn send(&self, message: &str, files: &[PathBuf]) -> Result<()> {
        match files {
            [] => self.send_message(message).await?,
            [single] => self.send_photo(single, message).await?,
            many => self.send_media_group(many, message).await?,
        }
        info!(chat = %self.config.chat_id, photos = files.len(), "delivered to Telegram");
        Ok(())
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await.map_err(|source| TelegramError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    debug!(file = %file_name, size = bytes.len(), "attaching photo");
    Ok(Part::bytes(bytes).file_name(file_name))
}

async fn check(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body: ApiResponse = response.json().await?;
    if body.ok {
        return Ok(());
    }
    Err(TelegramError::Api {
        code: body.error_code.unwrap_or_else(|| i64::from(status.as_u16())),
        description: body
            .description
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Multipart, Path as UrlPath, State};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone, Default)]
    struct Call {
        method: String,
        fields: HashMap<String, String>,
        files: Vec<(String, String)>,
        json: Option<Value>,
    }

    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    async fn record_json(State(recorder): State<Recorder>, Json(body): Json<Value>) -> Json<Value> {
        recorder.calls.lock().unwrap().push(Call {
            method: "sendMessage".to_string(),
            json: Some(body),
            ..Default::default()
        });
        Json(json!({ "ok": true, "result": {} }))
    }

    async fn record_multipart(
        State(recorder): State<Recorder>,
        UrlPath(method): UrlPath<String>,
        mut multipart: Multipart,
    ) -> Json<Value> {
        let mut call = Call {
            method,
            ..Default::default()
        };
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    field.bytes().await.unwrap();
                    call.files.push((name, file_name));
                }
                None => {
                    call.fields.insert(name, field.text().await.unwrap());
                }
            }
        }
        recorder.calls.lock().unwrap().push(call);
        Json(json!({ "ok": true, "result": [] }))
    }

    /// Start a fake Bot API and return a client pointed at it.
    async fn fake_api(app: Router) -> TelegramClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let config = TelegramConfig::new("TEST", "@news").with_api_base(format!("http://{addr}"));
        TelegramClient::new(config)
    }

    async fn recording_api() -> (TelegramClient, Recorder) {
        let recorder = Recorder::default();
        let app = Router::new()
            .route("/botTEST/sendMessage", post(record_json))
            .route("/botTEST/{method}", post(record_multipart))
            .with_state(recorder.clone());
        (fake_api(app).await, recorder)
    }

    fn photos(dir: &tempfile::TempDir, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.path().join(format!("img{i}.png"));
                std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn test_text_only_sends_message() {
        let (client, recorder) = recording_api().await;
        client.send("<b>T</b>\n\nbody", &[]).await.unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "sendMessage");
        assert_eq!(
            calls[0].json,
            Some(json!({ "chat_id": "@news", "text": "<b>T</b>\n\nbody", "parse_mode": "HTML" }))
        );
    }

    #[tokio::test]
    async fn test_single_photo_is_captioned() {
        let dir = tempfile::tempdir().unwrap();
        let (client, recorder) = recording_api().await;
        client.send("<b>T</b>\n\n", &photos(&dir, 1)).await.unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "sendPhoto");
        assert_eq!(calls[0].fields["caption"], "<b>T</b>\n\n");
        assert_eq!(calls[0].fields["parse_mode"], "HTML");
        assert_eq!(calls[0].fields["chat_id"], "@news");
        assert_eq!(calls[0].files, vec![("photo".to_string(), "img0.png".to_string())]);
    }

    #[tokio::test]
    async fn test_media_group_captions_first_photo() {
        let dir = tempfile::tempdir().unwrap();
        let (client, recorder) = recording_api().await;
        client.send("caption", &photos(&dir, 3)).await.unwrap();

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "sendMediaGroup");
        let media: Value = serde_json::from_str(&calls[0].fields["media"]).unwrap();
        assert_eq!(
            media,
            json!([
                { "type": "photo", "media": "attach://photo0", "caption": "caption", "parse_mode": "HTML" },
                { "type": "photo", "media": "attach://photo1" },
                { "type": "photo", "media": "attach://photo2" },
            ])
        );
        let fields: Vec<_> = calls[0].files.iter().map(|(field, _)| field.as_str()).collect();
        assert_eq!(fields, vec!["photo0", "photo1", "photo2"]);
    }

    #[tokio::test]
    async fn test_too_many_photos_rejected_before_request() {
        let (client, recorder) = recording_api().await;
        let paths: Vec<PathBuf> = (0..11).map(|i| PathBuf::from(format!("missing{i}.png"))).collect();
        let err = client.send("x", &paths).await.unwrap_err();

        assert!(matches!(err, TelegramError::TooManyMedia { count: 11, max: 10 }));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let (client, recorder) = recording_api().await;
        let err = client
            .send("x", &[PathBuf::from("/nonexistent/telepost.png")])
            .await
            .unwrap_err();

        assert!(matches!(err, TelegramError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/telepost.png"));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let app = Router::new().route(
            "/botTEST/sendMessage",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "ok": false,
                        "error_code": 400,
                        "description": "Bad Request: can't parse entities"
                    })),
                )
            }),
        );
        let client = fake_api(app).await;
        let err = client.send("<b>broken", &[]).await.unwrap_err();

        match &err {
            TelegramError::Api { code, description } => {
                assert_eq!(*code, 400);
                assert!(description.contains("can't parse entities"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "Telegram API error 400: Bad Request: can't parse entities"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_hides_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = TelegramConfig::new("SECRET-TOKEN", "@news").with_api_base(format!("http://{addr}"));
        let err = TelegramClient::new(config).send("x", &[]).await.unwrap_err();

        assert!(matches!(err, TelegramError::Http(_)));
        assert!(!err.to_string().contains("SECRET-TOKEN"));
    }
}
