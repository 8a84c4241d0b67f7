//! # telepost-server
//!
//! A small web form that publishes a news post to a Telegram channel.
//!
//! `POST /publish` takes `title`, `content` (editor HTML), `platforms` and up
//! to four `photos`, cleans the content with [`telepost::Transformer`] and
//! hands the message to a [`telepost_telegram::Deliver`] implementation.
//! Uploaded photos live in a per-request temporary directory that is removed
//! once the request is over.

pub mod config;
pub mod error;
pub mod routes;
pub mod upload;

pub use config::{Args, ConfigError, ServerConfig, UploadLimits};
pub use error::PublishError;
pub use routes::{router, AppState};

use tokio::net::TcpListener;
use tracing::{info, warn};

/// Prepare the upload directory, bind and serve until the process stops.
pub async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.upload_dir).map_err(|source| ConfigError::UploadDir {
        path: config.upload_dir.clone(),
        source,
    })?;
    if config.telegram.is_none() {
        warn!("TELEGRAM_TOKEN or TELEGRAM_CHANNEL is not set; publishing will fail");
    }

    let state = AppState::from_config(&config);
    let listener = TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, upload_dir = %config.upload_dir.display(), "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
