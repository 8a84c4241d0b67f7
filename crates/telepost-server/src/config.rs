//! Server configuration.
//!
//! Everything is read once at startup, from flags or the environment, and
//! handed to the router as an explicit value.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use telepost_telegram::{TelegramConfig, DEFAULT_API_BASE};

const MIB: usize = 1024 * 1024;

/// Command line and environment options.
#[derive(Debug, Parser)]
#[command(name = "telepost-server")]
#[command(version, about = "Publish news posts to a Telegram channel", long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "TELEPOST_BIND", default_value = "127.0.0.1:5001")]
    pub bind: SocketAddr,

    /// Directory under which each request stores its uploads while sending
    #[arg(long, env = "TELEPOST_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Bot token
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Destination channel, e.g. `@mychannel` or a numeric chat id
    #[arg(long, env = "TELEGRAM_CHANNEL")]
    pub telegram_channel: Option<String>,

    /// Bot API base URL
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_API_BASE)]
    pub telegram_api_base: String,

    /// Maximum number of photos per post
    #[arg(long, default_value_t = 4)]
    pub max_files: usize,

    /// Maximum size of one photo, in MiB
    #[arg(long, default_value_t = 30)]
    pub max_file_size_mb: usize,
}

/// Limits applied to uploaded photos.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_files: usize,
    /// Bytes
    pub max_file_size: usize,
    /// Lowercase, without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 4,
            max_file_size: 30 * MIB,
            allowed_extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl UploadLimits {
    /// Largest request body worth reading: every photo at full size plus
    /// room for the text fields.
    pub fn body_limit(&self) -> usize {
        self.max_files
            .saturating_add(1)
            .saturating_mul(self.max_file_size)
            .saturating_add(MIB)
    }

    /// Case-insensitive check of the file name's extension.
    pub fn allows(&self, file_name: &str) -> bool {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.allowed_extensions.contains(&ext))
    }
}

/// Resolved configuration of a running server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub upload_dir: PathBuf,
    pub limits: UploadLimits,
    /// `None` when either credential is missing; requests then fail with a
    /// configuration error instead of reaching Telegram.
    pub telegram: Option<TelegramConfig>,
}

impl ServerConfig {
    pub fn from_args(args: Args) -> Self {
        let telegram = credentials(args.telegram_token, args.telegram_channel)
            .map(|config| config.with_api_base(args.telegram_api_base));
        Self {
            bind: args.bind,
            upload_dir: args
                .upload_dir
                .unwrap_or_else(|| std::env::temp_dir().join("telepost")),
            limits: UploadLimits {
                max_files: args.max_files,
                max_file_size: args.max_file_size_mb.saturating_mul(MIB),
                ..UploadLimits::default()
            },
            telegram,
        }
    }
}

/// Both values present and non-blank, or nothing.
fn credentials(token: Option<String>, channel: Option<String>) -> Option<TelegramConfig> {
    let token = token.filter(|t| !t.trim().is_empty())?;
    let channel = channel.filter(|c| !c.trim().is_empty())?;
    Some(TelegramConfig::new(token.trim(), channel.trim()))
}

/// Error type for startup configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot create upload directory {}: {source}", path.display())]
    UploadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
