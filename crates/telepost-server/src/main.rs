//! telepost-server - publish news posts to a Telegram channel

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use telepost_server::{Args, ServerConfig};

const DEFAULT_LOG_FILTER: &str = "telepost=info,telepost_server=info,telepost_telegram=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = ServerConfig::from_args(Args::parse());
    match telepost_server::serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
