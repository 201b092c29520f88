pub mod config;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod server;
pub mod state;
pub mod utils;

use crate::{
    config::{Config, ConfigOverrides},
    core::ZipHandler,
    lifecycle::{shutdown_signal, Lifecycle},
};
use tracing::{info, warn};

pub async fn run(overrides: ConfigOverrides) -> crate::error::Result<()> {
    // Load environment variables from .env file if it exists
    let dotenv_result = dotenv::dotenv();

    let config = Config::load(&overrides)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.get_log_filter().into()),
        )
        .init();

    match dotenv_result {
        Ok(path) => info!("Loaded environment from: {:?}", path),
        Err(e) if e.not_found() => info!("No .env file found, using default configuration"),
        Err(e) => warn!("Error loading .env file: {}", e),
    }

    info!(
        "labelsort {} ({}) serving {}",
        env!("CARGO_PKG_VERSION"),
        env!("TARGET_TRIPLE"),
        config.images_dir.display()
    );

    let lifecycle = Lifecycle::new();
    let state = lifecycle.prepare(config).await?;

    lifecycle.serve(state, &ZipHandler, shutdown_signal()).await
}
