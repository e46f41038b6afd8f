//! Archigram HTTP server

use std::path::PathBuf;
use std::sync::Arc;

use archigram_service::{AppConfig, DiagramService};

/// Environment variable overriding where config.json lives
const CONFIG_DIR_ENV: &str = "ARCHIGRAM_CONFIG_DIR";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging - RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Archigram starting...");

    let config_dir = std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    let config = AppConfig::load(&config_dir).await?;

    if config.resolved_api_key().is_none() && config.backend == "gemini" {
        log::warn!(
            "no API key configured; submissions will fail with an authentication error \
             until one is set in config.json or GEMINI_API_KEY"
        );
    }

    let service = Arc::new(DiagramService::from_config(&config)?);
    log::info!("generation backend: {}", service.backend_name());

    let app = archigram_http::router(service);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
