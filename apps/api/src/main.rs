mod ai_client;
mod config;
mod errors;
mod extraction;
mod forms;
mod models;
mod normalization;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::forms::FormStore;
use crate::normalization::{AiNormalizer, DisabledNormalizer, HttpAiNormalizer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake API v{}", env!("CARGO_PKG_VERSION"));

    let normalizer = build_normalizer(&config)?;
    info!(
        "AI normalizer: {} (timeout {}s, threshold {})",
        normalizer.backend(),
        config.ai_timeout_secs,
        config.ai_confidence_threshold
    );

    let state = AppState {
        config: config.clone(),
        normalizer,
        forms: Arc::new(FormStore::default()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// HTTP-backed normalizer when `AI_NORMALIZE_URL` is set, otherwise the
/// disabled one (every extract then runs heuristics only).
fn build_normalizer(config: &Config) -> Result<Arc<dyn AiNormalizer>> {
    match &config.ai_normalize_url {
        Some(url) => {
            let client = AiClient::new(url.clone(), config.ai_api_key.clone())?;
            Ok(Arc::new(HttpAiNormalizer::new(client)))
        }
        None => {
            warn!("AI_NORMALIZE_URL not set; AI normalization disabled");
            Ok(Arc::new(DisabledNormalizer))
        }
    }
}
