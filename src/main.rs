//! Presentation Foundation Router - Main Entry Point

use presentation_router::{AppState, RouterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Presentation Foundation Router v{}", env!("CARGO_PKG_VERSION"));

    // Load config
    let config_path = std::env::var("PF_CONFIG")
        .unwrap_or_else(|_| "/etc/presentation-router/config.json".into());

    let config = RouterConfig::load(&config_path)
        .unwrap_or_else(|e| {
            tracing::warn!(path = %config_path, error = %e, "Config not loaded, using defaults");
            RouterConfig::default()
        })
        .with_env_overrides();

    tracing::info!(
        root_domain = %config.root_domain,
        environment = ?config.environment,
        "tenant routing configured"
    );

    let state = AppState::new(config)?;
    presentation_router::serve(state).await?;

    Ok(())
}
