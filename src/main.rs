use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shinkr_dashboard::{client::ApiClient, clock::SystemClock, config, AppState};

// ── Entry point ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env; a missing file is fine, the vars may already be set
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shinkr_dashboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = config::AppConfig::from_env()?;
    tracing::info!("Starting Shinkr dashboard on {}", config.bind_addr());
    tracing::info!("Upstream API: {}", config.api_base_url);

    let client = ApiClient::new(config.api_base_url.clone(), config.request_timeout)?;
    let bind_addr = config.bind_addr();

    let state = Arc::new(AppState {
        client,
        config,
        clock: Arc::new(SystemClock),
    });

    let app = shinkr_dashboard::app(state);

    // ── Serve ──────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
