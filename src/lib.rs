//! Dashboard backend for the Shinkr link shortener.
//!
//! Fetches links and raw click rows from the upstream link API, classifies
//! links (expired / protected / active) and aggregates clicks into the
//! fixed-shape series each dashboard chart draws.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod analytics;
pub mod auth;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod status;

use client::ApiClient;
use clock::Clock;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub client: ApiClient,
    pub config: config::AppConfig,
    /// Read once per request; every facet and window in one response uses
    /// the same instant.
    pub clock: Arc<dyn Clock>,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route(
            "/links",
            get(handlers::links::list_links).post(handlers::links::create_link),
        )
        .route("/links/:code", delete(handlers::links::delete_link))
        .route("/links/:code/edit", post(handlers::links::edit_link))
        .route("/summary", get(handlers::links::summary))
        .route("/titles", get(handlers::links::titles))
        .route("/analytics/monthly", get(handlers::analytics::monthly))
        .route("/analytics/monthly/:code", get(handlers::analytics::monthly))
        .route("/analytics/devices", get(handlers::analytics::devices))
        .route("/analytics/devices/:code", get(handlers::analytics::devices))
        .route("/analytics/daily", get(handlers::analytics::daily))
        .route("/analytics/daily/:code", get(handlers::analytics::daily))
        .route("/analytics/countries", get(handlers::analytics::countries))
        .route("/analytics/countries/:code", get(handlers::analytics::countries));

    Router::new()
        .route("/health", get(|| async { axum::http::StatusCode::OK }))
        .nest("/api", api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
