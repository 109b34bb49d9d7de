//! Hospital Stay Predictor Server
//!
//! Serves the admission form and a JSON prediction API on top of a model
//! bundle loaded once at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   STAY PREDICTOR SERVER                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  HTML     │  │  JSON     │  │  Model info / options   │ │
//! │  │  form     │  │  API      │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │      ┌─────────────────────────────────────────┐           │
//! │      │ Predictor: bucket → align → classify    │           │
//! │      └─────────────────────────────────────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod views;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stay_core::constants::{APP_NAME, APP_VERSION};
use stay_core::Predictor;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stay_server=debug,stay_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("{} v{} starting...", APP_NAME, APP_VERSION);
    tracing::info!(
        "Bundle: {} (bucketing {}, age banding {}, {})",
        config.model_bundle.display(),
        config.bucketing.as_str(),
        config.age_banding.as_str(),
        config.environment
    );

    // Load the model bundle; the server does not start without one
    let predictor = Predictor::load(&config.model_bundle, config.pipeline()).with_context(|| {
        format!("Failed to load model bundle {}", config.model_bundle.display())
    })?;

    let state = AppState {
        predictor: Arc::new(predictor),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Browser form
    let form_routes = Router::new()
        .route("/", get(handlers::form::show))
        .route("/predict", post(handlers::form::submit));

    // JSON API
    let api_routes = Router::new()
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/model", get(handlers::model::info))
        .route("/api/v1/options", get(handlers::model::options));

    let mut cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if !state.config.is_production() {
        cors = cors.allow_origin(Any);
    }

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(form_routes)
        .merge(api_routes)
        .layer(axum_middleware::from_fn(middleware::request_id::tag_request))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
