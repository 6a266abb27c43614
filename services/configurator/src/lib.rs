//! Heatmap configurator service library.
//!
//! Serves preview renders and density histograms of a fixed point set so
//! render parameters can be tuned interactively.

pub mod config;
pub mod handlers;
pub mod points;
pub mod state;

use std::sync::Arc;

use axum::{extract::Extension, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/config", get(handlers::config_handler))
        .route("/render", get(handlers::render_handler))
        .route("/histogram", get(handlers::histogram_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
