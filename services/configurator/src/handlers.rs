//! HTTP handlers for parameter discovery, preview rendering and monitoring.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use heatmap_common::{GeoBox, HeatmapError, RenderConfig};
use metrics::{counter, histogram};
use renderer::{png, render_viewport, RenderPipeline, DEFAULT_BINS};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::state::AppState;

/// Size of the histogram image.
pub const HISTOGRAM_WIDTH: u32 = 300;
pub const HISTOGRAM_HEIGHT: u32 = 150;

// ============================================================================
// Errors
// ============================================================================

/// Failure of a request, rendered as a plain-text body.
#[derive(Debug)]
pub enum ApiError {
    Heatmap(HeatmapError),
    Internal(String),
}

impl From<HeatmapError> for ApiError {
    fn from(e: HeatmapError) -> Self {
        ApiError::Heatmap(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Heatmap(e) => (
                StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        }
        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message).into_response()
    }
}

// ============================================================================
// Request parsing
// ============================================================================

/// The area and zoom a preview covers, plus the parameters to render with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewRequest {
    pub bbox: GeoBox,
    pub zoom: u32,
    pub config: RenderConfig,
}

impl PreviewRequest {
    /// Accepts either `bbox=south,west,north,east` or the four edges as
    /// separate keys; render parameters fall back to their defaults.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, HeatmapError> {
        let bbox = match params.get("bbox") {
            Some(s) => GeoBox::from_edge_string(s)?,
            None => {
                let edge = |key: &str| -> Result<f64, HeatmapError> {
                    let raw = params
                        .get(key)
                        .ok_or_else(|| HeatmapError::invalid_config(format!("missing '{}'", key)))?;
                    raw.trim().parse().map_err(|_| {
                        HeatmapError::invalid_config(format!("invalid {}: {}", key, raw))
                    })
                };
                GeoBox::new(edge("south")?, edge("west")?, edge("north")?, edge("east")?)
            }
        };

        let raw_zoom = params
            .get("zoom")
            .ok_or_else(|| HeatmapError::invalid_config("missing 'zoom'"))?;
        let zoom = raw_zoom
            .trim()
            .parse()
            .map_err(|_| HeatmapError::invalid_config(format!("invalid zoom: {}", raw_zoom)))?;

        Ok(Self {
            bbox,
            zoom,
            config: RenderConfig::from_string_args(params)?,
        })
    }
}

fn png_response(bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response()
}

/// Run a CPU-bound render off the async runtime and record its metrics.
async fn run_blocking<F>(endpoint: &'static str, job: F) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce() -> Result<Vec<u8>, HeatmapError> + Send + 'static,
{
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| ApiError::Internal(format!("render task failed: {}", e)))?;

    let elapsed = start.elapsed();
    histogram!("heatmap_render_duration_seconds", "endpoint" => endpoint).record(elapsed.as_secs_f64());
    match &result {
        Ok(bytes) => {
            counter!("heatmap_renders_total", "endpoint" => endpoint).increment(1);
            info!(endpoint, bytes = bytes.len(), elapsed_ms = elapsed.as_millis() as u64, "Rendered");
        }
        Err(_) => counter!("heatmap_render_errors_total", "endpoint" => endpoint).increment(1),
    }
    Ok(result?)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /config - Tunable parameters with their types and defaults
pub async fn config_handler() -> impl IntoResponse {
    Json(json!({ "parameters": RenderConfig::parameter_definitions() }))
}

/// GET /render - Preview image of the point set over a box
#[instrument(skip(state))]
pub async fn render_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let request = PreviewRequest::from_query(&params)?;

    let bytes = run_blocking("render", move || {
        let pipeline = RenderPipeline::new(request.config, request.bbox, request.zoom)?
            .with_limits(state.limits);
        let image = render_viewport(pipeline, &state.points)?
            .image()
            .ok_or_else(|| HeatmapError::invalid_config("viewport lies outside the raster"))?;
        png::encode_png(&image)
    })
    .await?;

    Ok(png_response(bytes))
}

/// GET /histogram - Distribution of densities over a box, as a bar chart
#[instrument(skip(state))]
pub async fn histogram_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let request = PreviewRequest::from_query(&params)?;

    let bytes = run_blocking("histogram", move || {
        let pipeline = RenderPipeline::new(request.config, request.bbox, request.zoom)?
            .with_limits(state.limits);
        let chart = render_viewport(pipeline, &state.points)?
            .histogram(DEFAULT_BINS)
            .render(HISTOGRAM_WIDTH, HISTOGRAM_HEIGHT);
        png::encode_png(&chart)
    })
    .await?;

    Ok(png_response(bytes))
}

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
