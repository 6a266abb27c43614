//! Application state shared by the request handlers.

use heatmap_common::GeoPoint;
use metrics_exporter_prometheus::PrometheusHandle;
use renderer::RenderLimits;

/// Shared application state.
pub struct AppState {
    /// The point set every request renders
    pub points: Vec<GeoPoint>,
    pub limits: RenderLimits,
    /// Absent when no recorder is installed (tests)
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(points: Vec<GeoPoint>, limits: RenderLimits) -> Self {
        Self {
            points,
            limits,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
