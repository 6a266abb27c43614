//! Input limits and render cost estimates.
//!
//! Accumulation costs O(points × r²). Hard limits reject inputs that would
//! exhaust memory; the soft limit only produces a [`SlowRenderWarning`].

use std::f64::consts::PI;
use std::fmt;

use heatmap_common::{HeatmapError, HeatmapResult};

/// Bounds on the size of a single render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLimits {
    /// Maximum number of input points.
    pub max_points: usize,

    /// Maximum number of cells in the padded working raster.
    pub max_raster_pixels: u64,

    /// Estimated kernel-cell visits above which a render is flagged as slow.
    pub slow_kernel_cells: f64,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            max_points: 5_000_000,
            max_raster_pixels: 64 * 1024 * 1024,
            slow_kernel_cells: 2.0e9,
        }
    }
}

impl RenderLimits {
    /// Load limits from environment variables.
    pub fn from_env() -> Self {
        let mut limits = Self::default();

        if let Ok(val) = std::env::var("HEATMAP_MAX_POINTS") {
            if let Ok(n) = val.parse() {
                limits.max_points = n;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_MAX_RASTER_PIXELS") {
            if let Ok(n) = val.parse() {
                limits.max_raster_pixels = n;
            }
        }

        if let Ok(val) = std::env::var("HEATMAP_SLOW_KERNEL_CELLS") {
            if let Ok(n) = val.parse() {
                limits.slow_kernel_cells = n;
            }
        }

        limits
    }

    /// Reject estimates that break a hard limit.
    pub fn check(&self, estimate: &RenderEstimate) -> HeatmapResult<()> {
        if estimate.point_count > self.max_points {
            return Err(HeatmapError::invalid_config(format!(
                "{} points exceeds the limit of {}",
                estimate.point_count, self.max_points
            )));
        }
        if estimate.raster_pixels > self.max_raster_pixels {
            return Err(HeatmapError::invalid_config(format!(
                "working raster of {} pixels exceeds the limit of {}; use a smaller box or zoom",
                estimate.raster_pixels, self.max_raster_pixels
            )));
        }
        Ok(())
    }

    /// A warning if the estimate crosses the soft limit.
    pub fn warning_for(&self, estimate: &RenderEstimate) -> Option<SlowRenderWarning> {
        (estimate.kernel_cells > self.slow_kernel_cells).then_some(SlowRenderWarning {
            estimate: *estimate,
            threshold: self.slow_kernel_cells,
        })
    }
}

/// Predicted size of a render, computed before accumulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderEstimate {
    pub point_count: usize,
    pub raster_pixels: u64,
    /// Sum of kernel disc areas in pixels
    pub kernel_cells: f64,
}

impl RenderEstimate {
    pub fn new(point_count: usize, raster_pixels: u64, radii_px: impl IntoIterator<Item = f64>) -> Self {
        let kernel_cells = radii_px.into_iter().map(|r| PI * r * r).sum();
        Self {
            point_count,
            raster_pixels,
            kernel_cells,
        }
    }
}

/// Non-fatal signal that a render is expected to take a long time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowRenderWarning {
    pub estimate: RenderEstimate,
    pub threshold: f64,
}

impl fmt::Display for SlowRenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slow render: ~{:.0} kernel cells for {} points (threshold {:.0})",
            self.estimate.kernel_cells, self.estimate.point_count, self.threshold
        )
    }
}
