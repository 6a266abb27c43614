//! Weighted geographic data points.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HeatmapError, HeatmapResult};

fn default_weight() -> f64 {
    1.0
}

/// One data point to be represented on the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (WGS84)
    pub lat: f64,
    /// Longitude in degrees (WGS84)
    pub lng: f64,
    /// Multiplier applied to this point's kernel
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Kernel radius override in meters; the render config radius applies when absent
    #[serde(default)]
    pub radius_meters: Option<f64>,
}

impl GeoPoint {
    /// A point with unit weight.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            weight: 1.0,
            radius_meters: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    /// Check weight and radius override. Coordinates are checked by the projection.
    pub fn validate(&self) -> HeatmapResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(HeatmapError::invalid_config(format!(
                "point weight must be finite and non-negative, got {}",
                self.weight
            )));
        }
        if let Some(r) = self.radius_meters {
            if !r.is_finite() || r <= 0.0 {
                return Err(HeatmapError::invalid_config(format!(
                    "point radius must be positive, got {}",
                    r
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}
