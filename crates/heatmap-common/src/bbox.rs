//! Geographic bounding box of a rendering area.

use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, HeatmapResult};
use crate::point::GeoPoint;
use crate::MAX_LATITUDE;

/// A rectangular box in WGS84 degrees.
///
/// In Web Mercator this renders as an axis-aligned rectangle on screen. Boxes
/// crossing the antimeridian are not supported: `west` must be strictly less
/// than `east`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBox {
    /// Create a new box from its four edges.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Parse a box from a "south,west,north,east" string.
    pub fn from_edge_string(s: &str) -> HeatmapResult<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(HeatmapError::invalid_config(format!(
                "invalid box '{}': expected 'south,west,north,east'",
                s
            )));
        }

        let mut edges = [0.0f64; 4];
        for (edge, part) in edges.iter_mut().zip(&parts) {
            *edge = part.parse().map_err(|_| {
                HeatmapError::invalid_config(format!("invalid number in box: {}", part))
            })?;
        }

        Ok(Self::new(edges[0], edges[1], edges[2], edges[3]))
    }

    /// Smallest box covering every point, or `None` for an empty slice.
    pub fn bounding(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self::new(first.lat, first.lng, first.lat, first.lng);
        Some(points.iter().skip(1).fold(init, |b, p| Self {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    /// Check the box invariants.
    ///
    /// Shape problems are `InvalidConfig`; edges beyond the Mercator latitude
    /// band are `OutOfProjectionRange`.
    pub fn validate(&self) -> HeatmapResult<()> {
        let edges = [self.south, self.west, self.north, self.east];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(HeatmapError::invalid_config(format!(
                "box edges must be finite: {:?}",
                self
            )));
        }
        if self.south >= self.north {
            return Err(HeatmapError::invalid_config(format!(
                "box south ({}) must be less than north ({})",
                self.south, self.north
            )));
        }
        if self.west >= self.east {
            return Err(HeatmapError::invalid_config(format!(
                "box west ({}) must be less than east ({}); antimeridian wrapping is not supported",
                self.west, self.east
            )));
        }
        if self.west < -180.0 || self.east > 180.0 {
            return Err(HeatmapError::invalid_config(format!(
                "box longitudes must lie within [-180, 180]: west={}, east={}",
                self.west, self.east
            )));
        }
        for (lat, lng) in [(self.south, self.west), (self.north, self.east)] {
            if lat.abs() >= MAX_LATITUDE {
                return Err(HeatmapError::out_of_range(lat, lng, "bounding box edge"));
            }
        }
        Ok(())
    }

    /// The latitude of the box where Mercator stretches distances the most.
    pub fn worst_case_latitude(&self) -> f64 {
        self.south.abs().max(self.north.abs())
    }

    /// Centre of the box.
    pub fn center(&self) -> (f64, f64) {
        ((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    /// Check if a coordinate is contained within this box (edges inclusive).
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}
