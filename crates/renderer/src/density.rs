//! Kernel density accumulation over the padded working raster.
//!
//! Every point adds `weight * (1 - t²)²` to each cell whose centre lies within
//! the point's kernel radius, where `t` is the distance divided by the radius.
//! The falloff reaches zero continuously at the radius so kernels leave no
//! visible rings.
//!
//! ## Parallelism
//!
//! The raster is split into disjoint row bands processed on the rayon pool.
//! Each band visits every candidate point and writes only its own rows, so no
//! locking is needed. A cell's contributions are always summed in input point
//! order, which makes the output identical for any thread count.

use heatmap_common::{GeoPoint, HeatmapError, HeatmapResult};
use projection::{project, radius_to_pixels, PixelBounds};
use rayon::prelude::*;
use tracing::debug;

/// Kernels never shrink below one pixel so every point stays visible.
pub const MIN_KERNEL_RADIUS_PX: f64 = 1.0;

/// Minimum cells before accumulation is spread across threads
const PARALLEL_THRESHOLD: usize = 256 * 256;

/// Minimum rows per worker band
const MIN_BAND_ROWS: usize = 16;

/// Compact smooth falloff, evaluated on the squared normalized distance.
#[inline]
pub fn kernel_sq(t_sq: f64) -> f64 {
    if (0.0..1.0).contains(&t_sq) {
        let s = 1.0 - t_sq;
        s * s
    } else {
        0.0
    }
}

/// `kernel(t) = (1 - t²)²` for `t` in `[0, 1]`, else 0.
#[inline]
pub fn kernel(t: f64) -> f64 {
    if (0.0..=1.0).contains(&t) {
        kernel_sq(t * t)
    } else {
        0.0
    }
}

/// A point translated into the raster's local pixel frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub radius_px: f64,
    pub weight: f64,
}

impl ProjectedPoint {
    /// Whether any part of the kernel disc overlaps a `width × height` raster.
    fn touches(&self, width: usize, height: usize) -> bool {
        self.x + self.radius_px >= 0.0
            && self.y + self.radius_px >= 0.0
            && self.x - self.radius_px <= width as f64
            && self.y - self.radius_px <= height as f64
    }
}

/// Project points into the raster frame and resolve their kernel radii.
///
/// Any point outside the projection band fails the whole call, with its index
/// in the error context. Points of zero weight and points whose kernel lies
/// entirely outside the raster are dropped without error.
pub fn project_points(
    points: &[GeoPoint],
    bounds: &PixelBounds,
    default_radius_meters: f64,
) -> HeatmapResult<Vec<ProjectedPoint>> {
    let (width, height) = (bounds.width(), bounds.height());
    let mut projected = Vec::with_capacity(points.len());

    for (i, p) in points.iter().enumerate() {
        p.validate()
            .map_err(|e| HeatmapError::invalid_config(format!("point {}: {}", i, e)))?;

        let (px, py) = project(p.lat, p.lng, bounds.zoom).map_err(|_| {
            HeatmapError::out_of_range(p.lat, p.lng, format!("point {} cannot be projected", i))
        })?;

        let radius_m = p.radius_meters.unwrap_or(default_radius_meters);
        let radius_px = radius_to_pixels(radius_m, p.lat, bounds.zoom).max(MIN_KERNEL_RADIUS_PX);
        let (x, y) = bounds.to_local(px, py);

        let point = ProjectedPoint {
            x,
            y,
            radius_px,
            weight: p.weight,
        };
        if p.weight > 0.0 && point.touches(width, height) {
            projected.push(point);
        }
    }

    debug!(
        input = points.len(),
        kept = projected.len(),
        "Projected points into raster frame"
    );
    Ok(projected)
}

/// A row-major grid of density accumulators, one per raster pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityRaster {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl DensityRaster {
    /// An all-zero raster.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Accumulate every point's kernel into a fresh `width × height` raster.
    pub fn accumulate(width: usize, height: usize, points: &[ProjectedPoint]) -> Self {
        let mut raster = Self::zeros(width, height);
        if width == 0 || height == 0 || points.is_empty() {
            return raster;
        }

        let cells = width * height;
        let band_rows = if cells < PARALLEL_THRESHOLD {
            height
        } else {
            (height / (rayon::current_num_threads() * 4)).max(MIN_BAND_ROWS)
        };

        if band_rows >= height {
            stamp_band(&mut raster.values, width, 0, height, points);
        } else {
            raster
                .values
                .par_chunks_mut(band_rows * width)
                .enumerate()
                .for_each(|(band, chunk)| {
                    let row_start = band * band_rows;
                    let rows = chunk.len() / width;
                    stamp_band(chunk, width, row_start, row_start + rows, points);
                });
        }

        debug!(width, height, band_rows, points = points.len(), "Accumulated density raster");
        raster
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Largest accumulated value, or 0 for an empty raster.
    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0f32, f32::max)
    }

    /// Row `y`, columns `x..x + len`.
    #[inline]
    pub fn row_slice(&self, x: usize, y: usize, len: usize) -> &[f32] {
        let start = y * self.width + x;
        &self.values[start..start + len]
    }
}

/// Stamp kernels into the rows `row_start..row_end` held by `band`.
fn stamp_band(
    band: &mut [f32],
    width: usize,
    row_start: usize,
    row_end: usize,
    points: &[ProjectedPoint],
) {
    let last_col = width as f64 - 1.0;

    for p in points {
        let r = p.radius_px;
        if p.y + r < row_start as f64 || p.y - r > row_end as f64 {
            continue;
        }

        let r_sq = r * r;
        // rows whose centre (j + 0.5) is within r of p.y
        let j0 = ((p.y - 0.5 - r).ceil().max(row_start as f64)) as usize;
        let j1 = (p.y - 0.5 + r).floor().min(row_end as f64 - 1.0);
        if j1 < j0 as f64 {
            continue;
        }

        for j in j0..=j1 as usize {
            let dy = j as f64 + 0.5 - p.y;
            let half = (r_sq - dy * dy).max(0.0).sqrt();
            let i0 = (p.x - 0.5 - half).ceil().max(0.0);
            let i1 = (p.x - 0.5 + half).floor().min(last_col);
            if i1 < i0 {
                continue;
            }

            let row = &mut band[(j - row_start) * width..(j - row_start + 1) * width];
            for i in i0 as usize..=i1 as usize {
                let dx = i as f64 + 0.5 - p.x;
                let k = kernel_sq((dx * dx + dy * dy) / r_sq);
                if k > 0.0 {
                    row[i] += (p.weight * k) as f32;
                }
            }
        }
    }
}
