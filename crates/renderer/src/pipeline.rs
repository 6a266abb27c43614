//! The render pipeline: validate, compute bounds, accumulate once, slice lazily.
//!
//! Each stage is its own type, so stages can only run in order:
//!
//! ```text
//! RenderPipeline ──compute_bounds──▶ BoundsComputed ──accumulate──▶ Surface ──tiles──▶ Tiles
//!  (Initialized)                                                    (Accumulated)     (Slicing → Done)
//! ```
//!
//! The whole raster is accumulated before any tile is produced. A pixel near
//! a tile edge may receive density from a point in a neighbouring tile, and
//! one pass over a padded raster is what keeps tile edges seamless. All tiles
//! of one call share the same normalization peak and palette.
//!
//! A failure in any stage aborts the call; no partial results are returned.

use heatmap_common::{
    GeoBox, GeoPoint, HeatmapError, HeatmapResult, RenderConfig, TileCoord, TileRange,
};
use image::RgbaImage;
use projection::{project, radius_to_pixels, validate_zoom, Extent, PixelBounds, PixelRect};
use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::density::{project_points, DensityRaster, ProjectedPoint, MIN_KERNEL_RADIUS_PX};
use crate::gradient::Palette;
use crate::histogram::DensityHistogram;
use crate::limits::{RenderEstimate, RenderLimits, SlowRenderWarning};
use crate::tiles::{self, IntoTiles, Tile, Tiles};

/// Where a render call currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Initialized,
    BoundsComputed,
    Accumulated,
    Slicing,
    Done,
}

/// A validated render request.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    config: RenderConfig,
    bbox: GeoBox,
    zoom: u32,
    extent: Extent,
    limits: RenderLimits,
}

impl RenderPipeline {
    /// Validate the request. Fails with `InvalidConfig` (or
    /// `OutOfProjectionRange` for a polar box) before any computation.
    ///
    /// Starts with [`RenderLimits::default`]; the `HEATMAP_*` environment
    /// overrides apply only through `with_limits(RenderLimits::from_env())`.
    pub fn new(config: RenderConfig, bbox: GeoBox, zoom: u32) -> HeatmapResult<Self> {
        config.validate()?;
        validate_zoom(zoom)?;
        bbox.validate()?;

        Ok(Self {
            config,
            bbox,
            zoom,
            extent: Extent::Tiles,
            limits: RenderLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: RenderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Render exactly the box (a single preview image) instead of whole tiles.
    pub fn for_viewport(mut self) -> Self {
        self.extent = Extent::Viewport;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn stage(&self) -> RenderStage {
        RenderStage::Initialized
    }

    /// Derive the padded pixel bounds and tile range, and project every point.
    ///
    /// Any point outside the projection band fails the call.
    #[instrument(skip_all, fields(zoom = self.zoom, points = points.len()))]
    pub fn compute_bounds(self, points: &[GeoPoint]) -> HeatmapResult<BoundsComputed> {
        let base = PixelBounds::compute(&self.bbox, self.zoom, self.config.radius_meters, self.extent)?;

        // only overrides whose kernel can reach the unpadded area widen the pad
        let max_radius = points
            .iter()
            .filter_map(|p| p.radius_meters.map(|r| (p, r)))
            .filter(|(_, r)| r.is_finite() && *r > self.config.radius_meters)
            .filter(|(p, r)| kernel_reaches(p, *r, &base.inner, self.zoom))
            .map(|(_, r)| r)
            .fold(self.config.radius_meters, f64::max);

        let bounds = if max_radius > self.config.radius_meters {
            PixelBounds::compute(&self.bbox, self.zoom, max_radius, self.extent)?
        } else {
            base
        };

        // check sizes before projecting anything
        self.limits
            .check(&RenderEstimate::new(points.len(), bounds.rect.area(), []))?;

        let projected = project_points(points, &bounds, self.config.radius_meters)?;
        let estimate = RenderEstimate::new(
            points.len(),
            bounds.rect.area(),
            projected.iter().map(|p| p.radius_px),
        );
        let warning = self.limits.warning_for(&estimate);
        if let Some(w) = &warning {
            warn!(%w, "Render exceeds the slow-render threshold");
        }

        debug!(
            tiles = bounds.tiles.len(),
            raster_pixels = estimate.raster_pixels,
            kernel_cells = estimate.kernel_cells,
            "Bounds computed"
        );

        Ok(BoundsComputed {
            config: self.config,
            bounds,
            points: projected,
            estimate,
            warning,
        })
    }
}

/// Whether a kernel of `radius_meters` around `point` overlaps a global pixel rectangle.
///
/// Unprojectable points report `false`; `project_points` rejects them later.
fn kernel_reaches(point: &GeoPoint, radius_meters: f64, rect: &PixelRect, zoom: u32) -> bool {
    let Ok((x, y)) = project(point.lat, point.lng, zoom) else {
        return false;
    };
    let r = radius_to_pixels(radius_meters, point.lat, zoom).max(MIN_KERNEL_RADIUS_PX);
    x + r >= rect.x0 as f64
        && y + r >= rect.y0 as f64
        && x - r <= rect.x1 as f64
        && y - r <= rect.y1 as f64
}

/// Bounds and projected points, ready to accumulate.
///
/// Inspect [`warning`](Self::warning) and drop this value to abort an
/// expensive render before any density work happens.
#[derive(Debug, Clone)]
pub struct BoundsComputed {
    config: RenderConfig,
    bounds: PixelBounds,
    points: Vec<ProjectedPoint>,
    estimate: RenderEstimate,
    warning: Option<SlowRenderWarning>,
}

impl BoundsComputed {
    pub fn bounds(&self) -> &PixelBounds {
        &self.bounds
    }

    pub fn tile_range(&self) -> &TileRange {
        &self.bounds.tiles
    }

    pub fn estimate(&self) -> &RenderEstimate {
        &self.estimate
    }

    pub fn warning(&self) -> Option<&SlowRenderWarning> {
        self.warning.as_ref()
    }

    pub fn stage(&self) -> RenderStage {
        RenderStage::BoundsComputed
    }

    /// Run the density accumulation and build the palette.
    #[instrument(skip_all, fields(points = self.points.len()))]
    pub fn accumulate(self) -> HeatmapResult<Surface> {
        let palette = Palette::build(self.config.gradient, self.config.bucket_count)?;
        let raster = DensityRaster::accumulate(self.bounds.width(), self.bounds.height(), &self.points);
        let peak = raster.max();

        debug!(peak, buckets = palette.len(), "Density accumulated");

        Ok(Surface {
            bounds: self.bounds,
            raster,
            peak,
            palette,
            warning: self.warning,
        })
    }
}

/// A fully accumulated raster plus its palette. Read-only from here on.
#[derive(Debug, Clone)]
pub struct Surface {
    bounds: PixelBounds,
    raster: DensityRaster,
    peak: f32,
    palette: Palette,
    warning: Option<SlowRenderWarning>,
}

impl Surface {
    pub fn bounds(&self) -> &PixelBounds {
        &self.bounds
    }

    pub fn tile_range(&self) -> &TileRange {
        &self.bounds.tiles
    }

    pub fn raster(&self) -> &DensityRaster {
        &self.raster
    }

    /// Normalization ceiling: the raster's maximum density.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn warning(&self) -> Option<&SlowRenderWarning> {
        self.warning.as_ref()
    }

    pub fn stage(&self) -> RenderStage {
        RenderStage::Accumulated
    }

    /// Colorize an arbitrary global pixel rectangle inside the raster.
    pub fn paint(&self, rect: &PixelRect) -> Option<RgbaImage> {
        tiles::paint(&self.raster, &self.bounds, &self.palette, self.peak, rect)
    }

    /// Render one tile of the surface's tile range.
    pub fn tile(&self, coord: &TileCoord) -> Option<Tile> {
        if !self.bounds.tiles.contains(coord) {
            return None;
        }
        let image = self.paint(&tiles::tile_rect(coord))?;
        Some(Tile {
            coord: *coord,
            image,
        })
    }

    /// Lazy tiles in row-major order. Can be called again to restart.
    pub fn tiles(&self) -> Tiles<'_> {
        Tiles::new(self)
    }

    pub fn into_tiles(self) -> IntoTiles {
        IntoTiles::new(self)
    }

    /// Render every tile on the rayon pool, keeping row-major order.
    pub fn render_all_parallel(&self) -> Vec<Tile> {
        let range = self.bounds.tiles;
        (0..range.len())
            .into_par_iter()
            .filter_map(|i| range.nth(i).and_then(|c| self.tile(&c)))
            .collect()
    }

    /// The unpadded area as one image: the whole tile block or the viewport.
    pub fn image(&self) -> Option<RgbaImage> {
        self.paint(&self.bounds.inner)
    }

    /// Histogram of the non-zero raw densities inside the unpadded area.
    pub fn histogram(&self, bins: usize) -> DensityHistogram {
        let inner = &self.bounds.inner;
        let (w, h) = (inner.width(), inner.height());
        match self.bounds.local_offset(inner) {
            Some((ox, oy)) => DensityHistogram::from_values(
                (0..h).flat_map(|row| self.raster.row_slice(ox, oy + row, w).iter().copied()),
                bins,
            ),
            None => DensityHistogram::from_values(std::iter::empty(), bins),
        }
    }
}

/// The rendered tiles of one call, produced lazily on iteration.
#[derive(Debug, Clone)]
pub struct TileSequence {
    surface: Surface,
}

impl TileSequence {
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn iter(&self) -> Tiles<'_> {
        self.surface.tiles()
    }

    pub fn len(&self) -> usize {
        self.surface.tile_range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn render_all_parallel(&self) -> Vec<Tile> {
        self.surface.render_all_parallel()
    }
}

impl<'a> IntoIterator for &'a TileSequence {
    type Item = Tile;
    type IntoIter = Tiles<'a>;

    fn into_iter(self) -> Tiles<'a> {
        self.iter()
    }
}

impl IntoIterator for TileSequence {
    type Item = Tile;
    type IntoIter = IntoTiles;

    fn into_iter(self) -> IntoTiles {
        self.surface.into_tiles()
    }
}

/// Render points into the XYZ tiles covering `bbox` at `zoom`.
///
/// The density raster is computed once; tiles are painted as the returned
/// sequence is iterated, in row-major order (`y` outer, `x` inner).
///
/// Uses the default [`RenderLimits`]. Callers that honour the environment
/// build a [`RenderPipeline`] with `with_limits(RenderLimits::from_env())`.
pub fn render_heatmap_to_tiles(
    config: &RenderConfig,
    bbox: &GeoBox,
    zoom: u32,
    points: &[GeoPoint],
) -> HeatmapResult<TileSequence> {
    let surface = RenderPipeline::new(*config, *bbox, zoom)?
        .compute_bounds(points)?
        .accumulate()?;
    Ok(TileSequence { surface })
}

/// Render points into one image covering exactly `bbox` at `zoom`.
pub fn render_heatmap_to_image(
    config: &RenderConfig,
    bbox: &GeoBox,
    zoom: u32,
    points: &[GeoPoint],
) -> HeatmapResult<RgbaImage> {
    render_viewport(RenderPipeline::new(*config, *bbox, zoom)?, points)?
        .image()
        .ok_or_else(|| HeatmapError::invalid_config("viewport lies outside the raster"))
}

/// Distribution of raw densities over `bbox`, for tuning bucket count and radius.
pub fn density_histogram(
    config: &RenderConfig,
    bbox: &GeoBox,
    zoom: u32,
    points: &[GeoPoint],
    bins: usize,
) -> HeatmapResult<DensityHistogram> {
    Ok(render_viewport(RenderPipeline::new(*config, *bbox, zoom)?, points)?.histogram(bins))
}

/// Run a pipeline over the exact box extent.
pub fn render_viewport(pipeline: RenderPipeline, points: &[GeoPoint]) -> HeatmapResult<Surface> {
    pipeline.for_viewport().compute_bounds(points)?.accumulate()
}
