//! Padded working rectangles in global pixel space.

use heatmap_common::{GeoBox, HeatmapError, HeatmapResult, TileRange, TILE_SIZE};
use tracing::debug;

use crate::mercator::{project, radius_to_pixels, tile_range, validate_zoom, world_size};

/// Half-open rectangle `[x0, x1) × [y0, y1)` of global pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl PixelRect {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> usize {
        (self.x1 - self.x0).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.y1 - self.y0).max(0) as usize
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Grow by `pad` pixels on every side.
    pub fn expand(&self, pad: i64) -> Self {
        Self::new(self.x0 - pad, self.y0 - pad, self.x1 + pad, self.y1 + pad)
    }

    /// Intersect with the world extent at `zoom`.
    pub fn clamp_to_world(&self, zoom: u32) -> Self {
        let size = world_size(zoom) as i64;
        Self::new(
            self.x0.clamp(0, size),
            self.y0.clamp(0, size),
            self.x1.clamp(0, size),
            self.y1.clamp(0, size),
        )
    }

    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x0 >= self.x0 && other.y0 >= self.y0 && other.x1 <= self.x1 && other.y1 <= self.y1
    }
}

/// What the unpadded rectangle covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// The box stretched outward to whole tiles, for tile pyramids.
    Tiles,
    /// Exactly the box's pixel footprint, for a single preview image.
    Viewport,
}

/// The padded rectangle a render call accumulates density into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBounds {
    pub zoom: u32,
    pub extent: Extent,
    /// Padded working rectangle, clamped to the world
    pub rect: PixelRect,
    /// Area the caller gets pixels for; always inside `rect`
    pub inner: PixelRect,
    /// Padding applied on each side before clamping
    pub pad_px: u32,
    /// Tiles touching the box
    pub tiles: TileRange,
}

impl PixelBounds {
    /// Derive the working rectangle for a box at a zoom.
    ///
    /// `max_radius_meters` is the largest kernel radius any point will use; it
    /// is converted at the box's worst-case latitude so the pad is never
    /// narrower than a kernel drawn anywhere inside the box.
    pub fn compute(
        bbox: &GeoBox,
        zoom: u32,
        max_radius_meters: f64,
        extent: Extent,
    ) -> HeatmapResult<Self> {
        validate_zoom(zoom)?;
        bbox.validate()?;
        if !max_radius_meters.is_finite() || max_radius_meters <= 0.0 {
            return Err(HeatmapError::invalid_config(format!(
                "kernel radius must be positive, got {}",
                max_radius_meters
            )));
        }

        let tiles = tile_range(bbox, zoom)?;
        let inner = match extent {
            Extent::Tiles => {
                let ts = TILE_SIZE as i64;
                PixelRect::new(
                    tiles.x_min as i64 * ts,
                    tiles.y_min as i64 * ts,
                    (tiles.x_max as i64 + 1) * ts,
                    (tiles.y_max as i64 + 1) * ts,
                )
            }
            Extent::Viewport => {
                let (x0, y0) = project(bbox.north, bbox.west, zoom)?;
                let (x1, y1) = project(bbox.south, bbox.east, zoom)?;
                PixelRect::new(
                    x0.floor() as i64,
                    y0.floor() as i64,
                    x1.floor() as i64 + 1,
                    y1.floor() as i64 + 1,
                )
                .clamp_to_world(zoom)
            }
        };

        let pad_px = radius_to_pixels(max_radius_meters, bbox.worst_case_latitude(), zoom)
            .ceil()
            .max(1.0);
        if pad_px > world_size(zoom) {
            return Err(HeatmapError::invalid_config(format!(
                "kernel radius of {} m spans more than the whole world at zoom {}",
                max_radius_meters, zoom
            )));
        }
        let pad_px = pad_px as u32;
        let rect = inner.expand(pad_px as i64).clamp_to_world(zoom);

        debug!(
            zoom,
            ?extent,
            pad_px,
            width = rect.width(),
            height = rect.height(),
            "Computed pixel bounds"
        );

        Ok(Self {
            zoom,
            extent,
            rect,
            inner,
            pad_px,
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.rect.width()
    }

    pub fn height(&self) -> usize {
        self.rect.height()
    }

    /// Translate a global pixel coordinate into the working raster's frame.
    #[inline]
    pub fn to_local(&self, px: f64, py: f64) -> (f64, f64) {
        (px - self.rect.x0 as f64, py - self.rect.y0 as f64)
    }

    /// Offset of a global pixel rectangle's top-left corner within the raster.
    pub fn local_offset(&self, global: &PixelRect) -> Option<(usize, usize)> {
        if !self.rect.contains_rect(global) {
            return None;
        }
        Some((
            (global.x0 - self.rect.x0) as usize,
            (global.y0 - self.rect.y0) as usize,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> GeoBox {
        GeoBox::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn test_tiles_extent_is_tile_aligned() {
        let b = PixelBounds::compute(&unit_box(), 10, 500.0, Extent::Tiles).unwrap();
        assert_eq!(b.inner.x0, 512 * 256);
        assert_eq!(b.inner.x1, 515 * 256);
        assert_eq!(b.inner.y0, 509 * 256);
        assert_eq!(b.inner.y1, 513 * 256);
        assert_eq!(b.rect, b.inner.expand(b.pad_px as i64));
    }

    #[test]
    fn test_pad_uses_worst_case_latitude() {
        // 500 m at lat 1 and zoom 10 is ~3.27 px
        let b = PixelBounds::compute(&unit_box(), 10, 500.0, Extent::Tiles).unwrap();
        assert_eq!(b.pad_px, 4);

        let north = PixelBounds::compute(&GeoBox::new(59.0, 0.0, 60.0, 1.0), 10, 500.0, Extent::Tiles)
            .unwrap();
        assert!(north.pad_px > b.pad_px);
    }

    #[test]
    fn test_viewport_extent_matches_box() {
        let b = PixelBounds::compute(&unit_box(), 10, 500.0, Extent::Viewport).unwrap();
        let (x0, _) = project(1.0, 0.0, 10).unwrap();
        let (x1, _) = project(0.0, 1.0, 10).unwrap();
        assert_eq!(b.inner.x0, x0.floor() as i64);
        assert_eq!(b.inner.x1, x1.floor() as i64 + 1);
        assert!(b.rect.contains_rect(&b.inner));
    }

    #[test]
    fn test_rect_clamped_to_world() {
        let b = PixelBounds::compute(&GeoBox::new(-10.0, -180.0, 10.0, -170.0), 3, 50_000.0, Extent::Tiles)
            .unwrap();
        assert_eq!(b.rect.x0, 0);
        assert!(b.rect.y0 >= 0);
    }

    #[test]
    fn test_local_offset() {
        let b = PixelBounds::compute(&unit_box(), 10, 500.0, Extent::Tiles).unwrap();
        let pad = b.pad_px as usize;
        assert_eq!(b.local_offset(&b.inner), Some((pad, pad)));
        assert_eq!(b.local_offset(&b.rect.expand(1)), None);
    }
}
