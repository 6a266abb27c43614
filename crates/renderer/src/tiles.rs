//! Slicing a rendered surface into 256×256 XYZ tiles.

use heatmap_common::{HeatmapResult, TileCoord, TILE_SIZE};
use image::RgbaImage;
use projection::{PixelBounds, PixelRect};

use crate::density::DensityRaster;
use crate::gradient::Palette;
use crate::pipeline::{RenderStage, Surface};
use crate::png;

/// One rendered tile. Owns its pixels; holds nothing back into the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub coord: TileCoord,
    pub image: RgbaImage,
}

impl Tile {
    pub fn x(&self) -> u32 {
        self.coord.x
    }

    pub fn y(&self) -> u32 {
        self.coord.y
    }

    /// True when every pixel has zero alpha.
    pub fn is_transparent(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    pub fn encode_png(&self) -> HeatmapResult<Vec<u8>> {
        png::encode_png(&self.image)
    }
}

/// Global pixel rectangle covered by a tile.
pub fn tile_rect(coord: &TileCoord) -> PixelRect {
    let (x0, y0) = coord.origin_pixel();
    let size = TILE_SIZE as i64;
    PixelRect::new(x0 as i64, y0 as i64, x0 as i64 + size, y0 as i64 + size)
}

/// Colorize the part of the raster under a global pixel rectangle.
///
/// Densities are normalized by `peak` and classified into palette buckets.
/// Returns `None` when the rectangle is not wholly inside the raster.
pub fn paint(
    raster: &DensityRaster,
    bounds: &PixelBounds,
    palette: &Palette,
    peak: f32,
    rect: &PixelRect,
) -> Option<RgbaImage> {
    let (ox, oy) = bounds.local_offset(rect)?;
    let (w, h) = (rect.width(), rect.height());
    let mut image = RgbaImage::new(w as u32, h as u32);
    if w == 0 || h == 0 {
        return Some(image);
    }

    for (row, out) in image.chunks_exact_mut(w * 4).enumerate() {
        let src = raster.row_slice(ox, oy + row, w);
        for (px, &v) in out.chunks_exact_mut(4).zip(src) {
            let normalized = if peak > 0.0 { v / peak } else { 0.0 };
            px.copy_from_slice(&palette.color_for(normalized).to_array());
        }
    }

    Some(image)
}

/// Position within a surface's tile range.
#[derive(Debug, Clone, Copy)]
struct TileCursor {
    next: usize,
    end: usize,
}

impl TileCursor {
    fn new(surface: &Surface) -> Self {
        Self {
            next: 0,
            end: surface.tile_range().len(),
        }
    }

    fn advance(&mut self, surface: &Surface) -> Option<Tile> {
        while self.next < self.end {
            let index = self.next;
            self.next += 1;
            if let Some(tile) = surface.tile_range().nth(index).and_then(|c| surface.tile(&c)) {
                return Some(tile);
            }
        }
        None
    }

    fn remaining(&self) -> usize {
        self.end - self.next
    }

    fn stage(&self) -> RenderStage {
        if self.next >= self.end {
            RenderStage::Done
        } else {
            RenderStage::Slicing
        }
    }
}

/// Lazy, row-major tile iterator borrowing a surface.
///
/// Tiles are painted only when `next` is called; dropping the iterator early
/// costs nothing for the tiles not yet produced. A tile-extent surface yields
/// every tile of its range. A viewport surface yields only the tiles that lie
/// wholly inside its raster.
#[derive(Debug, Clone)]
pub struct Tiles<'a> {
    surface: &'a Surface,
    cursor: TileCursor,
}

impl<'a> Tiles<'a> {
    pub(crate) fn new(surface: &'a Surface) -> Self {
        Self {
            surface,
            cursor: TileCursor::new(surface),
        }
    }

    /// `Slicing` while tiles remain, `Done` once exhausted.
    pub fn stage(&self) -> RenderStage {
        self.cursor.stage()
    }
}

impl Iterator for Tiles<'_> {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        self.cursor.advance(self.surface)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // coordinates whose tile is not wholly inside the raster are skipped
        (0, Some(self.cursor.remaining()))
    }
}

/// Owning counterpart of [`Tiles`].
#[derive(Debug)]
pub struct IntoTiles {
    surface: Surface,
    cursor: TileCursor,
}

impl IntoTiles {
    pub(crate) fn new(surface: Surface) -> Self {
        let cursor = TileCursor::new(&surface);
        Self { surface, cursor }
    }

    pub fn stage(&self) -> RenderStage {
        self.cursor.stage()
    }
}

impl Iterator for IntoTiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Tile> {
        self.cursor.advance(&self.surface)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // coordinates whose tile is not wholly inside the raster are skipped
        (0, Some(self.cursor.remaining()))
    }
}
