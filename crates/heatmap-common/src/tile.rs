//! XYZ tile addressing for the Web Mercator pyramid.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::GeoBox;

/// Edge length of a tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A tile coordinate (z/x/y), origin at the north-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Global pixel coordinate of the tile's top-left corner.
    pub fn origin_pixel(&self) -> (u64, u64) {
        (
            self.x as u64 * TILE_SIZE as u64,
            self.y as u64 * TILE_SIZE as u64,
        )
    }

    /// Geographic extent of this tile.
    pub fn bounds(&self) -> GeoBox {
        let n = (1u64 << self.z) as f64;

        let west = self.x as f64 / n * 360.0 - 180.0;
        let east = (self.x + 1) as f64 / n * 360.0 - 180.0;

        let north = (std::f64::consts::PI * (1.0 - 2.0 * self.y as f64 / n))
            .sinh()
            .atan()
            .to_degrees();
        let south = (std::f64::consts::PI * (1.0 - 2.0 * (self.y + 1) as f64 / n))
            .sinh()
            .atan()
            .to_degrees();

        GeoBox::new(south, west, north, east)
    }
}

/// An inclusive block of tiles at one zoom level.
///
/// Enumeration is row-major: `y` outer (north to south), `x` inner (west to
/// east). The order carries no meaning beyond being fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRange {
    pub zoom: u32,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl TileRange {
    pub fn new(zoom: u32, x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max);
        Self {
            zoom,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn xs(&self) -> RangeInclusive<u32> {
        self.x_min..=self.x_max
    }

    pub fn ys(&self) -> RangeInclusive<u32> {
        self.y_min..=self.y_max
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Number of tiles in the range.
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.z == self.zoom && self.xs().contains(&coord.x) && self.ys().contains(&coord.y)
    }

    /// The `index`-th tile in row-major order.
    pub fn nth(&self, index: usize) -> Option<TileCoord> {
        if index >= self.len() {
            return None;
        }
        let w = self.width() as usize;
        Some(TileCoord::new(
            self.zoom,
            self.x_min + (index % w) as u32,
            self.y_min + (index / w) as u32,
        ))
    }

    /// All tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.len()).filter_map(move |i| self.nth(i))
    }
}
