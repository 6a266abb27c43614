//! Web Mercator coordinate math for the heatmap renderer.
//!
//! Implements the spherical Web Mercator projection from scratch without
//! external dependencies.

pub mod bounds;
pub mod mercator;

pub use bounds::{Extent, PixelBounds, PixelRect};
pub use mercator::{
    meters_per_pixel, project, radius_to_pixels, tile_range, unproject, validate_zoom, world_size,
    EARTH_CIRCUMFERENCE_M,
};
