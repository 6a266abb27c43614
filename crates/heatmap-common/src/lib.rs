//! Common types shared across the heatmap rendering crates and services.

pub mod bbox;
pub mod config;
pub mod error;
pub mod point;
pub mod tile;

pub use bbox::GeoBox;
pub use config::{GradientKind, ParameterDefinition, ParameterType, RenderConfig};
pub use error::{HeatmapError, HeatmapResult};
pub use point::GeoPoint;
pub use tile::{TileCoord, TileRange, TILE_SIZE};

/// Deepest zoom level supported by the Web Mercator tile pyramid.
pub const MAX_ZOOM: u32 = 22;

/// Latitude limit of the spherical Web Mercator projection, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;
