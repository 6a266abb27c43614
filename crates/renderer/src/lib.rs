//! Heatmap rendering onto Web Mercator XYZ tiles.
//!
//! Points are accumulated into one density raster covering the requested
//! box plus a kernel-radius margin, normalized by the raster peak, bucketed
//! through a color palette and sliced into 256×256 tiles:
//! - [`density`]: kernel accumulation
//! - [`gradient`]: HSV palettes and bucket classification
//! - [`pipeline`]: staged render calls
//! - [`tiles`]: lazy tile slicing
//! - [`png`]: tile encoding
//! - [`histogram`]: density distribution for tuning

pub mod density;
pub mod gradient;
pub mod histogram;
pub mod limits;
pub mod pipeline;
pub mod png;
pub mod tiles;

pub use density::{kernel, DensityRaster};
pub use gradient::{Color, Palette};
pub use histogram::{DensityHistogram, DEFAULT_BINS};
pub use limits::{RenderEstimate, RenderLimits, SlowRenderWarning};
pub use pipeline::{
    density_histogram, render_heatmap_to_image, render_heatmap_to_tiles, render_viewport,
    BoundsComputed, RenderPipeline, RenderStage, Surface, TileSequence,
};
pub use png::encode_png;
pub use tiles::{IntoTiles, Tile, Tiles};
