//! Common test fixtures for heatmap tests.

use std::io::Write;

use heatmap_common::{GeoBox, GeoPoint, GradientKind, RenderConfig};
use tempfile::NamedTempFile;

/// Standard bounding boxes.
pub mod bbox {
    use heatmap_common::GeoBox;

    /// One degree square just north-east of (0, 0)
    pub const EQUATOR_DEGREE: GeoBox = GeoBox {
        south: 0.0,
        west: 0.0,
        north: 1.0,
        east: 1.0,
    };

    /// Central London
    pub const LONDON: GeoBox = GeoBox {
        south: 51.45,
        west: -0.2,
        north: 51.55,
        east: 0.0,
    };

    /// Arctic Norway, where Mercator stretching is strong
    pub const TROMSO: GeoBox = GeoBox {
        south: 69.6,
        west: 18.8,
        north: 69.7,
        east: 19.1,
    };

    /// South edge not below north edge
    pub const INVERTED: GeoBox = GeoBox {
        south: 1.0,
        west: 0.0,
        north: 0.0,
        east: 1.0,
    };

    /// North edge beyond the projection limit
    pub const POLAR: GeoBox = GeoBox {
        south: 80.0,
        west: 0.0,
        north: 89.0,
        east: 1.0,
    };
}

/// 10 green-to-red buckets with 500 m kernels.
pub fn small_config() -> RenderConfig {
    RenderConfig::new(GradientKind::GreenToRed, 10, 500.0)
}

/// The defaults used by the configurator.
pub fn default_config() -> RenderConfig {
    RenderConfig::default()
}

/// A single point at the centre of a box.
pub fn center_point(bbox: &GeoBox) -> GeoPoint {
    let (lat, lng) = bbox.center();
    GeoPoint::new(lat, lng)
}

/// Write points as `lat,lng,weight` lines to a temporary file.
pub fn write_points_csv(points: &[GeoPoint]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp points file");
    writeln!(file, "lat,lng,weight").expect("write header");
    for p in points {
        writeln!(file, "{},{},{}", p.lat, p.lng, p.weight).expect("write point");
    }
    file.flush().expect("flush points file");
    file
}
