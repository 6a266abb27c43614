//! Spherical Web Mercator (EPSG:3857) in global pixel space.
//!
//! Global pixel coordinates at zoom `z` span `[0, 256 * 2^z)` on both axes,
//! with the origin at the north-west corner of the projection. Pixels live in
//! a world 8 zoom levels deeper than tiles because tiles are 2^8 pixels wide.

use std::f64::consts::PI;

use heatmap_common::{
    GeoBox, HeatmapError, HeatmapResult, TileRange, MAX_LATITUDE, MAX_ZOOM, TILE_SIZE,
};

/// Equatorial circumference of the WGS84 ellipsoid in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Width (and height) of the world in pixels at `zoom`.
#[inline]
pub fn world_size(zoom: u32) -> f64 {
    TILE_SIZE as f64 * (1u64 << zoom) as f64
}

/// Reject zoom levels beyond the supported pyramid depth.
pub fn validate_zoom(zoom: u32) -> HeatmapResult<()> {
    if zoom > MAX_ZOOM {
        return Err(HeatmapError::invalid_config(format!(
            "zoom must be between 0 and {}, got {}",
            MAX_ZOOM, zoom
        )));
    }
    Ok(())
}

/// Project a geographic coordinate to a global pixel coordinate.
///
/// Latitudes must lie strictly inside the Mercator band and longitudes
/// within [-180, 180]; anything else is `OutOfProjectionRange`.
pub fn project(lat: f64, lng: f64, zoom: u32) -> HeatmapResult<(f64, f64)> {
    if !lat.is_finite() || lat.abs() >= MAX_LATITUDE {
        return Err(HeatmapError::out_of_range(
            lat,
            lng,
            format!("latitude must lie within (-{0}, {0})", MAX_LATITUDE),
        ));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(HeatmapError::out_of_range(
            lat,
            lng,
            "longitude must lie within [-180, 180]",
        ));
    }

    let size = world_size(zoom);
    let sin_lat = lat.to_radians().sin();
    let x = (lng + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * size;
    Ok((x, y))
}

/// Inverse of [`project`]: global pixel coordinate to (lat, lng).
pub fn unproject(px: f64, py: f64, zoom: u32) -> (f64, f64) {
    let size = world_size(zoom);
    let lng = px / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * py / size)).sinh().atan().to_degrees();
    (lat, lng)
}

/// Ground resolution in meters per pixel at a latitude.
pub fn meters_per_pixel(lat: f64, zoom: u32) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.to_radians().cos() / world_size(zoom)
}

/// Convert a ground distance to pixels at a latitude.
///
/// The result grows toward the poles: the same radius in meters covers more
/// Mercator pixels at high latitude.
pub fn radius_to_pixels(radius_meters: f64, lat: f64, zoom: u32) -> f64 {
    radius_meters / meters_per_pixel(lat, zoom)
}

/// Inclusive range of tiles intersecting the box, clamped to `[0, 2^zoom)`.
pub fn tile_range(bbox: &GeoBox, zoom: u32) -> HeatmapResult<TileRange> {
    validate_zoom(zoom)?;
    bbox.validate()?;

    let (x0, y0) = project(bbox.north, bbox.west, zoom)?;
    let (x1, y1) = project(bbox.south, bbox.east, zoom)?;

    let last = ((1u64 << zoom) - 1) as f64;
    let to_tile = |p: f64| (p / TILE_SIZE as f64).floor().clamp(0.0, last) as u32;

    Ok(TileRange::new(
        zoom,
        to_tile(x0),
        to_tile(x1),
        to_tile(y0),
        to_tile(y1),
    ))
}
