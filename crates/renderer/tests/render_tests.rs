//! End-to-end tests for rendering points into tiles.

use heatmap_common::{GeoBox, GeoPoint, GradientKind, HeatmapError, RenderConfig, TileCoord, TILE_SIZE};
use image::RgbaImage;
use projection::{meters_per_pixel, project, radius_to_pixels};
use renderer::{
    density_histogram, render_heatmap_to_image, render_heatmap_to_tiles, RenderPipeline, Surface,
    Tile,
};
use test_utils::{assert_close, bbox, clustered_points, small_config, uniform_points};

fn surface(config: RenderConfig, bbox: GeoBox, zoom: u32, points: &[GeoPoint]) -> Surface {
    RenderPipeline::new(config, bbox, zoom)
        .unwrap()
        .compute_bounds(points)
        .unwrap()
        .accumulate()
        .unwrap()
}

fn nonzero_cells(s: &Surface) -> usize {
    s.raster().values().iter().filter(|v| **v > 0.0).count()
}

/// Paste tiles into one image covering the whole tile block.
fn stitch(tiles: &[Tile], x_min: u32, y_min: u32, cols: u32, rows: u32) -> RgbaImage {
    let mut out = RgbaImage::new(cols * TILE_SIZE, rows * TILE_SIZE);
    for tile in tiles {
        let ox = (tile.x() - x_min) * TILE_SIZE;
        let oy = (tile.y() - y_min) * TILE_SIZE;
        for (x, y, px) in tile.image.enumerate_pixels() {
            out.put_pixel(ox + x, oy + y, *px);
        }
    }
    out
}

// ============================================================================
// Single point scenario
// ============================================================================

#[test]
fn test_single_point_tile_block() {
    let point = GeoPoint::new(0.5, 0.5);
    let tiles: Vec<Tile> = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &[point])
        .unwrap()
        .into_iter()
        .collect();

    assert_eq!(tiles.len(), 12);
    let coords: Vec<(u32, u32)> = tiles.iter().map(|t| (t.x(), t.y())).collect();
    let expected: Vec<(u32, u32)> = (509..=512)
        .flat_map(|y| (512..=514).map(move |x| (x, y)))
        .collect();
    assert_eq!(coords, expected);

    for tile in &tiles {
        assert_eq!(tile.image.dimensions(), (TILE_SIZE, TILE_SIZE));
    }
}

#[test]
fn test_single_point_colors_only_within_radius() {
    let point = GeoPoint::new(0.5, 0.5);
    let (px, py) = project(point.lat, point.lng, 10).unwrap();
    let radius = radius_to_pixels(500.0, point.lat, 10);

    let tiles = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &[point]).unwrap();
    let mut colored = 0;
    let mut opaque = 0;
    for tile in &tiles {
        let (ox, oy) = tile.coord.origin_pixel();
        for (x, y, p) in tile.image.enumerate_pixels() {
            if p.0[3] == 0 {
                continue;
            }
            colored += 1;
            if p.0[3] == 255 {
                opaque += 1;
            }
            let dx = (ox + x as u64) as f64 + 0.5 - px;
            let dy = (oy + y as u64) as f64 + 0.5 - py;
            assert!(
                (dx * dx + dy * dy).sqrt() < radius,
                "pixel ({}, {}) colored outside the kernel",
                x,
                y
            );
        }
    }
    assert!(colored > 0);
    // the peak cell lands in the top bucket
    assert!(opaque > 0);
}

// ============================================================================
// Seams and consistency
// ============================================================================

#[test]
fn test_tiles_are_seamless() {
    // x = 513 * 256 falls at lng 0.3515625: straddle that tile edge
    let points = clustered_points((0.5, 0.3515625), 0.02, 200, 11);
    let sequence = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &points).unwrap();
    let range = *sequence.surface().tile_range();
    let tiles: Vec<Tile> = sequence.iter().collect();

    let stitched = stitch(&tiles, range.x_min, range.y_min, range.width(), range.height());
    let whole = sequence.surface().image().unwrap();
    assert_eq!(stitched, whole);

    // density really crosses the edge
    let left = sequence.surface().tile(&TileCoord::new(10, 512, 510)).unwrap();
    let right = sequence.surface().tile(&TileCoord::new(10, 513, 510)).unwrap();
    assert!((0..TILE_SIZE).any(|y| left.image.get_pixel(TILE_SIZE - 1, y).0[3] > 0));
    assert!((0..TILE_SIZE).any(|y| right.image.get_pixel(0, y).0[3] > 0));
}

#[test]
fn test_parallel_matches_sequential() {
    let points = uniform_points(&bbox::LONDON, 500, 3);
    let sequence = render_heatmap_to_tiles(&small_config(), &bbox::LONDON, 13, &points).unwrap();
    let sequential: Vec<Tile> = sequence.iter().collect();
    assert_eq!(sequence.render_all_parallel(), sequential);
    assert_eq!(sequential.len(), sequence.len());
}

#[test]
fn test_rendering_is_deterministic() {
    let points = clustered_points((51.5, -0.1), 0.03, 1000, 5);
    let encode = || -> Vec<Vec<u8>> {
        render_heatmap_to_tiles(&small_config(), &bbox::LONDON, 12, &points)
            .unwrap()
            .iter()
            .map(|t| t.encode_png().unwrap())
            .collect()
    };
    assert_eq!(encode(), encode());
}

#[test]
fn test_iteration_can_restart() {
    let sequence =
        render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &[GeoPoint::new(0.5, 0.5)]).unwrap();
    let first: Vec<Tile> = sequence.iter().take(3).collect();
    let again: Vec<Tile> = sequence.iter().take(3).collect();
    assert_eq!(first, again);
}

// ============================================================================
// Density semantics
// ============================================================================

#[test]
fn test_empty_points_give_transparent_tiles() {
    let sequence = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &[]).unwrap();
    assert_eq!(sequence.len(), 12);
    assert_eq!(sequence.surface().peak(), 0.0);
    assert!(sequence.iter().all(|t| t.is_transparent()));
}

#[test]
fn test_coincident_points_double_density() {
    let p = GeoPoint::new(0.5, 0.5);
    let one = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    let two = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p, p]);
    for (a, b) in one.raster().values().iter().zip(two.raster().values()) {
        assert_eq!(*b, 2.0 * *a);
    }

    assert_close!(two.peak(), 2.0 * one.peak(), 1e-6);

    let weighted = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p.with_weight(2.0)]);
    assert_eq!(weighted.raster(), two.raster());

    // same shape after normalization
    let a: Vec<Tile> = one.tiles().collect();
    let b: Vec<Tile> = two.tiles().collect();
    assert_eq!(a, b);
}

#[test]
fn test_zero_weight_points_are_ignored() {
    let p = GeoPoint::new(0.5, 0.5);
    let with = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p, GeoPoint::new(0.2, 0.2).with_weight(0.0)]);
    let without = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    assert_eq!(with.raster(), without.raster());
}

#[test]
fn test_radius_grows_in_pixels_towards_poles() {
    let equator = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[test_utils::center_point(&bbox::EQUATOR_DEGREE)]);
    let arctic = surface(small_config(), bbox::TROMSO, 10, &[test_utils::center_point(&bbox::TROMSO)]);

    // ~cos(0.5°)/cos(69.65°) ≈ 2.9× the radius, ~8× the area
    let ratio = nonzero_cells(&arctic) as f64 / nonzero_cells(&equator) as f64;
    assert!(ratio > 4.0, "ratio {}", ratio);
}

#[test]
fn test_ground_footprint_is_latitude_independent() {
    let (eq_lat, _) = bbox::EQUATOR_DEGREE.center();
    let (arctic_lat, _) = bbox::TROMSO.center();
    let equator = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[test_utils::center_point(&bbox::EQUATOR_DEGREE)]);
    let arctic = surface(small_config(), bbox::TROMSO, 10, &[test_utils::center_point(&bbox::TROMSO)]);

    let area = |cells: usize, lat: f64| cells as f64 * meters_per_pixel(lat, 10).powi(2);
    let ratio = area(nonzero_cells(&arctic), arctic_lat) / area(nonzero_cells(&equator), eq_lat);
    assert!((0.6..1.6).contains(&ratio), "ratio {}", ratio);
}

#[test]
fn test_point_radius_override() {
    let p = GeoPoint::new(0.5, 0.5);
    let default = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    let wide = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p.with_radius(2000.0)]);
    assert!(nonzero_cells(&wide) > nonzero_cells(&default) * 8);
    assert!(wide.bounds().pad_px > default.bounds().pad_px);
}

#[test]
fn test_points_outside_box_still_contribute() {
    // just west of the box, within one kernel radius of its edge
    let p = GeoPoint::new(0.5, -0.001);
    let s = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    assert!(s.tiles().any(|t| !t.is_transparent()));
}

#[test]
fn test_far_points_are_skipped() {
    let p = GeoPoint::new(0.5, 0.5);
    let far = GeoPoint::new(40.0, 100.0);
    let alone = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    let with_far = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p, far]);
    assert_eq!(with_far.raster(), alone.raster());
    assert_eq!(with_far.peak(), alone.peak());
}

#[test]
fn test_far_radius_override_keeps_pad() {
    // a continent-sized kernel that still ends well east of the box
    let p = GeoPoint::new(0.5, 0.5);
    let far = GeoPoint::new(40.0, 100.0).with_radius(5_000_000.0);
    let alone = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p]);
    let with_far = surface(small_config(), bbox::EQUATOR_DEGREE, 10, &[p, far]);
    assert_eq!(with_far.bounds().pad_px, alone.bounds().pad_px);
    assert_eq!(with_far.raster(), alone.raster());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_invalid_requests() {
    let cfg = small_config();
    assert!(matches!(
        render_heatmap_to_tiles(&cfg, &bbox::INVERTED, 10, &[]),
        Err(HeatmapError::InvalidConfig(_))
    ));
    assert!(matches!(
        render_heatmap_to_tiles(&cfg, &bbox::POLAR, 10, &[]),
        Err(HeatmapError::OutOfProjectionRange { .. })
    ));
    assert!(matches!(
        render_heatmap_to_tiles(&RenderConfig::new(GradientKind::BlueToRed, 10, 0.0), &bbox::EQUATOR_DEGREE, 10, &[]),
        Err(HeatmapError::InvalidConfig(_))
    ));
    assert!(render_heatmap_to_tiles(&cfg, &bbox::EQUATOR_DEGREE, 23, &[]).is_err());
}

#[test]
fn test_bad_points_rejected_with_index() {
    let points = [GeoPoint::new(0.5, 0.5), GeoPoint::new(0.5, 0.5).with_weight(-1.0)];
    let err = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &points).unwrap_err();
    assert!(matches!(err, HeatmapError::InvalidConfig(ref msg) if msg.contains("point 1")));

    let points = [GeoPoint::new(f64::NAN, 0.5)];
    let err = render_heatmap_to_tiles(&small_config(), &bbox::EQUATOR_DEGREE, 10, &points).unwrap_err();
    assert!(matches!(err, HeatmapError::OutOfProjectionRange { ref context, .. } if context.contains("point 0")));
}

// ============================================================================
// Viewport image and histogram
// ============================================================================

#[test]
fn test_viewport_image_matches_box_footprint() {
    let b = bbox::EQUATOR_DEGREE;
    let image = render_heatmap_to_image(&small_config(), &b, 10, &[GeoPoint::new(0.5, 0.5)]).unwrap();

    let (x0, y0) = project(b.north, b.west, 10).unwrap();
    let (x1, y1) = project(b.south, b.east, 10).unwrap();
    let width = x1.floor() as u32 - x0.floor() as u32 + 1;
    let height = y1.floor() as u32 - y0.floor() as u32 + 1;
    assert_eq!(image.dimensions(), (width, height));
    assert!(image.pixels().any(|p| p.0[3] > 0));
}

#[test]
fn test_viewport_surface_skips_partial_tiles() {
    let s = RenderPipeline::new(small_config(), bbox::EQUATOR_DEGREE, 10)
        .unwrap()
        .for_viewport()
        .compute_bounds(&[GeoPoint::new(0.5, 0.5)])
        .unwrap()
        .accumulate()
        .unwrap();
    let tiles = s.tiles();
    assert_eq!(tiles.size_hint(), (0, Some(12)));

    // the top tile row starts above the viewport raster
    let produced: Vec<Tile> = tiles.collect();
    assert!(produced.len() < 12);
    assert!(produced.iter().all(|t| t.y() > 509));
}

#[test]
fn test_density_histogram() {
    let points = clustered_points((0.5, 0.5), 0.1, 300, 2);
    let hist = density_histogram(&small_config(), &bbox::EQUATOR_DEGREE, 10, &points, 25).unwrap();
    assert_eq!(hist.bins(), 25);
    assert_eq!(hist.edges.len(), 26);
    assert!(hist.total() > 0);
    assert_eq!(hist.edges[0], 0.0);
    assert!(hist.edges.windows(2).all(|w| w[0] < w[1]));

    let empty = density_histogram(&small_config(), &bbox::EQUATOR_DEGREE, 10, &[], 25).unwrap();
    assert_eq!(empty.total(), 0);
}
