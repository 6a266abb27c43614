//! Benchmarks for the renderer crate - density accumulation, tile slicing, PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use heatmap_common::{GeoBox, GeoPoint, GradientKind, RenderConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use renderer::density::{project_points, DensityRaster};
use renderer::{png, render_heatmap_to_tiles, RenderPipeline};
use projection::{Extent, PixelBounds};

const LONDON: GeoBox = GeoBox {
    south: 51.28,
    west: -0.51,
    north: 51.69,
    east: 0.33,
};

/// Points scattered over `bbox`, denser towards its centre.
fn generate_points(bbox: &GeoBox, count: usize) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(42);
    let (clat, clng) = bbox.center();
    let (hlat, hlng) = ((bbox.north - bbox.south) / 2.0, (bbox.east - bbox.west) / 2.0);
    (0..count)
        .map(|_| {
            let t: f64 = rng.gen::<f64>().powi(2);
            let a: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            GeoPoint::new(clat + t * hlat * a.sin(), clng + t * hlng * a.cos())
        })
        .collect()
}

fn config(radius: f64) -> RenderConfig {
    RenderConfig::new(GradientKind::GreenToRed, 200, radius)
}

// =============================================================================
// DENSITY ACCUMULATION
// =============================================================================

fn bench_accumulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("accumulate");
    group.sample_size(20);

    let bounds = PixelBounds::compute(&LONDON, 12, 750.0, Extent::Tiles).unwrap();
    for count in [1_000, 10_000, 100_000] {
        let points = generate_points(&LONDON, count);
        let projected = project_points(&points, &bounds, 750.0).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("london_z12", count), &projected, |b, pts| {
            b.iter(|| DensityRaster::accumulate(bounds.width(), bounds.height(), black_box(pts)));
        });
    }

    group.finish();
}

// =============================================================================
// TILE SLICING
// =============================================================================

fn bench_tiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("tiles");

    let points = generate_points(&LONDON, 10_000);
    let surface = RenderPipeline::new(config(750.0), LONDON, 12)
        .unwrap()
        .compute_bounds(&points)
        .unwrap()
        .accumulate()
        .unwrap();
    group.throughput(Throughput::Elements(surface.tile_range().len() as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| surface.tiles().count());
    });
    group.bench_function("parallel", |b| {
        b.iter(|| surface.render_all_parallel().len());
    });

    group.finish();
}

// =============================================================================
// PNG ENCODING
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    let points = generate_points(&LONDON, 10_000);
    let tiles = render_heatmap_to_tiles(&config(750.0), &LONDON, 12, &points).unwrap();
    let tile = tiles
        .iter()
        .find(|t| !t.is_transparent())
        .expect("some tile has density");
    let raw = tile.image.as_raw().clone();

    group.throughput(Throughput::Bytes(raw.len() as u64));
    group.bench_function("auto_heatmap_tile", |b| {
        b.iter(|| png::create_png_auto(black_box(&raw), 256, 256));
    });
    group.bench_function("rgba_heatmap_tile", |b| {
        b.iter(|| png::create_png(black_box(&raw), 256, 256));
    });

    group.finish();
}

// =============================================================================
// FULL PIPELINE
// =============================================================================

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pipeline");
    group.sample_size(10);

    let points = generate_points(&LONDON, 10_000);
    for zoom in [10, 12, 13] {
        group.bench_with_input(BenchmarkId::new("london_tiles_png", zoom), &zoom, |b, &zoom| {
            b.iter(|| {
                render_heatmap_to_tiles(&config(500.0), &LONDON, zoom, black_box(&points))
                    .unwrap()
                    .iter()
                    .map(|t| t.encode_png().unwrap().len())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_accumulate,
    bench_tiles,
    bench_png_encoding,
    bench_full_pipeline,
);
criterion_main!(benches);
