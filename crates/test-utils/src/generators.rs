//! Deterministic point generators.
//!
//! All generators are seeded so tests and benchmarks see the same data on
//! every run without pulling in a random number crate.

use heatmap_common::{GeoBox, GeoPoint};

/// Small linear congruential generator (Knuth's MMIX constants).
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x5DEE_CE66_D1CE_4E5B)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// `count` points spread uniformly over `bbox`.
pub fn uniform_points(bbox: &GeoBox, count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|_| {
            GeoPoint::new(
                rng.range(bbox.south, bbox.north),
                rng.range(bbox.west, bbox.east),
            )
        })
        .collect()
}

/// `count` points scattered around `center` within `spread` degrees,
/// denser towards the middle.
pub fn clustered_points(center: (f64, f64), spread: f64, count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = Lcg::new(seed);
    (0..count)
        .map(|_| {
            // mean of two uniforms gives a triangular distribution
            let dlat = (rng.next_f64() + rng.next_f64() - 1.0) * spread;
            let dlng = (rng.next_f64() + rng.next_f64() - 1.0) * spread;
            GeoPoint::new(center.0 + dlat, center.1 + dlng)
        })
        .collect()
}

/// A regular `rows × cols` lattice inside `bbox`, cell-centred.
pub fn grid_points(bbox: &GeoBox, rows: usize, cols: usize) -> Vec<GeoPoint> {
    let dlat = (bbox.north - bbox.south) / rows.max(1) as f64;
    let dlng = (bbox.east - bbox.west) / cols.max(1) as f64;
    (0..rows)
        .flat_map(|r| {
            (0..cols).map(move |c| {
                GeoPoint::new(
                    bbox.south + (r as f64 + 0.5) * dlat,
                    bbox.west + (c as f64 + 0.5) * dlng,
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generators_are_deterministic() {
        let b = GeoBox::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(uniform_points(&b, 50, 7), uniform_points(&b, 50, 7));
        assert_ne!(uniform_points(&b, 50, 7), uniform_points(&b, 50, 8));
    }

    #[test]
    fn test_uniform_points_inside_box() {
        let b = GeoBox::new(10.0, 20.0, 11.0, 22.0);
        assert!(uniform_points(&b, 500, 1).iter().all(|p| b.contains(p.lat, p.lng)));
    }

    #[test]
    fn test_grid_points() {
        let b = GeoBox::new(0.0, 0.0, 2.0, 4.0);
        let pts = grid_points(&b, 2, 4);
        assert_eq!(pts.len(), 8);
        assert_eq!((pts[0].lat, pts[0].lng), (0.5, 0.5));
        assert_eq!((pts[7].lat, pts[7].lng), (1.5, 3.5));
    }
}
