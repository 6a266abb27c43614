//! Distribution of raw density values, for choosing bucket count and radius.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use serde::Serialize;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 25;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BAR: Rgba<u8> = Rgba([31, 119, 180, 255]);

/// Counts of non-zero densities in equal-width bins from 0 to the maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityHistogram {
    /// `bins + 1` bin edges
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl DensityHistogram {
    /// Bin every positive value. Zero cells are left out: they dominate any
    /// realistic raster and say nothing about how densities spread.
    pub fn from_values(values: impl Iterator<Item = f32>, bins: usize) -> Self {
        let bins = bins.max(1);
        let positive: Vec<f64> = values.filter(|v| *v > 0.0).map(f64::from).collect();
        let max = positive.iter().copied().fold(0.0f64, f64::max);

        let edges = (0..=bins).map(|i| max * i as f64 / bins as f64).collect();
        let mut counts = vec![0u64; bins];
        if max > 0.0 {
            for v in positive {
                let idx = ((v / max) * bins as f64) as usize;
                counts[idx.min(bins - 1)] += 1;
            }
        }

        Self { edges, counts }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Draw the histogram as filled bars on a white background.
    pub fn render(&self, width: u32, height: u32) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);
        let tallest = self.counts.iter().copied().max().unwrap_or(0);
        if tallest == 0 || width == 0 || height == 0 {
            return image;
        }

        let bins = self.bins() as u32;
        for (i, &count) in self.counts.iter().enumerate() {
            let x0 = i as u32 * width / bins;
            let x1 = (i as u32 + 1) * width / bins;
            let bar_height = (count as f64 / tallest as f64 * height as f64).round() as u32;
            if x1 <= x0 || bar_height == 0 {
                continue;
            }
            let rect = Rect::at(x0 as i32, (height - bar_height) as i32).of_size(x1 - x0, bar_height);
            draw_filled_rect_mut(&mut image, rect, BAR);
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_skip_zeros() {
        let h = DensityHistogram::from_values([0.0, 0.0, 1.0, 2.0, 4.0].into_iter(), 4);
        assert_eq!(h.total(), 3);
        // values on an edge fall in the bin above it
        assert_eq!(h.counts, vec![0, 1, 1, 1]);
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_histogram_renders_blank() {
        let h = DensityHistogram::from_values(std::iter::empty(), 25);
        assert_eq!(h.total(), 0);
        let img = h.render(30, 15);
        assert!(img.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_render_tallest_bar_fills_height() {
        let h = DensityHistogram::from_values([1.0, 1.0, 4.0].into_iter(), 2);
        assert_eq!(h.counts, vec![2, 1]);
        let img = h.render(20, 10);
        assert_eq!(*img.get_pixel(0, 0), BAR);
        assert_eq!(*img.get_pixel(15, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(15, 9), BAR);
    }
}
