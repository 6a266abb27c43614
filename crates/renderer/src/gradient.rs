//! Color gradients and quantized palettes for density rendering.
//!
//! Gradients are defined in HSV space and live in a process-wide registry
//! that is built once and never mutated. A [`Palette`] samples a gradient
//! at `N` evenly spaced positions; classifying a normalized density into a
//! bucket is then a single multiply and floor per pixel.

use std::collections::HashMap;

use heatmap_common::{GradientKind, HeatmapError, HeatmapResult};
use once_cell::sync::Lazy;

/// Relative slack on `v * n` so that `k / n`, rounded to f32, lands in bucket `k`.
/// One f32 ulp is about 6e-8 relative, well inside this.
const BUCKET_EPSILON: f64 = 1e-6;

/// A gradient sweeping hue and brightness at full saturation.
///
/// Hues are fractions of the color wheel in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientDef {
    pub lowest_hue: f32,
    pub highest_hue: f32,
    pub lowest_value: f32,
    pub highest_value: f32,
}

static GRADIENTS: Lazy<HashMap<GradientKind, GradientDef>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(
        GradientKind::GreenToRed,
        GradientDef {
            lowest_hue: 1.0 / 3.0,
            highest_hue: 0.0,
            lowest_value: 0.35,
            highest_value: 0.85,
        },
    );
    m.insert(
        GradientKind::BlueToRed,
        GradientDef {
            lowest_hue: 2.0 / 3.0,
            highest_hue: 0.0,
            lowest_value: 0.35,
            highest_value: 0.85,
        },
    );
    m
});

/// Look up a gradient definition in the registry.
pub fn gradient(kind: GradientKind) -> &'static GradientDef {
    // Every GradientKind variant is registered above.
    &GRADIENTS[&kind]
}

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue as a fraction of the color wheel (0-1)
/// * `s` - Saturation (0-1)
/// * `v` - Value/brightness (0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

impl GradientDef {
    /// Sample the gradient at `pos` in `[0, 1]`.
    ///
    /// Hue is warped so most low densities stay near the low hue and the
    /// middle of the hue range gets more room; alpha rises linearly so zero
    /// density is fully transparent and the top of the scale fully opaque.
    pub fn sample(&self, pos: f32) -> Color {
        let pos = pos.clamp(0.0, 1.0);
        let skewed = pos.powi(10);
        let hue_pos = (2.0 * skewed - 1.0).asin() / std::f32::consts::PI + 0.5;

        let hue = self.lowest_hue + hue_pos * (self.highest_hue - self.lowest_hue);
        let value = self.lowest_value + pos * (self.highest_value - self.lowest_value);
        let (r, g, b) = hsv_to_rgb(hue, 1.0, value);
        let a = (pos * 255.0).round() as u8;

        Color::new(r, g, b, a)
    }
}

/// An ordered, quantized sequence of colors sampled from a gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Sample `bucket_count` colors evenly across a registered gradient.
    pub fn build(kind: GradientKind, bucket_count: u32) -> HeatmapResult<Self> {
        if bucket_count < 2 {
            return Err(HeatmapError::invalid_config(format!(
                "bucket_count must be at least 2, got {}",
                bucket_count
            )));
        }

        let def = gradient(kind);
        let last = (bucket_count - 1) as f32;
        let colors = (0..bucket_count)
            .map(|i| def.sample(i as f32 / last))
            .collect();

        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Bucket index for a normalized density, always in `[0, N-1]`.
    #[inline]
    pub fn classify(&self, normalized: f32) -> usize {
        let n = self.colors.len();
        if normalized.is_nan() || normalized <= 0.0 {
            return 0;
        }
        let scaled = f64::from(normalized) * n as f64;
        let idx = (scaled * (1.0 + BUCKET_EPSILON)).floor() as usize;
        idx.min(n - 1)
    }

    #[inline]
    pub fn color_for(&self, normalized: f32) -> Color {
        self.colors[self.classify(normalized)]
    }
}
