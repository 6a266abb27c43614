//! Loading input points from CSV.
//!
//! One point per line as `lat,lng` or `lat,lng,weight`. Blank lines and lines
//! starting with `#` are skipped. A first line that does not parse as numbers
//! is treated as a header.

use std::path::Path;

use anyhow::Context;
use heatmap_common::{GeoPoint, HeatmapError, HeatmapResult};
use tracing::info;

/// Read and parse a points file.
pub fn load_points(path: &Path) -> anyhow::Result<Vec<GeoPoint>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read points file {}", path.display()))?;
    let points = parse_points(&text)
        .with_context(|| format!("failed to parse points file {}", path.display()))?;
    info!(path = %path.display(), count = points.len(), "Loaded points");
    Ok(points)
}

/// Parse CSV text into points.
pub fn parse_points(text: &str) -> HeatmapResult<Vec<GeoPoint>> {
    let mut points = Vec::new();
    let mut first_record = true;

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = parse_line(line);
        if first_record {
            first_record = false;
            if parsed.is_err() {
                continue;
            }
        }
        let point = parsed
            .map_err(|e| HeatmapError::invalid_config(format!("line {}: {}", i + 1, e)))?;
        points.push(point);
    }

    Ok(points)
}

fn parse_line(line: &str) -> Result<GeoPoint, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(format!("expected 'lat,lng[,weight]', got '{}'", line));
    }

    let num = |s: &str| s.parse::<f64>().map_err(|_| format!("invalid number '{}'", s));
    let mut point = GeoPoint::new(num(fields[0])?, num(fields[1])?);
    if let Some(w) = fields.get(2) {
        point = point.with_weight(num(w)?);
    }
    Ok(point)
}
