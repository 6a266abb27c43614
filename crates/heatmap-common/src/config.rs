//! Render configuration and its tunable-parameter descriptors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{HeatmapError, HeatmapResult};

/// Largest palette a render call may ask for.
pub const MAX_BUCKET_COUNT: u32 = 4096;

/// Closed set of named color gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GradientKind {
    GreenToRed,
    BlueToRed,
}

impl GradientKind {
    pub const ALL: [GradientKind; 2] = [GradientKind::GreenToRed, GradientKind::BlueToRed];

    pub fn as_str(&self) -> &'static str {
        match self {
            GradientKind::GreenToRed => "GREEN_TO_RED",
            GradientKind::BlueToRed => "BLUE_TO_RED",
        }
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientKind {
    type Err = HeatmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradientKind::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| HeatmapError::invalid_config(format!("unknown gradient: {}", s)))
    }
}

/// User-configurable parameters of the rendering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub gradient: GradientKind,
    /// Number of discrete colors in the palette
    pub bucket_count: u32,
    /// Kernel radius in meters on the ground
    pub radius_meters: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            gradient: GradientKind::GreenToRed,
            bucket_count: 200,
            radius_meters: 750.0,
        }
    }
}

/// Value type of a tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Int,
    Float,
    Select,
}

/// Description of one tunable parameter, as served to tuning clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub default_value: serde_json::Value,
}

impl RenderConfig {
    pub fn new(gradient: GradientKind, bucket_count: u32, radius_meters: f64) -> Self {
        Self {
            gradient,
            bucket_count,
            radius_meters,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.bucket_count < 2 {
            return Err(HeatmapError::invalid_config(format!(
                "bucket_count must be at least 2, got {}",
                self.bucket_count
            )));
        }
        if self.bucket_count > MAX_BUCKET_COUNT {
            return Err(HeatmapError::invalid_config(format!(
                "bucket_count must be at most {}, got {}",
                MAX_BUCKET_COUNT, self.bucket_count
            )));
        }
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(HeatmapError::invalid_config(format!(
                "radius_meters must be positive, got {}",
                self.radius_meters
            )));
        }
        Ok(())
    }

    /// Descriptors for every tunable field, with this type's defaults.
    pub fn parameter_definitions() -> Vec<ParameterDefinition> {
        let defaults = Self::default();
        vec![
            ParameterDefinition {
                id: "gradient".to_string(),
                param_type: ParameterType::Select,
                options: Some(GradientKind::ALL.iter().map(|g| g.to_string()).collect()),
                default_value: serde_json::Value::from(defaults.gradient.as_str()),
            },
            ParameterDefinition {
                id: "bucket_count".to_string(),
                param_type: ParameterType::Int,
                options: None,
                default_value: serde_json::Value::from(defaults.bucket_count),
            },
            ParameterDefinition {
                id: "radius_meters".to_string(),
                param_type: ParameterType::Float,
                options: None,
                default_value: serde_json::Value::from(defaults.radius_meters),
            },
        ]
    }

    /// Build a config from string key/value pairs (e.g. URL query arguments).
    ///
    /// Absent keys fall back to defaults; unrelated keys are ignored.
    pub fn from_string_args(args: &HashMap<String, String>) -> HeatmapResult<Self> {
        let mut config = Self::default();

        if let Some(v) = args.get("gradient") {
            config.gradient = v.parse()?;
        }

        if let Some(v) = args.get("bucket_count") {
            config.bucket_count = v.trim().parse().map_err(|_| {
                HeatmapError::invalid_config(format!("bucket_count must be an integer, got '{}'", v))
            })?;
        }

        if let Some(v) = args.get("radius_meters") {
            config.radius_meters = v.trim().parse().map_err(|_| {
                HeatmapError::invalid_config(format!("radius_meters must be a number, got '{}'", v))
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}
