//! Error types for heatmap rendering.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap rendering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatmapError {
    /// Rejected before any computation: malformed box, zoom, config or limits.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A coordinate falls outside the band Web Mercator can project.
    #[error("Coordinate ({latitude}, {longitude}) is outside the projection range: {context}")]
    OutOfProjectionRange {
        latitude: f64,
        longitude: f64,
        context: String,
    },

    /// Image encoding failed.
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl HeatmapError {
    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an OutOfProjectionRange error.
    pub fn out_of_range(latitude: f64, longitude: f64, context: impl Into<String>) -> Self {
        Self::OutOfProjectionRange {
            latitude,
            longitude,
            context: context.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HeatmapError::InvalidConfig(_) | HeatmapError::OutOfProjectionRange { .. } => 400,
            HeatmapError::Encoding(_) => 500,
        }
    }
}
