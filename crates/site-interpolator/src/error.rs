//! Error types for site interpolation.

use thiserror::Error;

/// Result type for interpolation operations.
pub type Result<T> = std::result::Result<T, InterpolationError>;

/// Errors that can occur while sampling a grid at a site.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    /// An axis has no values.
    #[error("{axis} axis is empty")]
    EmptyAxis { axis: &'static str },

    /// An axis is not strictly increasing or strictly decreasing.
    #[error("{axis} axis is not strictly monotonic at index {index}")]
    NonMonotonic { axis: &'static str, index: usize },

    /// The site coordinate is not a finite number.
    #[error("site '{site}' has a non-finite coordinate ({lon}, {lat})")]
    InvalidCoordinate { site: String, lon: f64, lat: f64 },

    /// The site lies outside the grid and extrapolation is disabled.
    #[error("site '{site}' at ({lon}, {lat}) is outside the grid {bounds}")]
    OutsideGrid {
        site: String,
        lon: f64,
        lat: f64,
        bounds: String,
    },

    /// Unknown interpolation or extrapolation policy name.
    #[error("configuration error: {0}")]
    Config(String),
}

impl InterpolationError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
