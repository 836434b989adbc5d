//! Error types for profile truncation and layer compilation.

use thiserror::Error;

/// Result type for layer compiler operations.
pub type Result<T> = std::result::Result<T, LayerError>;

/// Errors raised before any layer is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerError {
    /// A column does not have one value per pressure level.
    #[error("expected one {column} value per level ({expected} levels), found {actual}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No level has a finite height.
    #[error("profile has no levels with a finite height")]
    EmptyProfile,

    /// The truncation height lies above the whole profile.
    #[error("minimum height {min_height} m is above the top of the profile ({top} m)")]
    HeightOutOfRange { min_height: f64, top: f64 },
}

impl LayerError {
    /// Check that `actual` matches the number of levels.
    pub fn check_length(column: &'static str, expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::LengthMismatch {
                column,
                expected,
                actual,
            })
        }
    }
}
