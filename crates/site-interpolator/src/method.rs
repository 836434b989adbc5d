//! Interpolation and extrapolation policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InterpolationError;

/// How values between grid nodes are estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Value of the nearest grid node (preserves exact values).
    Nearest,
    /// Bilinear blend of the four surrounding nodes.
    #[default]
    Bilinear,
}

/// What happens when a site lies outside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolation {
    /// Extend the edge cell linearly (nearest edge node for `Nearest`).
    #[default]
    Linear,
    /// Fail with [`InterpolationError::OutsideGrid`].
    Reject,
}

/// Interpolation settings shared by every site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    pub method: InterpolationMethod,
    pub extrapolation: Extrapolation,
}

impl InterpolationConfig {
    pub fn new(method: InterpolationMethod, extrapolation: Extrapolation) -> Self {
        Self {
            method,
            extrapolation,
        }
    }
}

impl FromStr for InterpolationMethod {
    type Err = InterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "linear" => Ok(Self::Bilinear),
            other => Err(InterpolationError::config(format!(
                "unknown interpolation method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => write!(f, "nearest"),
            Self::Bilinear => write!(f, "bilinear"),
        }
    }
}

impl FromStr for Extrapolation {
    type Err = InterpolationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "reject" => Ok(Self::Reject),
            other => Err(InterpolationError::config(format!(
                "unknown extrapolation policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!(
            "Nearest".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::Nearest
        );
        assert_eq!(
            "bilinear".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::Bilinear
        );
        assert!("cubic".parse::<InterpolationMethod>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = InterpolationConfig::default();
        assert_eq!(config.method, InterpolationMethod::Bilinear);
        assert_eq!(config.extrapolation, Extrapolation::Linear);
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: InterpolationConfig = serde_json::from_str(r#"{"extrapolation":"reject"}"#).unwrap();
        assert_eq!(config.method, InterpolationMethod::Bilinear);
        assert_eq!(config.extrapolation, Extrapolation::Reject);
    }
}
