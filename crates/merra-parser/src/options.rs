//! Decoder options.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a decoder does with `[hour, pres, lat]` rows that no data line wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnpopulatedCells {
    /// Leave unwritten cells as NaN
    #[default]
    Nan,
    /// Leave unwritten cells as zero, as the upstream tooling did
    Zero,
    /// Fail the decode if any row is unwritten
    Reject,
}

impl UnpopulatedCells {
    /// Value the dataset is initialised with.
    pub fn initial_value(self) -> f64 {
        match self {
            UnpopulatedCells::Zero => 0.0,
            UnpopulatedCells::Nan | UnpopulatedCells::Reject => f64::NAN,
        }
    }
}

impl FromStr for UnpopulatedCells {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nan" => Ok(Self::Nan),
            "zero" => Ok(Self::Zero),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown unpopulated-cell policy '{}' (expected nan, zero or reject)",
                other
            )),
        }
    }
}

/// Options shared by both decoders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub unpopulated: UnpopulatedCells,
}

impl ParseOptions {
    pub fn with_unpopulated(unpopulated: UnpopulatedCells) -> Self {
        Self { unpopulated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_names() {
        assert_eq!("Zero".parse::<UnpopulatedCells>().unwrap(), UnpopulatedCells::Zero);
        assert!("maybe".parse::<UnpopulatedCells>().is_err());
    }

    #[test]
    fn test_options_from_json() {
        let options: ParseOptions = serde_json::from_str(r#"{"unpopulated":"reject"}"#).unwrap();
        assert_eq!(options.unpopulated, UnpopulatedCells::Reject);

        let options: ParseOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.unpopulated, UnpopulatedCells::Nan);

        assert!(serde_json::from_str::<ParseOptions>(r#"{"unpopulated":"maybe"}"#).is_err());
    }
}
