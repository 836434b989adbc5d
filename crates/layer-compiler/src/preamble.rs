//! Model-description header and complete documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compiler::render_layers;
use crate::layer::AtmosphericLayer;

/// Header of a model-description document: frequency grid, requested
/// outputs, solver tolerance and background temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preamble {
    /// Lowest frequency (GHz)
    pub f_min_ghz: f64,
    /// Highest frequency (GHz)
    pub f_max_ghz: f64,
    /// Frequency step (MHz)
    pub df_mhz: f64,
    /// Solver tolerance
    pub tolerance: f64,
    /// Cosmic background temperature (K)
    pub background_k: f64,
}

impl Default for Preamble {
    fn default() -> Self {
        Self {
            f_min_ghz: 0.0,
            f_max_ghz: 400.0,
            df_mhz: 1000.0,
            tolerance: 1e-4,
            background_k: 2.7,
        }
    }
}

impl fmt::Display for Preamble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Atmospheric model based on MERRA-2 data")?;
        writeln!(f, "#")?;
        writeln!(f, "?")?;
        writeln!(f, "? Usage:   am <basename>.amc")?;
        writeln!(f, "?")?;
        writeln!(f)?;
        writeln!(
            f,
            "f {} GHz  {} GHz  {} MHz",
            self.f_min_ghz, self.f_max_ghz, self.df_mhz
        )?;
        writeln!(f, "output f GHz tau neper Tb K")?;
        writeln!(f, "tol {:e}", self.tolerance)?;
        writeln!(f)?;
        writeln!(f, "T0 {} K", self.background_k)
    }
}

/// A preamble followed by compiled layers.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDocument {
    pub preamble: Preamble,
    pub layers: Vec<AtmosphericLayer>,
}

impl ModelDocument {
    pub fn new(preamble: Preamble, layers: Vec<AtmosphericLayer>) -> Self {
        Self { preamble, layers }
    }
}

impl fmt::Display for ModelDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.preamble, render_layers(&self.layers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preamble_text() {
        assert_eq!(
            Preamble::default().to_string(),
            "# Atmospheric model based on MERRA-2 data\n\
             #\n\
             ?\n\
             ? Usage:   am <basename>.amc\n\
             ?\n\
             \n\
             f 0 GHz  400 GHz  1000 MHz\n\
             output f GHz tau neper Tb K\n\
             tol 1e-4\n\
             \n\
             T0 2.7 K\n"
        );
    }

    #[test]
    fn test_preamble_from_yaml() {
        let preamble: Preamble = serde_yaml::from_str("f_max_ghz: 100\ndf_mhz: 100").unwrap();
        assert_eq!(preamble.f_max_ghz, 100.0);
        assert_eq!(preamble.df_mhz, 100.0);
        assert_eq!(preamble.background_k, 2.7);
    }

    #[test]
    fn test_document_joins_preamble_and_layers() {
        let doc = ModelDocument::new(Preamble::default(), vec![AtmosphericLayer::top_of_atmosphere()]);
        let text = doc.to_string();
        assert!(text.starts_with("# Atmospheric model"));
        assert!(text.ends_with("T0 2.7 K\nlayer   # empty layer for top of atmosphere\nPbase 0 mbar\nTbase 217 K\n\n"));
    }
}
