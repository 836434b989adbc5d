//! Atmospheric layer records and their text form.

use std::fmt;

/// Pressure (mbar) below which a layer is named mesosphere.
pub const MESOSPHERE_BELOW_MBAR: f64 = 1.0;
/// Pressure (mbar) below which a layer is named stratosphere.
pub const STRATOSPHERE_BELOW_MBAR: f64 = 100.0;

/// Base pressure (mbar) of the empty top-of-atmosphere layer.
pub const TOP_PRESSURE_MBAR: f64 = 0.0;
/// Base temperature (K) of the empty top-of-atmosphere layer.
pub const TOP_TEMPERATURE_K: f64 = 217.0;

/// Name written on the `layer` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// The synthetic empty layer above the highest level
    TopOfAtmosphere,
    Mesosphere,
    Stratosphere,
    Troposphere,
}

impl LayerKind {
    /// Name a layer by its base pressure (mbar).
    pub fn from_pressure(p: f64) -> Self {
        if p < MESOSPHERE_BELOW_MBAR {
            LayerKind::Mesosphere
        } else if p < STRATOSPHERE_BELOW_MBAR {
            LayerKind::Stratosphere
        } else {
            LayerKind::Troposphere
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayerKind::TopOfAtmosphere => "",
            LayerKind::Mesosphere => "mesosphere",
            LayerKind::Stratosphere => "stratosphere",
            LayerKind::Troposphere => "troposphere",
        }
    }
}

/// One constant-property slab of the model atmosphere.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphericLayer {
    pub kind: LayerKind,
    /// Base pressure (mbar)
    pub pressure: f64,
    /// Base temperature (K)
    pub temperature: f64,
    pub lineshape: Option<String>,
    /// Emit a `column dry_air vmr` line
    pub dry_air: bool,
    /// Ozone volume mixing ratio
    pub ozone_vmr: Option<f64>,
    /// Relative humidity as a fraction
    pub relative_humidity: Option<f64>,
    /// Ice water path (kg*m^-2)
    pub ice_path: Option<f64>,
    /// Liquid water path (kg*m^-2)
    pub liquid_path: Option<f64>,
}

impl AtmosphericLayer {
    /// A layer with only base pressure and temperature.
    pub fn new(pressure: f64, temperature: f64) -> Self {
        Self {
            kind: LayerKind::from_pressure(pressure),
            pressure,
            temperature,
            lineshape: None,
            dry_air: false,
            ozone_vmr: None,
            relative_humidity: None,
            ice_path: None,
            liquid_path: None,
        }
    }

    /// The empty layer placed above the highest level.
    pub fn top_of_atmosphere() -> Self {
        Self {
            kind: LayerKind::TopOfAtmosphere,
            ..Self::new(TOP_PRESSURE_MBAR, TOP_TEMPERATURE_K)
        }
    }
}

impl fmt::Display for AtmosphericLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == LayerKind::TopOfAtmosphere {
            writeln!(f, "layer   # empty layer for top of atmosphere")?;
            writeln!(f, "Pbase {} mbar", self.pressure)?;
            writeln!(f, "Tbase {} K", self.temperature)?;
        } else {
            writeln!(f, "layer {}", self.kind.name())?;
            writeln!(f, "Pbase {:.3} mbar", self.pressure)?;
            writeln!(f, "Tbase {:.3} K", self.temperature)?;
        }
        if let Some(lineshape) = &self.lineshape {
            writeln!(f, "lineshape {}", lineshape)?;
        }
        if self.dry_air {
            writeln!(f, "column dry_air vmr")?;
        }
        if let Some(o3) = self.ozone_vmr {
            writeln!(f, "column o3 vmr {:e}", o3)?;
        }
        if let Some(rh) = self.relative_humidity {
            writeln!(f, "column h2o RH {:.3}%", rh * 100.0)?;
        }
        if let Some(iwp) = self.ice_path {
            writeln!(f, "column iwp_abs_Rayleigh {:e} kg*m^-2", iwp)?;
        }
        if let Some(lwp) = self.liquid_path {
            writeln!(f, "column lwp_abs_Rayleigh {:e} kg*m^-2", lwp)?;
        }
        Ok(())
    }
}
