//! Compiling a vertical profile into atmospheric layers.
//!
//! Levels are indexed from the surface (index 0) upward and processed from
//! the highest index down. Ozone and humidity are smoothed with the previous
//! emitted level; ice and liquid water are integrated over the height step
//! between the two levels.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{LayerError, Result};
use crate::layer::AtmosphericLayer;
use crate::physics::{mmr_to_density, mmr_to_vmr, Species};

/// Cloud paths at or below this value (kg*m^-2) are treated as absent.
pub const PATH_THRESHOLD: f64 = 1e-10;

/// Ice is discarded above this temperature (K).
pub const ICE_MAX_TEMPERATURE_K: f64 = 273.0;

/// Liquid water is discarded below this temperature (K).
pub const LIQUID_MIN_TEMPERATURE_K: f64 = 242.0;

/// Parallel per-level columns of one profile.
///
/// `pressure`, `temperature` and `height` are required; the constituent
/// columns are optional and omitted from every layer when absent.
#[derive(Debug, Clone, Copy)]
pub struct ProfileColumns<'a> {
    /// Pressure (mbar)
    pub pressure: &'a [f64],
    /// Temperature (K)
    pub temperature: &'a [f64],
    /// Height (m)
    pub height: &'a [f64],
    /// Ozone mass mixing ratio (kg/kg)
    pub ozone: Option<&'a [f64]>,
    /// Relative humidity (fraction)
    pub relative_humidity: Option<&'a [f64]>,
    /// Liquid water mass mixing ratio (kg/kg)
    pub liquid: Option<&'a [f64]>,
    /// Ice water mass mixing ratio (kg/kg)
    pub ice: Option<&'a [f64]>,
}

impl<'a> ProfileColumns<'a> {
    pub fn new(pressure: &'a [f64], temperature: &'a [f64], height: &'a [f64]) -> Self {
        Self {
            pressure,
            temperature,
            height,
            ozone: None,
            relative_humidity: None,
            liquid: None,
            ice: None,
        }
    }

    pub fn with_ozone(mut self, ozone: &'a [f64]) -> Self {
        self.ozone = Some(ozone);
        self
    }

    pub fn with_relative_humidity(mut self, rh: &'a [f64]) -> Self {
        self.relative_humidity = Some(rh);
        self
    }

    pub fn with_liquid(mut self, liquid: &'a [f64]) -> Self {
        self.liquid = Some(liquid);
        self
    }

    pub fn with_ice(mut self, ice: &'a [f64]) -> Self {
        self.ice = Some(ice);
        self
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Check every column against the pressure column.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        LayerError::check_length("temperature", n, self.temperature.len())?;
        LayerError::check_length("height", n, self.height.len())?;
        let optional = [
            ("ozone", self.ozone),
            ("relative humidity", self.relative_humidity),
            ("liquid water", self.liquid),
            ("ice water", self.ice),
        ];
        for (name, column) in optional {
            if let Some(column) = column {
                LayerError::check_length(name, n, column.len())?;
            }
        }
        Ok(())
    }
}

/// Settings applied to every emitted layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    /// Add a `column dry_air vmr` line to each layer
    pub dry_air: bool,
    /// Line shape to request for each layer
    pub lineshape: Option<String>,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            dry_air: true,
            lineshape: None,
        }
    }
}

/// The previous emitted level.
#[derive(Debug, Clone, Copy)]
struct Level {
    pressure: f64,
    temperature: f64,
    height: f64,
    ozone: Option<f64>,
    relative_humidity: Option<f64>,
    liquid: Option<f64>,
    ice: Option<f64>,
}

/// Mean of the current and previous samples.
///
/// `None` if the current sample is missing. A missing previous sample leaves
/// the current one unsmoothed.
fn smoothed(current: f64, previous: Option<f64>) -> Option<f64> {
    if !current.is_finite() {
        return None;
    }
    match previous.filter(|p| p.is_finite()) {
        Some(prev) => Some((current + prev) / 2.0),
        None => Some(current),
    }
}

/// Column path (kg*m^-2) of a constituent between two levels.
fn cloud_path(mmr: f64, prev_mmr: f64, level: &Level, prev: &Level) -> f64 {
    let mean_mmr = (mmr + prev_mmr) / 2.0;
    let mean_p = (level.pressure + prev.pressure) / 2.0;
    let mean_t = (level.temperature + prev.temperature) / 2.0;
    mmr_to_density(mean_mmr, mean_p, mean_t) * (prev.height - level.height)
}

fn significant(path: f64) -> Option<f64> {
    (path > PATH_THRESHOLD).then_some(path)
}

/// Compile a profile into layers, top of atmosphere first.
///
/// The first layer is always the empty top-of-atmosphere layer. Levels with a
/// NaN temperature are skipped. Fails before producing any layer if a column
/// length differs from the pressure column.
pub fn compile_layers(columns: &ProfileColumns<'_>, options: &LayerOptions) -> Result<Vec<AtmosphericLayer>> {
    columns.validate()?;

    let mut layers = Vec::with_capacity(columns.len() + 1);
    layers.push(AtmosphericLayer::top_of_atmosphere());

    let mut prev: Option<Level> = None;
    for i in (0..columns.len()).rev() {
        let level = Level {
            pressure: columns.pressure[i],
            temperature: columns.temperature[i],
            height: columns.height[i],
            ozone: columns.ozone.map(|c| c[i]),
            relative_humidity: columns.relative_humidity.map(|c| c[i]),
            liquid: columns.liquid.map(|c| c[i]),
            ice: columns.ice.map(|c| c[i]),
        };
        if level.temperature.is_nan() {
            trace!(index = i, pressure = level.pressure, "Skipping level without temperature");
            continue;
        }

        let mut layer = AtmosphericLayer::new(level.pressure, level.temperature);
        layer.dry_air = options.dry_air;
        layer.lineshape = options.lineshape.clone();

        layer.ozone_vmr = level
            .ozone
            .and_then(|o3| smoothed(o3, prev.and_then(|p| p.ozone)))
            .map(|mmr| mmr_to_vmr(mmr, Species::Ozone));
        layer.relative_humidity = level
            .relative_humidity
            .and_then(|rh| smoothed(rh, prev.and_then(|p| p.relative_humidity)));

        if let Some(prev) = &prev {
            layer.ice_path = level
                .ice
                .zip(prev.ice)
                .map(|(qi, prev_qi)| cloud_path(qi, prev_qi, &level, prev))
                .filter(|&path| !(path > 0.0 && level.temperature > ICE_MAX_TEMPERATURE_K))
                .and_then(significant);
            layer.liquid_path = level
                .liquid
                .zip(prev.liquid)
                .map(|(ql, prev_ql)| cloud_path(ql, prev_ql, &level, prev))
                .filter(|&path| !(path > 0.0 && level.temperature < LIQUID_MIN_TEMPERATURE_K))
                .and_then(significant);
        }

        layers.push(layer);
        prev = Some(level);
    }

    debug!(
        levels = columns.len(),
        layers = layers.len(),
        "Compiled atmospheric layers"
    );
    Ok(layers)
}

/// Render layers as blank-line separated paragraphs.
pub fn render_layers(layers: &[AtmosphericLayer]) -> String {
    let mut out = String::new();
    for layer in layers {
        out.push_str(&layer.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerKind;
    use test_utils::assert_approx_eq;

    fn two_levels() -> ([f64; 2], [f64; 2], [f64; 2]) {
        ([700.0, 600.0], [262.0, 256.0], [3000.0, 4200.0])
    }

    #[test]
    fn test_top_layer_first() {
        let (p, t, h) = two_levels();
        let layers = compile_layers(&ProfileColumns::new(&p, &t, &h), &LayerOptions::default()).unwrap();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[0].kind, LayerKind::TopOfAtmosphere);
        assert_eq!(layers[1].pressure, 600.0);
        assert_eq!(layers[2].pressure, 700.0);
    }

    #[test]
    fn test_nan_temperature_skipped() {
        let p = [800.0, 700.0, 600.0];
        let t = [270.0, f64::NAN, 256.0];
        let h = [2000.0, 3000.0, 4200.0];
        let layers = compile_layers(&ProfileColumns::new(&p, &t, &h), &LayerOptions::default()).unwrap();
        let pressures: Vec<f64> = layers.iter().map(|l| l.pressure).collect();
        assert_eq!(pressures, vec![0.0, 600.0, 800.0]);
    }

    #[test]
    fn test_ozone_and_humidity_smoothing() {
        let (p, t, h) = two_levels();
        let o3 = [2e-6, 6e-6];
        let rh = [0.5, 0.1];
        let columns = ProfileColumns::new(&p, &t, &h)
            .with_ozone(&o3)
            .with_relative_humidity(&rh);
        let layers = compile_layers(&columns, &LayerOptions::default()).unwrap();

        assert_approx_eq!(layers[1].ozone_vmr.unwrap(), mmr_to_vmr(6e-6, Species::Ozone), 1e-18);
        assert_approx_eq!(layers[2].ozone_vmr.unwrap(), mmr_to_vmr(4e-6, Species::Ozone), 1e-18);
        assert_approx_eq!(layers[1].relative_humidity.unwrap(), 0.1, 1e-12);
        assert_approx_eq!(layers[2].relative_humidity.unwrap(), 0.3, 1e-12);
    }

    #[test]
    fn test_missing_humidity_omits_column_at_that_level() {
        let (p, t, h) = two_levels();
        let rh = [f64::NAN, 0.2];
        let layers = compile_layers(
            &ProfileColumns::new(&p, &t, &h).with_relative_humidity(&rh),
            &LayerOptions::default(),
        )
        .unwrap();
        assert_eq!(layers[1].relative_humidity, Some(0.2));
        assert_eq!(layers[2].relative_humidity, None);
        assert!(!layers[2].to_string().contains("column h2o"));

        let rh = [0.2, f64::NAN];
        let layers = compile_layers(
            &ProfileColumns::new(&p, &t, &h).with_relative_humidity(&rh),
            &LayerOptions::default(),
        )
        .unwrap();
        assert_eq!(layers[1].relative_humidity, None);
        assert_eq!(layers[2].relative_humidity, Some(0.2));

        let ozone = [f64::NAN, 5e-6];
        let layers = compile_layers(
            &ProfileColumns::new(&p, &t, &h).with_ozone(&ozone),
            &LayerOptions::default(),
        )
        .unwrap();
        assert_eq!(layers[2].ozone_vmr, None);

        let rh = [f64::NAN, f64::NAN];
        let layers = compile_layers(
            &ProfileColumns::new(&p, &t, &h).with_relative_humidity(&rh),
            &LayerOptions::default(),
        )
        .unwrap();
        assert_eq!(layers[2].relative_humidity, None);
    }

    #[test]
    fn test_cloud_path_uses_level_means() {
        let (p, t, h) = two_levels();
        let ql = [1e-5, 3e-5];
        let layers = compile_layers(&ProfileColumns::new(&p, &t, &h).with_liquid(&ql), &LayerOptions::default()).unwrap();

        // Topmost level has no level above it
        assert_eq!(layers[1].liquid_path, None);
        let expected = mmr_to_density(2e-5, 650.0, 259.0) * 1200.0;
        assert_approx_eq!(layers[2].liquid_path.unwrap(), expected, 1e-15);
    }

    #[test]
    fn test_ice_screened_above_freezing() {
        let p = [900.0, 850.0];
        let t = [280.0, 276.0];
        let h = [1000.0, 1500.0];
        let qi = [1e-5, 1e-5];
        let layers = compile_layers(&ProfileColumns::new(&p, &t, &h).with_ice(&qi), &LayerOptions::default()).unwrap();
        assert_eq!(layers[2].ice_path, None);

        let t = [270.0, 266.0];
        let layers = compile_layers(&ProfileColumns::new(&p, &t, &h).with_ice(&qi), &LayerOptions::default()).unwrap();
        assert!(layers[2].ice_path.is_some());
    }

    #[test]
    fn test_validation_before_emission() {
        let (p, t, h) = two_levels();
        let short = [0.5];
        let err = compile_layers(
            &ProfileColumns::new(&p, &t, &h).with_relative_humidity(&short),
            &LayerOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayerError::LengthMismatch {
                column: "relative humidity",
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_render_separates_layers() {
        let text = render_layers(&[AtmosphericLayer::top_of_atmosphere(), AtmosphericLayer::new(850.0, 280.0)]);
        assert_eq!(
            text,
            "layer   # empty layer for top of atmosphere\nPbase 0 mbar\nTbase 217 K\n\n\
             layer troposphere\nPbase 850.000 mbar\nTbase 280.000 K\n\n"
        );
    }
}
