//! Spatial interpolation of MERRA-2 fields onto fixed sites.
//!
//! For each site a [`Stencil`] (bracketing lat/lon indices and weights) is
//! computed once from the grid axes, then applied to the `[lat, lon]` slice at
//! every hour, pressure level and quantity of a [`FieldDataset`]. The result
//! is one [`SiteProfile`] per site.
//!
//! ```ignore
//! use site_interpolator::{interpolate_sites, InterpolationConfig};
//!
//! let profiles = interpolate_sites(&dataset, &sites, InterpolationConfig::default())?;
//! ```

pub mod error;
pub mod method;
pub mod stencil;

use merra_common::{FieldDataset, Quantity, SiteCoord, SiteProfile, SiteTable};
use tracing::{debug, instrument, warn};

pub use error::{InterpolationError, Result};
pub use method::{Extrapolation, InterpolationConfig, InterpolationMethod};
pub use stencil::{AxisWeight, Stencil};

/// Samples the lat/lon grid of one dataset layout at arbitrary sites.
#[derive(Debug, Clone)]
pub struct SiteInterpolator {
    lat: Vec<f64>,
    lon: Vec<f64>,
    config: InterpolationConfig,
}

impl SiteInterpolator {
    /// Create an interpolator for the given latitude and longitude axes.
    ///
    /// Both axes must be non-empty and strictly monotonic.
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, config: InterpolationConfig) -> Result<Self> {
        check_axis("lat", &lat)?;
        check_axis("lon", &lon)?;
        Ok(Self { lat, lon, config })
    }

    /// Create an interpolator for the axes of a dataset.
    pub fn for_dataset(dataset: &FieldDataset, config: InterpolationConfig) -> Result<Self> {
        let axes = dataset.axes();
        Self::new(axes.lat.clone(), axes.lon.clone(), config)
    }

    pub fn config(&self) -> InterpolationConfig {
        self.config
    }

    /// Compute the sampling stencil for a site.
    pub fn stencil(&self, site: &str, coord: &SiteCoord) -> Result<Stencil> {
        if !coord.lon.is_finite() || !coord.lat.is_finite() {
            return Err(InterpolationError::InvalidCoordinate {
                site: site.to_string(),
                lon: coord.lon,
                lat: coord.lat,
            });
        }

        let stencil = Stencil::new(&self.lat, &self.lon, coord.lat, coord.lon, self.config.method)
            .check(self.config.extrapolation, site, coord.lon, coord.lat, || {
                self.bounds()
            })?;

        if stencil.is_outside() {
            warn!(
                site = %site,
                lon = coord.lon,
                lat = coord.lat,
                bounds = %self.bounds(),
                "Site outside grid, extrapolating"
            );
        }
        Ok(stencil)
    }

    /// Interpolate every quantity of `dataset` to one site.
    pub fn profile(&self, dataset: &FieldDataset, site: &str, coord: &SiteCoord) -> Result<SiteProfile> {
        let stencil = self.stencil(site, coord)?;
        let axes = dataset.axes();
        let (nhour, npres, _, _) = dataset.shape();

        let mut profile = SiteProfile::new(site, *coord, axes.hour.clone(), axes.pres.clone());
        for quantity in Quantity::ALL {
            let column = profile.get_mut(quantity);
            for t in 0..nhour {
                for p in 0..npres {
                    column[[t, p]] = stencil.sample(dataset.slice(quantity, t, p));
                }
            }
        }
        Ok(profile)
    }

    fn bounds(&self) -> String {
        format!(
            "lat [{}, {}] lon [{}, {}]",
            self.lat[0],
            self.lat[self.lat.len() - 1],
            self.lon[0],
            self.lon[self.lon.len() - 1]
        )
    }
}

/// Interpolate a dataset to every site of a table.
///
/// Profiles come back in site-name order.
#[instrument(skip_all, fields(sites = sites.len()))]
pub fn interpolate_sites(
    dataset: &FieldDataset,
    sites: &SiteTable,
    config: InterpolationConfig,
) -> Result<Vec<SiteProfile>> {
    let interpolator = SiteInterpolator::for_dataset(dataset, config)?;
    let profiles = sites
        .iter()
        .map(|(name, coord)| interpolator.profile(dataset, name, coord))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        count = profiles.len(),
        method = %config.method,
        "Interpolated site profiles"
    );
    Ok(profiles)
}

fn check_axis(axis: &'static str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(InterpolationError::EmptyAxis { axis });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(InterpolationError::NonMonotonic { axis, index });
    }
    if values.len() < 2 {
        return Ok(());
    }
    let ascending = values[1] > values[0];
    for (i, pair) in values.windows(2).enumerate() {
        let ordered = if ascending {
            pair[1] > pair[0]
        } else {
            pair[1] < pair[0]
        };
        if !ordered {
            return Err(InterpolationError::NonMonotonic { axis, index: i + 1 });
        }
    }
    Ok(())
}
