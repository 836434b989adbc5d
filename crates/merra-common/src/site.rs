//! Observation sites and the vertical profiles sampled at them.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quantity::Quantity;

/// Geographic position of a site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteCoord {
    /// Longitude in degrees
    pub lon: f64,
    /// Latitude in degrees
    pub lat: f64,
    /// Altitude above sea level in meters
    pub altitude: f64,
}

impl SiteCoord {
    pub fn new(lon: f64, lat: f64, altitude: f64) -> Self {
        Self { lon, lat, altitude }
    }
}

/// Mapping from site name to coordinate, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteTable(BTreeMap<String, SiteCoord>);

impl SiteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, coord: SiteCoord) -> Option<SiteCoord> {
        self.0.insert(name.into(), coord)
    }

    pub fn get(&self, name: &str) -> Option<&SiteCoord> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SiteCoord)> {
        self.0.iter().map(|(name, coord)| (name.as_str(), coord))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SiteCoord)> for SiteTable {
    fn from_iter<I: IntoIterator<Item = (String, SiteCoord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Interpolated `[hour, pres]` arrays for every quantity at one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    pub site: String,
    pub coord: SiteCoord,
    pub hour: Vec<f64>,
    pub pres: Vec<f64>,
    values: Vec<Array2<f64>>,
}

impl SiteProfile {
    /// Create a profile with all values set to NaN.
    pub fn new(site: impl Into<String>, coord: SiteCoord, hour: Vec<f64>, pres: Vec<f64>) -> Self {
        let shape = (hour.len(), pres.len());
        let values = Quantity::ALL
            .iter()
            .map(|_| Array2::from_elem(shape, f64::NAN))
            .collect();
        Self {
            site: site.into(),
            coord,
            hour,
            pres,
            values,
        }
    }

    /// Shape `(Nhour, Npres)` shared by every quantity.
    pub fn shape(&self) -> (usize, usize) {
        (self.hour.len(), self.pres.len())
    }

    pub fn get(&self, quantity: Quantity) -> &Array2<f64> {
        &self.values[quantity.index()]
    }

    pub fn get_mut(&mut self, quantity: Quantity) -> &mut Array2<f64> {
        &mut self.values[quantity.index()]
    }

    /// Vertical column of one quantity at an hour index.
    pub fn column(&self, quantity: Quantity, hour: usize) -> ArrayView1<'_, f64> {
        self.values[quantity.index()].row(hour)
    }
}
