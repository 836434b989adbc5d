//! Axis vectors and the dense 4-D field dataset.

use ndarray::{s, Array4, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::missing::snap_near_zero;
use crate::quantity::Quantity;

/// Errors raised when writing into a [`FieldDataset`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShapeError {
    #[error("index [{hour}][{pres}][{lat}] outside grid of shape {shape:?}")]
    IndexOutOfBounds {
        hour: usize,
        pres: usize,
        lat: usize,
        shape: (usize, usize, usize, usize),
    },

    #[error("row has {actual} values but the longitude axis has {expected}")]
    RowLength { expected: usize, actual: usize },
}

/// Coordinate vectors of a grid dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    /// Decimal hours (minute-of-day / 60)
    pub hour: Vec<f64>,
    /// Pressure levels in mbar, in file order
    pub pres: Vec<f64>,
    /// Latitudes in degrees
    pub lat: Vec<f64>,
    /// Longitudes in degrees
    pub lon: Vec<f64>,
}

impl GridAxes {
    /// Build axes from raw vectors, converting minutes to hours and snapping
    /// near-zero latitudes and longitudes.
    pub fn from_raw(minutes: &[f64], pres: Vec<f64>, mut lat: Vec<f64>, mut lon: Vec<f64>) -> Self {
        snap_near_zero(&mut lat);
        snap_near_zero(&mut lon);
        Self {
            hour: minutes.iter().map(|m| m / 60.0).collect(),
            pres,
            lat,
            lon,
        }
    }

    /// Shape `(Nhour, Npres, Nlat, Nlon)`.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.hour.len(), self.pres.len(), self.lat.len(), self.lon.len())
    }

    /// Number of `[hour, pres, lat]` rows in a complete dataset.
    pub fn row_count(&self) -> usize {
        self.hour.len() * self.pres.len() * self.lat.len()
    }
}

/// Six co-shaped 4-D arrays indexed `[hour, pres, lat, lon]`.
///
/// Every array has the shape given by the axes; it is fixed before any data
/// row is written.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDataset {
    axes: GridAxes,
    fields: Vec<Array4<f64>>,
}

impl FieldDataset {
    /// Allocate a dataset with every cell set to `fill`.
    pub fn filled(axes: GridAxes, fill: f64) -> Self {
        let shape = axes.shape();
        let fields = Quantity::ALL
            .iter()
            .map(|_| Array4::from_elem(shape, fill))
            .collect();
        Self { axes, fields }
    }

    pub fn axes(&self) -> &GridAxes {
        &self.axes
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        self.axes.shape()
    }

    /// The 4-D array for one quantity.
    pub fn field(&self, quantity: Quantity) -> &Array4<f64> {
        &self.fields[quantity.index()]
    }

    /// The lat/lon slice of one quantity at a given hour and pressure index.
    pub fn slice(&self, quantity: Quantity, hour: usize, pres: usize) -> ArrayView2<'_, f64> {
        self.fields[quantity.index()].slice(s![hour, pres, .., ..])
    }

    /// The longitude row at `[hour, pres, lat]`.
    pub fn row(&self, quantity: Quantity, hour: usize, pres: usize, lat: usize) -> ArrayView1<'_, f64> {
        self.fields[quantity.index()].slice(s![hour, pres, lat, ..])
    }

    /// Overwrite the longitude row at `[hour, pres, lat]`.
    pub fn write_row(
        &mut self,
        quantity: Quantity,
        hour: usize,
        pres: usize,
        lat: usize,
        values: &[f64],
    ) -> Result<(), ShapeError> {
        let shape = self.shape();
        if hour >= shape.0 || pres >= shape.1 || lat >= shape.2 {
            return Err(ShapeError::IndexOutOfBounds {
                hour,
                pres,
                lat,
                shape,
            });
        }
        if values.len() != shape.3 {
            return Err(ShapeError::RowLength {
                expected: shape.3,
                actual: values.len(),
            });
        }

        let mut row = self.fields[quantity.index()].slice_mut(s![hour, pres, lat, ..]);
        for (cell, value) in row.iter_mut().zip(values) {
            *cell = *value;
        }
        Ok(())
    }
}
