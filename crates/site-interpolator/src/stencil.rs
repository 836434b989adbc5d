//! Bracketing indices and weights for one site on a rectilinear grid.
//!
//! A [`Stencil`] depends only on the lat/lon axes and the site coordinate, so
//! it is computed once per site and applied to every `[hour, pres]` slice of
//! every quantity.

use ndarray::ArrayView2;

use crate::error::{InterpolationError, Result};
use crate::method::{Extrapolation, InterpolationMethod};

/// Position of a coordinate along one axis.
///
/// The sampled value is `v[lower] * (1 - weight) + v[upper] * weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWeight {
    pub lower: usize,
    pub upper: usize,
    pub weight: f64,
    /// True when the coordinate lies beyond the first or last node.
    pub outside: bool,
}

impl AxisWeight {
    fn node(index: usize) -> Self {
        Self {
            lower: index,
            upper: index,
            weight: 0.0,
            outside: false,
        }
    }

    /// Locate `x` on a strictly monotonic axis.
    ///
    /// A length-1 axis is constant along its dimension. Coordinates beyond the
    /// ends use the edge cell with a weight outside `[0, 1]`.
    pub fn locate(axis: &[f64], x: f64) -> Self {
        let n = axis.len();
        if n == 1 {
            return Self::node(0);
        }

        let ascending = axis[n - 1] > axis[0];
        let after = if ascending {
            axis.partition_point(|&v| v <= x)
        } else {
            axis.partition_point(|&v| v >= x)
        };
        let lower = after.saturating_sub(1).min(n - 2);
        let upper = lower + 1;
        let weight = (x - axis[lower]) / (axis[upper] - axis[lower]);

        Self {
            lower,
            upper,
            weight,
            outside: !(0.0..=1.0).contains(&weight),
        }
    }

    /// Collapse onto the closest node. Ties go to the lower index.
    fn nearest(self) -> Self {
        let index = if self.weight > 0.5 {
            self.upper
        } else {
            self.lower
        };
        Self {
            outside: self.outside,
            ..Self::node(index)
        }
    }

    /// Node indices with non-zero weight.
    fn terms(&self) -> impl Iterator<Item = (usize, f64)> {
        let lower = (self.lower, 1.0 - self.weight);
        let upper = (self.upper, self.weight);
        let same = self.lower == self.upper;
        std::iter::once(lower)
            .chain(std::iter::once(upper).filter(move |_| !same))
            .filter(|(_, w)| *w != 0.0)
    }
}

/// Precomputed sampling weights for one site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stencil {
    pub lat: AxisWeight,
    pub lon: AxisWeight,
}

impl Stencil {
    /// Build the stencil for `(lat, lon)` on the given axes.
    pub fn new(
        lat_axis: &[f64],
        lon_axis: &[f64],
        lat: f64,
        lon: f64,
        method: InterpolationMethod,
    ) -> Self {
        let lat = AxisWeight::locate(lat_axis, lat);
        let lon = AxisWeight::locate(lon_axis, lon);
        match method {
            InterpolationMethod::Bilinear => Self { lat, lon },
            InterpolationMethod::Nearest => Self {
                lat: lat.nearest(),
                lon: lon.nearest(),
            },
        }
    }

    /// True if the site lies beyond the grid on either axis.
    pub fn is_outside(&self) -> bool {
        self.lat.outside || self.lon.outside
    }

    /// Apply the extrapolation policy.
    pub fn check(
        self,
        policy: Extrapolation,
        site: &str,
        lon: f64,
        lat: f64,
        bounds: impl FnOnce() -> String,
    ) -> Result<Self> {
        if self.is_outside() && policy == Extrapolation::Reject {
            return Err(InterpolationError::OutsideGrid {
                site: site.to_string(),
                lon,
                lat,
                bounds: bounds(),
            });
        }
        Ok(self)
    }

    /// Sample a `[lat, lon]` slice.
    ///
    /// Returns NaN if any node with non-zero weight is NaN.
    pub fn sample(&self, slice: ArrayView2<'_, f64>) -> f64 {
        let mut total = 0.0;
        for (j, wj) in self.lat.terms() {
            for (i, wi) in self.lon.terms() {
                let v = slice[[j, i]];
                if v.is_nan() {
                    return f64::NAN;
                }
                total += v * wj * wi;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_locate_ascending() {
        let w = AxisWeight::locate(&[0.0, 1.0, 3.0], 2.0);
        assert_eq!((w.lower, w.upper), (1, 2));
        assert_approx_eq!(w.weight, 0.5, 1e-12);
        assert!(!w.outside);
    }

    #[test]
    fn test_locate_descending() {
        let w = AxisWeight::locate(&[1000.0, 500.0, 100.0], 300.0);
        assert_eq!((w.lower, w.upper), (1, 2));
        assert_approx_eq!(w.weight, 0.5, 1e-12);
    }

    #[test]
    fn test_locate_on_nodes() {
        let axis = [-24.0, -23.5, -23.0];
        let first = AxisWeight::locate(&axis, -24.0);
        assert_eq!((first.lower, first.weight), (0, 0.0));
        let last = AxisWeight::locate(&axis, -23.0);
        assert_eq!((last.lower, last.upper, last.weight), (1, 2, 1.0));
        assert!(!last.outside);
    }

    #[test]
    fn test_locate_outside() {
        let below = AxisWeight::locate(&[0.0, 1.0], -0.5);
        assert_eq!(below.lower, 0);
        assert_approx_eq!(below.weight, -0.5, 1e-12);
        assert!(below.outside);

        let above = AxisWeight::locate(&[0.0, 1.0], 2.0);
        assert_approx_eq!(above.weight, 2.0, 1e-12);
        assert!(above.outside);
    }

    #[test]
    fn test_single_node_axis() {
        let w = AxisWeight::locate(&[850.0], 12.0);
        assert_eq!((w.lower, w.upper, w.weight), (0, 0, 0.0));
        assert!(!w.outside);
    }

    #[test]
    fn test_bilinear_sample() {
        let slice = array![[1.0, 2.0], [3.0, 4.0]];
        let lat = [0.0, 1.0];
        let lon = [0.0, 1.0];

        let corner = Stencil::new(&lat, &lon, 1.0, 0.0, InterpolationMethod::Bilinear);
        assert_eq!(corner.sample(slice.view()), 3.0);

        let centre = Stencil::new(&lat, &lon, 0.5, 0.5, InterpolationMethod::Bilinear);
        assert_approx_eq!(centre.sample(slice.view()), 2.5, 1e-12);

        let edge = Stencil::new(&lat, &lon, 0.0, 0.25, InterpolationMethod::Bilinear);
        assert_approx_eq!(edge.sample(slice.view()), 1.25, 1e-12);
    }

    #[test]
    fn test_linear_extrapolation() {
        let slice = array![[1.0, 2.0], [3.0, 4.0]];
        let stencil = Stencil::new(&[0.0, 1.0], &[0.0, 1.0], 0.0, 2.0, InterpolationMethod::Bilinear);
        assert!(stencil.is_outside());
        assert_approx_eq!(stencil.sample(slice.view()), 3.0, 1e-12);
    }

    #[test]
    fn test_nearest_sample() {
        let slice = array![[1.0, 2.0], [3.0, 4.0]];
        let lat = [0.0, 1.0];
        let lon = [0.0, 1.0];
        let s = Stencil::new(&lat, &lon, 0.4, 0.6, InterpolationMethod::Nearest);
        assert_eq!(s.sample(slice.view()), 2.0);
        let s = Stencil::new(&lat, &lon, 0.6, 0.4, InterpolationMethod::Nearest);
        assert_eq!(s.sample(slice.view()), 3.0);
    }

    #[test]
    fn test_nan_corner_poisons_sample() {
        let slice = array![[1.0, f64::NAN], [3.0, 4.0]];
        let lat = [0.0, 1.0];
        let lon = [0.0, 1.0];
        let centre = Stencil::new(&lat, &lon, 0.5, 0.5, InterpolationMethod::Bilinear);
        assert!(centre.sample(slice.view()).is_nan());

        // A node carrying zero weight does not contribute
        let corner = Stencil::new(&lat, &lon, 1.0, 0.0, InterpolationMethod::Bilinear);
        assert_eq!(corner.sample(slice.view()), 3.0);
    }

    #[test]
    fn test_reject_outside() {
        let stencil = Stencil::new(&[0.0, 1.0], &[0.0, 1.0], 5.0, 0.5, InterpolationMethod::Bilinear);
        let err = stencil
            .check(Extrapolation::Reject, "far", 0.5, 5.0, || "lat [0, 1]".to_string())
            .unwrap_err();
        assert!(matches!(err, InterpolationError::OutsideGrid { .. }));
        assert!(stencil
            .check(Extrapolation::Linear, "far", 0.5, 5.0, String::new)
            .is_ok());
    }
}
