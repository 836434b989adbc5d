//! Clipping a vertical profile at a minimum height.

use tracing::trace;

use crate::error::{LayerError, Result};

/// Heights and co-indexed columns after truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct TruncatedProfile {
    pub height: Vec<f64>,
    /// Columns in the order they were passed in
    pub columns: Vec<Vec<f64>>,
}

impl TruncatedProfile {
    pub fn len(&self) -> usize {
        self.height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height.is_empty()
    }
}

/// Clip a profile so that it starts at `min_height`.
///
/// Levels with a NaN height are dropped first. If the first remaining level
/// is already above `min_height` the profile is returned unchanged. Otherwise
/// every column is linearly interpolated to `min_height` along the height
/// axis, and that boundary sample is prepended to the levels strictly above
/// `min_height`.
///
/// Applying the same truncation twice gives the same result as applying it
/// once.
pub fn limit_height(height: &[f64], min_height: f64, columns: &[&[f64]]) -> Result<TruncatedProfile> {
    for column in columns {
        LayerError::check_length("column", height.len(), column.len())?;
    }

    let keep: Vec<usize> = (0..height.len()).filter(|&i| !height[i].is_nan()).collect();
    if keep.is_empty() {
        return Err(LayerError::EmptyProfile);
    }
    let h: Vec<f64> = keep.iter().map(|&i| height[i]).collect();
    let cols: Vec<Vec<f64>> = columns
        .iter()
        .map(|c| keep.iter().map(|&i| c[i]).collect())
        .collect();

    if h[0] > min_height {
        return Ok(TruncatedProfile {
            height: h,
            columns: cols,
        });
    }

    let bracket = Bracket::find(&h, min_height)?;
    let above: Vec<usize> = (0..h.len()).filter(|&i| h[i] > min_height).collect();
    trace!(
        min_height,
        dropped = h.len() - above.len(),
        "Truncating profile"
    );

    let mut height = Vec::with_capacity(above.len() + 1);
    height.push(min_height);
    height.extend(above.iter().map(|&i| h[i]));

    let columns = cols
        .iter()
        .map(|c| {
            let mut out = Vec::with_capacity(above.len() + 1);
            out.push(bracket.apply(c));
            out.extend(above.iter().map(|&i| c[i]));
            out
        })
        .collect();

    Ok(TruncatedProfile { height, columns })
}

/// Two levels around the target height and the weight of the second.
struct Bracket {
    lower: usize,
    upper: usize,
    weight: f64,
}

impl Bracket {
    /// Locate `x` among heights, in height order regardless of level order.
    fn find(h: &[f64], x: f64) -> Result<Self> {
        let mut order: Vec<usize> = (0..h.len()).collect();
        order.sort_by(|&a, &b| h[a].total_cmp(&h[b]));

        let (lowest, highest) = (h[order[0]], h[order[order.len() - 1]]);
        if x < lowest || x > highest {
            return Err(LayerError::HeightOutOfRange {
                min_height: x,
                top: highest,
            });
        }
        if order.len() == 1 {
            return Ok(Self {
                lower: order[0],
                upper: order[0],
                weight: 0.0,
            });
        }

        let after = order.partition_point(|&i| h[i] <= x);
        let pos = after.saturating_sub(1).min(order.len() - 2);
        let (lower, upper) = (order[pos], order[pos + 1]);
        let span = h[upper] - h[lower];
        let weight = if span == 0.0 { 0.0 } else { (x - h[lower]) / span };
        Ok(Self {
            lower,
            upper,
            weight,
        })
    }

    fn apply(&self, column: &[f64]) -> f64 {
        let (a, b) = (column[self.lower], column[self.upper]);
        if self.weight == 0.0 {
            a
        } else if self.weight == 1.0 {
            b
        } else {
            a + self.weight * (b - a)
        }
    }
}
