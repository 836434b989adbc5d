//! Helpers shared by the two line formats.

use merra_common::{sentinel_to_nan, FieldDataset, GridAxes, Quantity};
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::options::{ParseOptions, UnpopulatedCells};

/// Parse an axis row `label, v0, v1, ...`, dropping the label.
///
/// Returns the trimmed tokens next to their values so callers can keep the
/// verbatim text.
pub(crate) fn parse_axis_row<'a>(
    text: &'a str,
    line: usize,
    axis: &str,
) -> Result<(Vec<&'a str>, Vec<f64>)> {
    let tokens: Vec<&str> = text.split(',').skip(1).map(str::trim).collect();
    if tokens.is_empty() || tokens.iter().all(|t| t.is_empty()) {
        return Err(ParseError::malformed(
            line,
            format!("a '{}' axis row with at least one value", axis),
            text,
        ));
    }

    let values = tokens
        .iter()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ParseError::invalid_number(line, token, format!("{} axis", axis)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((tokens, values))
}

/// Parse the comma separated values of a data row, mapping fill values to NaN.
pub(crate) fn parse_values(text: &str, line: usize, quantity: Quantity) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<f64>()
                .map(sentinel_to_nan)
                .map_err(|_| ParseError::invalid_number(line, token, format!("{} row", quantity)))
        })
        .collect()
}

/// Dataset under construction plus a record of which rows were written.
pub(crate) struct GridBuilder {
    dataset: FieldDataset,
    written: Vec<bool>,
    options: ParseOptions,
}

impl GridBuilder {
    pub(crate) fn new(axes: GridAxes, options: ParseOptions) -> Self {
        let rows = axes.row_count() * Quantity::ALL.len();
        Self {
            dataset: FieldDataset::filled(axes, options.unpopulated.initial_value()),
            written: vec![false; rows],
            options,
        }
    }

    pub(crate) fn shape(&self) -> (usize, usize, usize, usize) {
        self.dataset.shape()
    }

    pub(crate) fn write(
        &mut self,
        line: usize,
        quantity: Quantity,
        hour: usize,
        pres: usize,
        lat: usize,
        values: &[f64],
    ) -> Result<()> {
        self.dataset
            .write_row(quantity, hour, pres, lat, values)
            .map_err(|source| ParseError::Shape {
                line,
                quantity,
                source,
            })?;

        let (nhour, npres, nlat, _) = self.shape();
        let slot = ((quantity.index() * nhour + hour) * npres + pres) * nlat + lat;
        self.written[slot] = true;
        Ok(())
    }

    /// Finish decoding, applying the unpopulated-cell policy.
    pub(crate) fn finish(self) -> Result<FieldDataset> {
        let total = self.written.len();
        let missing = self.written.iter().filter(|w| !**w).count();

        if missing > 0 {
            warn!(
                missing,
                total,
                policy = ?self.options.unpopulated,
                "Grid dump leaves rows unwritten"
            );
            if self.options.unpopulated == UnpopulatedCells::Reject {
                return Err(ParseError::Incomplete { missing, total });
            }
        }

        Ok(self.dataset)
    }
}
