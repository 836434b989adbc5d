//! Legacy dump format with bracketed integer indices.
//!
//! ```text
//! Dataset: MERRA2_300.inst3_3d_asm_Np.20100101.nc4
//! H[0][0][0], 112.6, 113.1, 113.7
//! ...
//! lat, -24.0, -23.5
//! lev, 1000, 975
//! lon, 16.25, 16.875, 17.5
//! time, 0, 180, 360
//! ```
//!
//! Data rows start with the variable name and three bracket groups
//! `[time][lev][lat]`; the row holds one value per longitude. The last four
//! lines carry the axes, bottom-up: time (minutes), longitude, pressure,
//! latitude.

use merra_common::{FieldDataset, GridAxes, Quantity};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::options::ParseOptions;
use crate::rows::{parse_axis_row, parse_values, GridBuilder};
use crate::{GridDecoder, GridFormat};

static INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([0-9]+)\]").unwrap());

/// Header line plus four axis rows.
const MIN_LINES: usize = 5;

/// Decoder for the legacy bracket-index format.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyDecoder;

impl LegacyDecoder {
    fn read_axes(lines: &[&str]) -> Result<GridAxes> {
        let n = lines.len();
        let (_, minutes) = parse_axis_row(lines[n - 1], n, "time")?;
        let (_, lon) = parse_axis_row(lines[n - 2], n - 1, "lon")?;
        let (_, pres) = parse_axis_row(lines[n - 3], n - 2, "lev")?;
        let (_, lat) = parse_axis_row(lines[n - 4], n - 3, "lat")?;
        Ok(GridAxes::from_raw(&minutes, pres, lat, lon))
    }
}

/// Split `NAME[a][b][c], v0, v1` into its quantity and the rest of the line.
///
/// Only an exact variable name in front of the first bracket counts, so each
/// line belongs to at most one quantity.
fn match_quantity(line: &str) -> Option<(Quantity, &str)> {
    let bracket = line.find('[')?;
    Quantity::from_name(&line[..bracket]).map(|q| (q, &line[bracket..]))
}

fn parse_indices(head: &str, line: usize, raw: &str) -> Result<[usize; 3]> {
    let indices: Vec<usize> = INDEX_RE
        .captures_iter(head)
        .filter_map(|c| c[1].parse().ok())
        .collect();

    match indices.as_slice() {
        [t, p, k] => Ok([*t, *p, *k]),
        _ => Err(ParseError::malformed(
            line,
            format!("three [time][lev][lat] indices, got {}", indices.len()),
            raw,
        )),
    }
}

impl GridDecoder for LegacyDecoder {
    fn format(&self) -> GridFormat {
        GridFormat::Legacy
    }

    fn decode(&self, text: &str, options: &ParseOptions) -> Result<FieldDataset> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.len() < MIN_LINES {
            return Err(ParseError::TooShort {
                expected: MIN_LINES,
                actual: lines.len(),
            });
        }

        let axes = Self::read_axes(&lines)?;
        debug!(shape = ?axes.shape(), "Read legacy axes");

        let mut builder = GridBuilder::new(axes, *options);
        let data_lines = &lines[..lines.len() - 4];
        let mut rows = 0usize;

        for (idx, raw) in data_lines.iter().enumerate() {
            let line = idx + 1;
            let Some((quantity, rest)) = match_quantity(raw) else {
                continue;
            };
            let (head, values) = rest
                .split_once(',')
                .ok_or_else(|| ParseError::malformed(line, "a comma after the indices", raw))?;

            let [t, p, k] = parse_indices(head, line, raw)?;
            let values = parse_values(values, line, quantity)?;
            builder.write(line, quantity, t, p, k, &values)?;
            rows += 1;
        }

        debug!(rows, "Decoded legacy rows");
        builder.finish()
    }
}
