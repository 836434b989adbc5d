//! Tagged dump format with `name=value` coordinates.
//!
//! ```text
//! Dataset: MERRA2_400.inst3_3d_asm_Np.20230101.nc4
//! lon, 16.25, 16.875
//! lat, -24.0, -23.5
//! lev, 1000, 975
//! time, 0, 180
//!
//! H.lon, 16.25, 16.875
//! H[time=0][lev=1000][lat=-24.0], 112.6, 113.1
//! ```
//!
//! Axes sit on lines 2-5. Data rows name their coordinates with `time=`,
//! `lev=` and `lat=` tags whose text must match an axis entry exactly.
//! `NAME.lon` lines echo the longitude axis and are skipped.

use std::collections::HashMap;

use merra_common::{FieldDataset, GridAxes, Quantity};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::options::ParseOptions;
use crate::rows::{parse_axis_row, parse_values, GridBuilder};
use crate::{GridDecoder, GridFormat};

static TIME_RE: Lazy<Regex> = Lazy::new(|| tag_regex("time"));
static LEV_RE: Lazy<Regex> = Lazy::new(|| tag_regex("lev"));
static LAT_RE: Lazy<Regex> = Lazy::new(|| tag_regex("lat"));

fn tag_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"{}=(-?[0-9]+(?:\.[0-9]+)?)", tag)).unwrap()
}

/// Dataset header plus the four axis rows.
const HEADER_LINES: usize = 5;

/// Axis values and the verbatim-text lookup used to resolve tags.
struct TaggedAxis {
    values: Vec<f64>,
    index: HashMap<String, usize>,
}

impl TaggedAxis {
    fn parse(text: &str, line: usize, name: &str) -> Result<Self> {
        let (tokens, values) = parse_axis_row(text, line, name)?;
        let index = tokens
            .into_iter()
            .enumerate()
            .map(|(i, token)| (token.to_string(), i))
            .collect();
        Ok(Self { values, index })
    }

    fn lookup(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }
}

/// Decoder for the tagged format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedDecoder;

fn leading_identifier(line: &str) -> &str {
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    &line[..end]
}

fn resolve_tag(
    re: &Regex,
    tag: &'static str,
    head: &str,
    axis: &TaggedAxis,
    line: usize,
    quantity: Quantity,
    raw: &str,
) -> Result<usize> {
    let value = re
        .captures(head)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
        .ok_or_else(|| ParseError::malformed(line, format!("a {}=<value> tag", tag), raw))?;

    axis.lookup(value).ok_or_else(|| ParseError::UnknownTag {
        line,
        quantity,
        tag,
        value: value.to_string(),
    })
}

impl GridDecoder for TaggedDecoder {
    fn format(&self) -> GridFormat {
        GridFormat::Tagged
    }

    fn decode(&self, text: &str, options: &ParseOptions) -> Result<FieldDataset> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() < HEADER_LINES {
            return Err(ParseError::TooShort {
                expected: HEADER_LINES,
                actual: lines.len(),
            });
        }

        let lon = TaggedAxis::parse(lines[1], 2, "lon")?;
        let lat = TaggedAxis::parse(lines[2], 3, "lat")?;
        let lev = TaggedAxis::parse(lines[3], 4, "lev")?;
        let time = TaggedAxis::parse(lines[4], 5, "time")?;

        let axes = GridAxes::from_raw(
            &time.values,
            lev.values.clone(),
            lat.values.clone(),
            lon.values.clone(),
        );
        debug!(shape = ?axes.shape(), "Read tagged axes");

        let mut builder = GridBuilder::new(axes, *options);
        let mut rows = 0usize;

        for (idx, raw) in lines.iter().enumerate().skip(HEADER_LINES) {
            let line = idx + 1;
            let Some(quantity) = Quantity::from_name(leading_identifier(raw)) else {
                continue;
            };
            if raw[quantity.name().len()..].starts_with(".lon") {
                continue;
            }

            let (head, values) = raw
                .split_once(',')
                .ok_or_else(|| ParseError::malformed(line, "a comma after the coordinate tags", raw))?;

            let t = resolve_tag(&TIME_RE, "time", head, &time, line, quantity, raw)?;
            let p = resolve_tag(&LEV_RE, "lev", head, &lev, line, quantity, raw)?;
            let k = resolve_tag(&LAT_RE, "lat", head, &lat, line, quantity, raw)?;

            let values = parse_values(values, line, quantity)?;
            builder.write(line, quantity, t, p, k, &values)?;
            rows += 1;
        }

        debug!(rows, "Decoded tagged rows");
        builder.finish()
    }
}
