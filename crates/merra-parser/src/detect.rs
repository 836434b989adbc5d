//! Format detection from the first two lines of a dump.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{ParseError, Result};
use crate::GridFormat;

/// Classify a dump from its second line.
///
/// Both formats share the dataset header on line 1; only the tagged format
/// starts line 2 with the longitude axis.
pub fn classify(second_line: &str) -> GridFormat {
    if second_line.starts_with("lon") {
        GridFormat::Tagged
    } else {
        GridFormat::Legacy
    }
}

/// Detect the format of in-memory text.
pub fn detect_format(text: &str) -> Result<GridFormat> {
    let mut lines = text.lines();
    match (lines.next(), lines.next()) {
        (Some(_), Some(second)) => Ok(classify(second)),
        (first, _) => Err(ParseError::TooShort {
            expected: 2,
            actual: usize::from(first.is_some()),
        }),
    }
}

/// Detect the format by reading exactly two lines from a reader.
pub fn detect_format_reader<R: BufRead>(mut reader: R) -> Result<GridFormat> {
    let mut first = String::new();
    let mut second = String::new();

    if reader.read_line(&mut first)? == 0 {
        return Err(ParseError::TooShort {
            expected: 2,
            actual: 0,
        });
    }
    if reader.read_line(&mut second)? == 0 {
        return Err(ParseError::TooShort {
            expected: 2,
            actual: 1,
        });
    }

    Ok(classify(&second))
}

/// Detect the format of a file without reading past its second line.
pub fn detect_format_path(path: impl AsRef<Path>) -> Result<GridFormat> {
    let path = path.as_ref();
    File::open(path)
        .map_err(ParseError::from)
        .and_then(|file| detect_format_reader(BufReader::new(file)))
        .map_err(|e| e.in_file(path))
}
