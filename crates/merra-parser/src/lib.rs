//! Decoder for MERRA-2 ASCII grid dumps.
//!
//! Two incompatible text encodings of the same 4-D field are in circulation:
//!
//! - **Legacy** ([`LegacyDecoder`]): rows keyed by bracketed integer indices
//!   `H[t][p][k]`, axes in the last four lines.
//! - **Tagged** ([`TaggedDecoder`]): rows keyed by `time=`, `lev=`, `lat=`
//!   tags, axes in lines 2-5.
//!
//! [`detect_format`] classifies a dump from its first two lines and
//! [`decode_str`] / [`decode_file`] dispatch to the matching decoder. Both
//! produce the same [`FieldDataset`]; raw values above `1e14` become NaN.
//!
//! # Example
//!
//! ```ignore
//! use merra_parser::{decode_file, ParseOptions};
//!
//! let dataset = decode_file("MERRA2_400.inst3_3d_asm_Np.20230101.ascii", &ParseOptions::default())?;
//! println!("{:?}", dataset.shape());
//! ```

pub mod detect;
pub mod error;
pub mod legacy;
pub mod options;
mod rows;
pub mod tagged;

use std::fmt;
use std::path::Path;

use merra_common::FieldDataset;
use tracing::{debug, instrument};

pub use detect::{classify, detect_format, detect_format_path, detect_format_reader};
pub use error::{ParseError, Result};
pub use legacy::LegacyDecoder;
pub use options::{ParseOptions, UnpopulatedCells};
pub use tagged::TaggedDecoder;

/// The text encodings a dump can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridFormat {
    /// Bracket-index rows, axes at the end of the file
    Legacy,
    /// `name=value` tagged rows, axes at the start of the file
    Tagged,
}

impl fmt::Display for GridFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridFormat::Legacy => f.write_str("legacy"),
            GridFormat::Tagged => f.write_str("tagged"),
        }
    }
}

/// Decodes one encoding of a grid dump into a [`FieldDataset`].
pub trait GridDecoder {
    /// The encoding this decoder understands.
    fn format(&self) -> GridFormat;

    /// Decode the full text of a dump.
    fn decode(&self, text: &str, options: &ParseOptions) -> Result<FieldDataset>;
}

/// Get the decoder for a format.
pub fn decoder_for(format: GridFormat) -> Box<dyn GridDecoder + Send + Sync> {
    match format {
        GridFormat::Legacy => Box::new(LegacyDecoder),
        GridFormat::Tagged => Box::new(TaggedDecoder),
    }
}

/// Detect the format of `text` and decode it.
pub fn decode_str(text: &str, options: &ParseOptions) -> Result<FieldDataset> {
    let format = detect_format(text)?;
    debug!(%format, "Detected grid dump format");
    decoder_for(format).decode(text, options)
}

/// Decode raw bytes holding UTF-8 dump text.
pub fn decode_bytes(bytes: &[u8], options: &ParseOptions) -> Result<FieldDataset> {
    decode_str(std::str::from_utf8(bytes)?, options)
}

/// Read a whole dump from disk and decode it.
///
/// Errors are attributed to `path`.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decode_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<FieldDataset> {
    let path = path.as_ref();
    std::fs::read(path)
        .map_err(ParseError::from)
        .and_then(|bytes| decode_bytes(&bytes, options))
        .map_err(|e| e.in_file(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_for_reports_format() {
        assert_eq!(decoder_for(GridFormat::Legacy).format(), GridFormat::Legacy);
        assert_eq!(decoder_for(GridFormat::Tagged).format(), GridFormat::Tagged);
    }

    #[test]
    fn test_decode_bytes_rejects_invalid_utf8() {
        let err = decode_bytes(&[b'a', b'\n', 0xff, 0xfe], &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ParseError::Utf8(_)));
    }
}
