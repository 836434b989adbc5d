//! Layered-atmosphere model text from vertical profiles.
//!
//! - [`physics`]: mixing-ratio and density conversions
//! - [`truncate`]: clip a profile at the site altitude
//! - [`compiler`]: turn a profile into [`AtmosphericLayer`]s
//! - [`preamble`]: document header and complete [`ModelDocument`]s
//!
//! ```ignore
//! use layer_compiler::{compile_layers, limit_height, LayerOptions, ModelDocument, Preamble, ProfileColumns};
//!
//! let clipped = limit_height(&height, 2347.0, &[&pressure, &temperature])?;
//! let columns = ProfileColumns::new(&clipped.columns[0], &clipped.columns[1], &clipped.height);
//! let layers = compile_layers(&columns, &LayerOptions::default())?;
//! println!("{}", ModelDocument::new(Preamble::default(), layers));
//! ```

pub mod compiler;
pub mod error;
pub mod layer;
pub mod physics;
pub mod preamble;
pub mod truncate;

pub use compiler::{compile_layers, render_layers, LayerOptions, ProfileColumns};
pub use error::{LayerError, Result};
pub use layer::{AtmosphericLayer, LayerKind};
pub use physics::{air_density, mmr_to_density, mmr_to_vmr, Species};
pub use preamble::{ModelDocument, Preamble};
pub use truncate::{limit_height, TruncatedProfile};
