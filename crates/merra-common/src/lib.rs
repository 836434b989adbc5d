//! Common types shared across the MERRA-2 profiler workspace.
//!
//! The reanalysis dumps describe six physical quantities on a 4-D grid
//! `[hour, pressure, latitude, longitude]`. This crate holds that model
//! ([`FieldDataset`]), the site table used to sample it ([`SiteTable`]) and
//! the per-site vertical profiles produced by interpolation ([`SiteProfile`]).

pub mod grid;
pub mod missing;
pub mod quantity;
pub mod site;

pub use grid::{FieldDataset, GridAxes, ShapeError};
pub use missing::{is_missing_sentinel, sentinel_to_nan, snap_near_zero, MISSING_THRESHOLD};
pub use quantity::{Quantity, UnknownQuantity};
pub use site::{SiteCoord, SiteProfile, SiteTable};
