//! MERRA-2 site profiler.
//!
//! Batch driver around the parser, site interpolator and layer compiler:
//! discovers grid dumps, extracts per-site profiles into a JSON archive,
//! reduces them to monthly statistics and writes one layered-atmosphere
//! document per site, day and hour, optionally running the radiative-transfer
//! model on each.

pub mod aggregate;
pub mod archive;
pub mod config;
pub mod discover;
pub mod pipeline;
pub mod runner;
pub mod shutdown;
