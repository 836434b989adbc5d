//! The six physical quantities carried by a grid dump.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A physical quantity stored in a [`FieldDataset`](crate::FieldDataset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quantity {
    /// Geopotential height (m)
    H,
    /// Ozone mass mixing ratio (kg/kg)
    O3,
    /// Ice water mixing ratio (kg/kg)
    QI,
    /// Liquid water mixing ratio (kg/kg)
    QL,
    /// Relative humidity (fraction, 0-1)
    RH,
    /// Temperature (K)
    T,
}

impl Quantity {
    /// All quantities, in storage order.
    pub const ALL: [Quantity; 6] = [
        Quantity::H,
        Quantity::O3,
        Quantity::QI,
        Quantity::QL,
        Quantity::RH,
        Quantity::T,
    ];

    /// Variable name as written in the grid dumps.
    pub fn name(self) -> &'static str {
        match self {
            Quantity::H => "H",
            Quantity::O3 => "O3",
            Quantity::QI => "QI",
            Quantity::QL => "QL",
            Quantity::RH => "RH",
            Quantity::T => "T",
        }
    }

    /// Position of this quantity in [`Quantity::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn units(self) -> &'static str {
        match self {
            Quantity::H => "m",
            Quantity::O3 | Quantity::QI | Quantity::QL => "kg/kg",
            Quantity::RH => "1",
            Quantity::T => "K",
        }
    }

    /// Look up a quantity by its exact variable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.name() == name)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown quantity name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown quantity '{0}' (expected one of H, O3, QI, QL, RH, T)")]
pub struct UnknownQuantity(pub String);

impl FromStr for Quantity {
    type Err = UnknownQuantity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| UnknownQuantity(s.to_string()))
    }
}
