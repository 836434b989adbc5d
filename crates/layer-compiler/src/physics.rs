//! Unit conversions for atmospheric constituents.

/// Molar mass of dry air (g/mol).
pub const DRY_AIR_MOLAR_MASS: f64 = 28.9644;

/// Specific gas constant of dry air (J/(kg*K)).
pub const DRY_AIR_GAS_CONSTANT: f64 = 287.058;

/// Pascals per millibar.
const PA_PER_MBAR: f64 = 100.0;

/// A trace gas whose mixing ratio can be converted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Species {
    Ozone,
    /// Any other gas, by molar mass (g/mol)
    MolarMass(f64),
}

impl Species {
    /// Molar mass in g/mol.
    pub fn molar_mass(self) -> f64 {
        match self {
            Species::Ozone => 47.9982,
            Species::MolarMass(m) => m,
        }
    }
}

/// Convert a mass mixing ratio (kg/kg) to a volume mixing ratio.
pub fn mmr_to_vmr(mmr: f64, species: Species) -> f64 {
    mmr * DRY_AIR_MOLAR_MASS / species.molar_mass()
}

/// Dry-air density (kg/m^3) at pressure `p` (mbar) and temperature `t` (K).
pub fn air_density(p: f64, t: f64) -> f64 {
    PA_PER_MBAR * p / (DRY_AIR_GAS_CONSTANT * t)
}

/// Mass density (kg/m^3) of a constituent with mixing ratio `mmr` in air at
/// pressure `p` (mbar) and temperature `t` (K).
pub fn mmr_to_density(mmr: f64, p: f64, t: f64) -> f64 {
    mmr * air_density(p, t)
}
