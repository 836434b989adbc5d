//! Common fixtures for profiler tests.

use merra_common::{SiteCoord, SiteTable};

/// Observation sites on the Khomas highlands.
pub mod sites {
    /// (lon, lat, altitude m)
    pub const GAMSBERG: (f64, f64, f64) = (16.22309385609976, -23.34357719776235, 2347.0);

    pub const HESS_LOW: (f64, f64, f64) = (16.500478178158065, -23.271726947477347, 1800.0);

    pub const HESS_HIGH: (f64, f64, f64) = (16.530082, -23.241986, 1900.0);
}

/// MERRA-2 `Np` pressure levels (mbar), surface first.
pub const MERRA2_PRESSURE_LEVELS: [f64; 42] = [
    1000.0, 975.0, 950.0, 925.0, 900.0, 875.0, 850.0, 825.0, 800.0, 775.0, 750.0, 725.0, 700.0,
    650.0, 600.0, 550.0, 500.0, 450.0, 400.0, 350.0, 300.0, 250.0, 200.0, 150.0, 100.0, 70.0,
    50.0, 40.0, 30.0, 20.0, 10.0, 7.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.7, 0.5, 0.4, 0.3, 0.1,
];

/// Three-hourly analysis times (minute of day).
pub const MERRA2_MINUTES: [f64; 8] = [0.0, 180.0, 360.0, 540.0, 720.0, 900.0, 1080.0, 1260.0];

fn coord((lon, lat, altitude): (f64, f64, f64)) -> SiteCoord {
    SiteCoord::new(lon, lat, altitude)
}

/// The three Khomas highland sites.
pub fn khomas_sites() -> SiteTable {
    [
        ("gamsberg".to_string(), coord(sites::GAMSBERG)),
        ("hesslo".to_string(), coord(sites::HESS_LOW)),
        ("hesshi".to_string(), coord(sites::HESS_HIGH)),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_khomas_sites() {
        let table = khomas_sites();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("hesshi").unwrap().altitude, 1900.0);
    }

    #[test]
    fn test_pressure_levels_descend() {
        assert!(MERRA2_PRESSURE_LEVELS.windows(2).all(|w| w[0] > w[1]));
    }
}
