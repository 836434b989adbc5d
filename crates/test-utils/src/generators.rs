//! Synthetic grid dumps in both text encodings.
//!
//! A [`SyntheticGrid`] renders the same logical 4-D field as legacy or tagged
//! text, so decoders can be checked against each other and against the
//! values that were written.

use merra_common::Quantity;

/// Axes of a synthetic dump, as written into the text.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticGrid {
    /// Minute-of-day values
    pub minutes: Vec<f64>,
    /// Pressure levels (mbar)
    pub pres: Vec<f64>,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Date stamp written into the dataset header
    pub date: String,
}

impl SyntheticGrid {
    pub fn new(minutes: Vec<f64>, pres: Vec<f64>, lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self {
            minutes,
            pres,
            lat,
            lon,
            date: "20230101".to_string(),
        }
    }

    /// 2 hours x 3 levels x 2 latitudes x 3 longitudes around the Khomas
    /// highlands.
    pub fn small() -> Self {
        Self::new(
            vec![0.0, 180.0],
            vec![1000.0, 500.0, 0.1],
            vec![-24.0, -23.5],
            vec![15.625, 16.25, 16.875],
        )
    }

    /// One hour, one level, 2x2 grid.
    pub fn single_cell() -> Self {
        Self::new(vec![0.0], vec![850.0], vec![-24.0, -23.5], vec![16.25, 16.875])
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Shape `(Nhour, Npres, Nlat, Nlon)` of the decoded dataset.
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.minutes.len(), self.pres.len(), self.lat.len(), self.lon.len())
    }

    fn header(&self) -> String {
        format!("Dataset: MERRA2_400.inst3_3d_asm_Np.{}.nc4\n", self.date)
    }

    fn row<F>(&self, values: &F, q: Quantity, t: usize, p: usize, k: usize) -> String
    where
        F: Fn(Quantity, [usize; 4]) -> f64,
    {
        join((0..self.lon.len()).map(|l| values(q, [t, p, k, l])))
    }

    /// Render the field in the legacy bracket-index encoding.
    pub fn legacy_dump<F>(&self, values: F) -> String
    where
        F: Fn(Quantity, [usize; 4]) -> f64,
    {
        let mut out = self.header();
        for q in Quantity::ALL {
            for t in 0..self.minutes.len() {
                for p in 0..self.pres.len() {
                    for k in 0..self.lat.len() {
                        out.push_str(&format!(
                            "{}[{}][{}][{}], {}\n",
                            q.name(),
                            t,
                            p,
                            k,
                            self.row(&values, q, t, p, k)
                        ));
                    }
                }
            }
        }
        out.push_str(&axis_line("lat", &self.lat));
        out.push_str(&axis_line("lev", &self.pres));
        out.push_str(&axis_line("lon", &self.lon));
        out.push_str(&axis_line("time", &self.minutes));
        out
    }

    /// Render the field in the tagged encoding.
    pub fn tagged_dump<F>(&self, values: F) -> String
    where
        F: Fn(Quantity, [usize; 4]) -> f64,
    {
        let mut out = self.header();
        out.push_str(&axis_line("lon", &self.lon));
        out.push_str(&axis_line("lat", &self.lat));
        out.push_str(&axis_line("lev", &self.pres));
        out.push_str(&axis_line("time", &self.minutes));
        out.push('\n');
        for q in Quantity::ALL {
            out.push_str(&format!("{}.lon, {}\n", q.name(), join(self.lon.iter().copied())));
            for t in 0..self.minutes.len() {
                for p in 0..self.pres.len() {
                    for k in 0..self.lat.len() {
                        out.push_str(&format!(
                            "{}[time={}][lev={}][lat={}], {}\n",
                            q.name(),
                            self.minutes[t],
                            self.pres[p],
                            self.lat[k],
                            self.row(&values, q, t, p, k)
                        ));
                    }
                }
            }
        }
        out
    }
}

fn join(values: impl Iterator<Item = f64>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
}

fn axis_line(label: &str, values: &[f64]) -> String {
    format!("{}, {}\n", label, join(values.iter().copied()))
}

/// A value that encodes its own position.
///
/// `(quantity + 1) * 10000 + t * 1000 + p * 100 + k * 10 + l`, so a cell's
/// value tells where it was written.
pub fn positional_value(q: Quantity, [t, p, k, l]: [usize; 4]) -> f64 {
    ((q.index() + 1) * 10_000 + t * 1000 + p * 100 + k * 10 + l) as f64
}

/// The same value at every grid point of a quantity.
pub fn constant_value(value: f64) -> impl Fn(Quantity, [usize; 4]) -> f64 {
    move |_, _| value
}

/// Height (m) and temperature (K) of a standard-atmosphere column at the
/// given pressures (mbar).
///
/// Troposphere lapse rate of 6.5 K/km, isothermal at 216.65 K above it.
pub fn standard_column(pres: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let height: Vec<f64> = pres
        .iter()
        .map(|p| 44_330.8 * (1.0 - (p / 1013.25).powf(0.190263)))
        .collect();
    let temperature = height
        .iter()
        .map(|h| (288.15 - 0.0065 * h).max(216.65))
        .collect();
    (height, temperature)
}
