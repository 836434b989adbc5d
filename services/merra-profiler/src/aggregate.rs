//! Month-wise statistics over archived profiles.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use merra_common::Quantity;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::archive::{ProfileArchive, Table};

/// Reduction applied to the samples of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Minimum,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::Mean, Statistic::Median, Statistic::Minimum];

    /// Reduce finite samples. `None` when there are none.
    pub fn reduce(self, samples: &mut [f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        let value = match self {
            Statistic::Mean => samples.iter().sum::<f64>() / samples.len() as f64,
            Statistic::Minimum => samples.iter().copied().fold(f64::INFINITY, f64::min),
            Statistic::Median => {
                samples.sort_by(f64::total_cmp);
                let mid = samples.len() / 2;
                if samples.len() % 2 == 0 {
                    (samples[mid - 1] + samples[mid]) / 2.0
                } else {
                    samples[mid]
                }
            }
        };
        Some(value)
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statistic::Mean => write!(f, "mean"),
            Statistic::Median => write!(f, "median"),
            Statistic::Minimum => write!(f, "minimum"),
        }
    }
}

/// Twelve `[hour][pres]` tables, January first.
pub type MonthlyTables = Vec<Table>;

/// Reduce daily tables to one table per calendar month.
///
/// Missing samples are ignored; a cell with no samples in a month is `None`.
pub fn by_month<'a, I>(days: I, statistic: Statistic, nhour: usize, npres: usize) -> MonthlyTables
where
    I: IntoIterator<Item = (u32, &'a Table)>,
{
    let mut samples: Vec<Vec<Vec<Vec<f64>>>> = vec![vec![vec![Vec::new(); npres]; nhour]; 12];
    for (month, table) in days {
        let Some(slot) = month.checked_sub(1).and_then(|m| samples.get_mut(m as usize)) else {
            continue;
        };
        for (t, row) in table.iter().enumerate().take(nhour) {
            for (p, value) in row.iter().enumerate().take(npres) {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    slot[t][p].push(v);
                }
            }
        }
    }

    samples
        .into_iter()
        .map(|month| {
            month
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|mut cell| statistic.reduce(&mut cell))
                        .collect()
                })
                .collect()
        })
        .collect()
}

/// Monthly statistics for every site and quantity in an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    pub hour: Vec<f64>,
    pub pres: Vec<f64>,
    /// site -> quantity -> statistic -> 12 monthly tables
    pub sites: BTreeMap<String, BTreeMap<String, BTreeMap<Statistic, MonthlyTables>>>,
}

impl MonthlyStatistics {
    /// Monthly tables for one site, quantity and statistic.
    pub fn get(&self, site: &str, quantity: Quantity, statistic: Statistic) -> Option<&MonthlyTables> {
        self.sites.get(site)?.get(quantity.name())?.get(&statistic)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create statistics directory {:?}", parent))?;
        }
        let json = serde_json::to_string(self).context("Failed to serialize statistics")?;
        fs::write(path, json).with_context(|| format!("Failed to write statistics {:?}", path))?;
        info!(path = %path.display(), sites = self.sites.len(), "Saved monthly statistics");
        Ok(())
    }
}

/// Compute mean, median and minimum per month for every archived site.
pub fn aggregate(archive: &ProfileArchive) -> MonthlyStatistics {
    let (nhour, npres) = (archive.hour.len(), archive.pres.len());
    let mut sites = BTreeMap::new();

    for site in archive.sites.names() {
        let mut quantities = BTreeMap::new();
        for quantity in Quantity::ALL {
            let days: Vec<(u32, &Table)> = archive
                .entries_for(site)
                .filter_map(|e| e.table(quantity).map(|t| (e.date.month(), t)))
                .collect();

            let stats = Statistic::ALL
                .iter()
                .map(|&s| (s, by_month(days.iter().copied(), s, nhour, npres)))
                .collect();
            quantities.insert(quantity.name().to_string(), stats);
        }
        sites.insert(site.to_string(), quantities);
    }

    MonthlyStatistics {
        hour: archive.hour.clone(),
        pres: archive.pres.clone(),
        sites,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce() {
        assert_eq!(Statistic::Mean.reduce(&mut [1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(Statistic::Median.reduce(&mut [6.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(Statistic::Median.reduce(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(Statistic::Minimum.reduce(&mut [4.0, -1.0, 2.0]), Some(-1.0));
        assert_eq!(Statistic::Mean.reduce(&mut []), None);
    }

    #[test]
    fn test_by_month() {
        let jan_a: Table = vec![vec![Some(1.0), Some(10.0)]];
        let jan_b: Table = vec![vec![Some(3.0), None]];
        let mar: Table = vec![vec![Some(7.0), Some(8.0)]];

        let days = vec![(1, &jan_a), (1, &jan_b), (3, &mar)];
        let tables = by_month(days, Statistic::Mean, 1, 2);

        assert_eq!(tables.len(), 12);
        assert_eq!(tables[0], vec![vec![Some(2.0), Some(10.0)]]);
        assert_eq!(tables[1], vec![vec![None, None]]);
        assert_eq!(tables[2], vec![vec![Some(7.0), Some(8.0)]]);
    }

    #[test]
    fn test_statistic_json_key() {
        let mut map = BTreeMap::new();
        map.insert(Statistic::Median, 1);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"median":1}"#);
    }
}
