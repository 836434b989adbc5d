//! JSON archive of extracted site profiles.
//!
//! The hour and pressure axes are stored once; each entry holds one site's
//! `[hour][pres]` table per quantity for one day. Missing values are written
//! as `null`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use merra_common::{Quantity, SiteProfile, SiteTable};
use serde::{Deserialize, Serialize};
use tracing::info;

/// `[hour][pres]` values with NaN as `None`.
pub type Table = Vec<Vec<Option<f64>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub site: String,
    pub date: NaiveDate,
    /// Keyed by quantity name
    pub values: BTreeMap<String, Table>,
}

impl ArchiveEntry {
    /// The table for one quantity, if present.
    pub fn table(&self, quantity: Quantity) -> Option<&Table> {
        self.values.get(quantity.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileArchive {
    /// Decimal hours of day
    pub hour: Vec<f64>,
    /// Pressure levels (mbar)
    pub pres: Vec<f64>,
    pub sites: SiteTable,
    pub entries: Vec<ArchiveEntry>,
}

fn to_table(profile: &SiteProfile, quantity: Quantity) -> Table {
    profile
        .get(quantity)
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
        .collect()
}

impl ProfileArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check that a profile shares the archive's hour and pressure axes.
    ///
    /// Any profile fits an archive that has no axes yet.
    pub fn check_axes(&self, date: NaiveDate, profile: &SiteProfile) -> Result<()> {
        if self.entries.is_empty() && self.pres.is_empty() {
            return Ok(());
        }
        anyhow::ensure!(
            profile.hour == self.hour,
            "Profile for {} on {} has hours {:?} but the archive has {:?}",
            profile.site,
            date,
            profile.hour,
            self.hour
        );
        anyhow::ensure!(
            profile.pres == self.pres,
            "Profile for {} on {} has pressure levels {:?} but the archive has {:?}",
            profile.site,
            date,
            profile.pres,
            self.pres
        );
        Ok(())
    }

    /// Append one site's profile for a day.
    ///
    /// The first profile fixes the hour and pressure axes; later profiles
    /// must share them.
    pub fn push(&mut self, date: NaiveDate, profile: &SiteProfile) -> Result<()> {
        self.check_axes(date, profile)?;
        if self.entries.is_empty() && self.pres.is_empty() {
            self.hour = profile.hour.clone();
            self.pres = profile.pres.clone();
        }

        self.sites.insert(profile.site.clone(), profile.coord);
        let values = Quantity::ALL
            .iter()
            .map(|&q| (q.name().to_string(), to_table(profile, q)))
            .collect();
        self.entries.push(ArchiveEntry {
            site: profile.site.clone(),
            date,
            values,
        });
        Ok(())
    }

    /// Rebuild the profile stored in an entry.
    pub fn profile(&self, entry: &ArchiveEntry) -> Result<SiteProfile> {
        let coord = *self
            .sites
            .get(&entry.site)
            .with_context(|| format!("Archive has no coordinate for site {}", entry.site))?;

        let mut profile = SiteProfile::new(&entry.site, coord, self.hour.clone(), self.pres.clone());
        let (nhour, npres) = profile.shape();
        for quantity in Quantity::ALL {
            let Some(table) = entry.table(quantity) else {
                continue;
            };
            anyhow::ensure!(
                table.len() == nhour && table.iter().all(|row| row.len() == npres),
                "{} table for {} on {} does not match the archive axes",
                quantity,
                entry.site,
                entry.date
            );
            let column = profile.get_mut(quantity);
            for (t, row) in table.iter().enumerate() {
                for (p, value) in row.iter().enumerate() {
                    column[[t, p]] = value.unwrap_or(f64::NAN);
                }
            }
        }
        Ok(profile)
    }

    /// Entries for one site, in archive order.
    pub fn entries_for<'a>(&'a self, site: &'a str) -> impl Iterator<Item = &'a ArchiveEntry> + 'a {
        self.entries.iter().filter(move |e| e.site == site)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create archive directory {:?}", parent))?;
        }
        let json = serde_json::to_string(self).context("Failed to serialize archive")?;
        fs::write(path, json).with_context(|| format!("Failed to write archive {:?}", path))?;
        info!(path = %path.display(), entries = self.entries.len(), "Saved profile archive");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read archive {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse archive {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use merra_common::SiteCoord;
    use test_utils::temp_test_dir;

    fn sample_profile(site: &str) -> SiteProfile {
        let mut profile = SiteProfile::new(
            site,
            SiteCoord::new(16.5, -23.25, 1800.0),
            vec![0.0, 3.0],
            vec![1000.0, 500.0],
        );
        for q in Quantity::ALL {
            profile.get_mut(q).fill(q.index() as f64);
        }
        profile.get_mut(Quantity::O3)[[1, 1]] = f64::NAN;
        profile
    }

    #[test]
    fn test_push_and_rebuild() {
        let date = NaiveDate::from_ymd_opt(2012, 3, 4).unwrap();
        let mut archive = ProfileArchive::new();
        archive.push(date, &sample_profile("hesslo")).unwrap();

        let entry = &archive.entries[0];
        assert_eq!(entry.table(Quantity::O3).unwrap()[1][1], None);
        assert_eq!(entry.table(Quantity::T).unwrap()[0][0], Some(5.0));

        let rebuilt = archive.profile(entry).unwrap();
        assert_eq!(rebuilt.shape(), (2, 2));
        assert!(rebuilt.get(Quantity::O3)[[1, 1]].is_nan());
        assert_eq!(rebuilt.get(Quantity::RH)[[0, 1]], 4.0);
    }

    #[test]
    fn test_rejects_mismatched_axes() {
        let date = NaiveDate::from_ymd_opt(2012, 3, 4).unwrap();
        let mut archive = ProfileArchive::new();
        archive.push(date, &sample_profile("hesslo")).unwrap();

        let mut other = sample_profile("hesshi");
        other.pres = vec![1000.0, 400.0];
        let err = archive.push(date, &other).unwrap_err().to_string();
        assert!(err.contains("[1000.0, 400.0]"), "{}", err);
        assert!(err.contains("[1000.0, 500.0]"), "{}", err);
        assert_eq!(archive.entries.len(), 1);

        let mut later = sample_profile("hesshi");
        later.hour = vec![0.0, 6.0];
        let err = archive.check_axes(date, &later).unwrap_err().to_string();
        assert!(err.contains("hours [0.0, 6.0]"), "{}", err);
    }

    #[test]
    fn test_save_and_load() {
        let dir = temp_test_dir();
        let path = dir.path().join("sites/daily.json");
        let date = NaiveDate::from_ymd_opt(2012, 3, 4).unwrap();

        let mut archive = ProfileArchive::new();
        archive.push(date, &sample_profile("hesslo")).unwrap();
        archive.save(&path).unwrap();

        let loaded = ProfileArchive::load(&path).unwrap();
        assert_eq!(loaded, archive);
        assert_eq!(loaded.entries_for("hesslo").count(), 1);
        assert_eq!(loaded.entries_for("gamsberg").count(), 0);
    }
}
