//! Locating grid dumps on disk.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::ProfilerConfig;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)(\d{8})(?:\D|$)").unwrap());

/// A dump file and the day it covers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DumpFile {
    pub date: NaiveDate,
    pub path: PathBuf,
}

/// Extract the `YYYYMMDD` date carried in a file name.
pub fn date_from_name(name: &str) -> Option<NaiveDate> {
    DATE_RE
        .captures_iter(name)
        .filter_map(|caps| NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok())
        .next()
}

/// Find dumps under `dir` whose names match `pattern` and carry a date,
/// sorted by date then path.
pub fn find_dumps(dir: &Path, pattern: &Regex) -> Result<Vec<DumpFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !pattern.is_match(&name) {
            continue;
        }
        match date_from_name(&name) {
            Some(date) => files.push(DumpFile {
                date,
                path: entry.path().to_path_buf(),
            }),
            None => warn!(file = %entry.path().display(), "Matching file has no YYYYMMDD date, skipping"),
        }
    }

    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Scanned for dumps");
    Ok(files)
}

/// Find the dumps selected by a configuration.
pub fn discover(config: &ProfilerConfig) -> Result<Vec<DumpFile>> {
    let pattern = config.file_pattern()?;
    let files: Vec<DumpFile> = find_dumps(&config.input.dir, &pattern)?
        .into_iter()
        .filter(|f| config.includes_year(f.date.year()))
        .collect();

    info!(
        dir = %config.input.dir.display(),
        files = files.len(),
        first = ?files.first().map(|f| f.date),
        last = ?files.last().map(|f| f.date),
        "Discovered grid dumps"
    );
    Ok(files)
}
