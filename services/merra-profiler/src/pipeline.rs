//! Extract and compile stages of a batch run.
//!
//! Each stage walks its units (files, then site/day/hour documents) in order
//! and checks the [`StopSignal`] between units, so a stop leaves every
//! completed unit intact.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use layer_compiler::{
    compile_layers, limit_height, LayerOptions, ModelDocument, Preamble, ProfileColumns,
};
use merra_common::{Quantity, SiteProfile, SiteTable};
use merra_parser::{decode_file, ParseOptions};
use site_interpolator::{interpolate_sites, InterpolationConfig};
use tracing::{error, info, instrument, warn};

use crate::archive::ProfileArchive;
use crate::config::ProfilerConfig;
use crate::discover::DumpFile;
use crate::runner::ModelRunner;
use crate::shutdown::StopSignal;

// ============================================================================
// Extraction
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub failed: usize,
    pub profiles: usize,
    pub stopped: bool,
}

/// Decode one dump and interpolate it to every site.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_file(
    path: &Path,
    sites: &SiteTable,
    parse: &ParseOptions,
    interpolation: InterpolationConfig,
) -> Result<Vec<SiteProfile>> {
    let dataset = decode_file(path, parse)?;
    let profiles = interpolate_sites(&dataset, sites, interpolation)
        .with_context(|| format!("Interpolation failed for {}", path.display()))?;
    Ok(profiles)
}

/// Extract every file into `archive`.
///
/// A file that fails to decode or interpolate, or whose axes differ from the
/// archive's, is logged and counted, and the run moves on to the next file.
pub fn extract(
    config: &ProfilerConfig,
    files: &[DumpFile],
    archive: &mut ProfileArchive,
    stop: &mut StopSignal,
) -> Result<ExtractSummary> {
    let parse = config.parse_options();
    let mut summary = ExtractSummary::default();

    for file in files {
        if stop.is_requested() {
            summary.stopped = true;
            break;
        }

        let extracted = extract_file(&file.path, &config.sites, &parse, config.interpolation)
            .and_then(|profiles| {
                for profile in &profiles {
                    archive.check_axes(file.date, profile)?;
                }
                for profile in &profiles {
                    archive.push(file.date, profile)?;
                }
                Ok(profiles.len())
            });

        match extracted {
            Ok(count) => {
                summary.profiles += count;
                info!(file = %file.path.display(), date = %file.date, sites = count, "Extracted site profiles");
            }
            Err(e) => {
                error!(file = %file.path.display(), error = %format!("{:#}", e), "Failed to extract file");
                summary.failed += 1;
            }
        }
        summary.files += 1;
    }

    info!(
        files = summary.files,
        failed = summary.failed,
        profiles = summary.profiles,
        stopped = summary.stopped,
        "Extraction finished"
    );
    Ok(summary)
}

// ============================================================================
// Document compilation
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSummary {
    pub documents: usize,
    pub skipped: usize,
    pub model_runs: usize,
    pub model_failures: usize,
    pub stopped: bool,
}

/// File name of the document for a site, day and decimal hour.
pub fn document_name(site: &str, date: NaiveDate, hour: f64) -> String {
    format!(
        "{}_{:04}y{:02}m{:02}d{:02}h.amc",
        site,
        date.year(),
        date.month(),
        date.day(),
        hour.floor() as u32
    )
}

/// Build the document for one hour of a profile.
///
/// The profile is clipped at the site altitude before compilation.
pub fn compile_profile(
    profile: &SiteProfile,
    hour_index: usize,
    options: &LayerOptions,
    preamble: &Preamble,
) -> layer_compiler::Result<ModelDocument> {
    let column = |q: Quantity| profile.column(q, hour_index).to_vec();
    let height = column(Quantity::H);
    let temperature = column(Quantity::T);
    let ozone = column(Quantity::O3);
    let rh = column(Quantity::RH);
    let liquid = column(Quantity::QL);
    let ice = column(Quantity::QI);

    let clipped = limit_height(
        &height,
        profile.coord.altitude,
        &[&profile.pres, &temperature, &ozone, &rh, &liquid, &ice],
    )?;
    let c = &clipped.columns;
    let columns = ProfileColumns::new(&c[0], &c[1], &clipped.height)
        .with_ozone(&c[2])
        .with_relative_humidity(&c[3])
        .with_liquid(&c[4])
        .with_ice(&c[5]);

    let layers = compile_layers(&columns, options)?;
    Ok(ModelDocument::new(preamble.clone(), layers))
}

/// Write one document per archived site, day and hour into `out_dir`,
/// running the model on each if a runner is given.
pub async fn compile(
    config: &ProfilerConfig,
    archive: &ProfileArchive,
    out_dir: &Path,
    runner: Option<&ModelRunner>,
    stop: &mut StopSignal,
) -> Result<CompileSummary> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create document directory {:?}", out_dir))?;
    let mut summary = CompileSummary::default();

    'entries: for entry in &archive.entries {
        let profile = archive.profile(entry)?;
        for (t, &hour) in profile.hour.iter().enumerate() {
            if stop.is_requested() {
                summary.stopped = true;
                break 'entries;
            }

            let document = match compile_profile(&profile, t, &config.layers, &config.preamble) {
                Ok(document) => document,
                Err(e) => {
                    warn!(site = %entry.site, date = %entry.date, hour, error = %e, "Skipping profile");
                    summary.skipped += 1;
                    continue;
                }
            };

            let path: PathBuf = out_dir.join(document_name(&entry.site, entry.date, hour));
            fs::write(&path, document.to_string())
                .with_context(|| format!("Failed to write document {:?}", path))?;
            summary.documents += 1;

            if let Some(runner) = runner {
                let status = runner.run(&path).await?;
                summary.model_runs += 1;
                if !status.success() {
                    summary.model_failures += 1;
                }
            }
        }
    }

    info!(
        documents = summary.documents,
        skipped = summary.skipped,
        model_runs = summary.model_runs,
        model_failures = summary.model_failures,
        stopped = summary.stopped,
        "Document compilation finished"
    );
    Ok(summary)
}
