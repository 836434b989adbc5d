//! Profiler configuration.
//!
//! Loaded from a YAML file with `${VAR}` and `${VAR:-default}` environment
//! substitution, then validated before any work starts.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use layer_compiler::{LayerOptions, Preamble};
use merra_common::SiteTable;
use merra_parser::ParseOptions;
use regex::Regex;
use serde::{Deserialize, Serialize};
use site_interpolator::InterpolationConfig;

/// Default pattern for MERRA-2 3-hourly pressure-level dumps.
pub const DEFAULT_FILE_PATTERN: &str = r"^MERRA2_\d+\.inst3_3d_asm_Np\.\d{8}";

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub sites: SiteTable,
    /// Decoder options (`unpopulated: nan | zero | reject`)
    #[serde(default)]
    pub parse: ParseOptions,
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    #[serde(default)]
    pub layers: LayerOptions,
    #[serde(default)]
    pub preamble: Preamble,
    /// Radiative-transfer executable run on every document, if set
    #[serde(default)]
    pub model: Option<ModelConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory searched recursively for dumps
    pub dir: PathBuf,
    /// Regex a file name must match
    #[serde(default = "default_file_pattern")]
    pub pattern: String,
    /// First year to process (inclusive)
    pub start_year: Option<i32>,
    /// Last year to process (inclusive)
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// JSON archive of extracted profiles
    pub archive: PathBuf,
    /// Directory for `.amc` documents and model output
    pub model_dir: PathBuf,
    /// JSON file of monthly statistics
    pub statistics: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Executable name or path
    pub executable: PathBuf,
    /// Arguments placed before the document path
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_file_pattern() -> String {
    DEFAULT_FILE_PATTERN.to_string()
}

impl ProfilerConfig {
    /// Decoder options from the `parse` section.
    pub fn parse_options(&self) -> ParseOptions {
        self.parse
    }

    /// Compiled file-name filter.
    pub fn file_pattern(&self) -> Result<Regex> {
        Regex::new(&self.input.pattern)
            .with_context(|| format!("Invalid input file pattern '{}'", self.input.pattern))
    }

    /// Whether a year lies inside the configured range.
    pub fn includes_year(&self, year: i32) -> bool {
        self.input.start_year.map_or(true, |start| year >= start)
            && self.input.end_year.map_or(true, |end| year <= end)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProfilerConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read profiler config from {:?}", path.as_ref()))?;

    parse_config(&content)
        .with_context(|| format!("Invalid profiler config {:?}", path.as_ref()))
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<ProfilerConfig> {
    let expanded = expand_env_vars(content)?;

    let config: ProfilerConfig =
        serde_yaml::from_str(&expanded).context("Failed to parse profiler config YAML")?;

    validate_config(&config)?;

    Ok(config)
}

/// Expand `${VAR}` and `${VAR:-default}` references.
///
/// Comment lines are copied unchanged.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut chars = line.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_expr = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => var_expr.push(c),
                        None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                    }
                }

                result.push_str(&resolve_var_expr(&var_expr)?);
            } else {
                result.push(ch);
            }
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_config(config: &ProfilerConfig) -> Result<()> {
    anyhow::ensure!(!config.sites.is_empty(), "At least one site must be configured");

    for (name, coord) in config.sites.iter() {
        anyhow::ensure!(!name.is_empty(), "Site names cannot be empty");
        anyhow::ensure!(
            (-90.0..=90.0).contains(&coord.lat),
            "Site {} latitude {} outside [-90, 90]",
            name,
            coord.lat
        );
        anyhow::ensure!(
            (-180.0..=360.0).contains(&coord.lon),
            "Site {} longitude {} outside [-180, 360]",
            name,
            coord.lon
        );
        anyhow::ensure!(
            coord.altitude.is_finite(),
            "Site {} altitude must be finite",
            name
        );
    }

    if let (Some(start), Some(end)) = (config.input.start_year, config.input.end_year) {
        anyhow::ensure!(
            start <= end,
            "start_year {} is after end_year {}",
            start,
            end
        );
    }

    config.file_pattern()?;

    let preamble = &config.preamble;
    anyhow::ensure!(
        preamble.f_min_ghz < preamble.f_max_ghz,
        "preamble.f_min_ghz must be less than preamble.f_max_ghz"
    );
    anyhow::ensure!(preamble.df_mhz > 0.0, "preamble.df_mhz must be positive");
    anyhow::ensure!(preamble.tolerance > 0.0, "preamble.tolerance must be positive");

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    anyhow::ensure!(
        valid_levels.contains(&config.logging.level.as_str()),
        "Invalid log level: {}. Must be one of: {:?}",
        config.logging.level,
        valid_levels
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use merra_parser::UnpopulatedCells;
    use site_interpolator::Extrapolation;

    const MINIMAL: &str = r#"
input:
  dir: /data/merra2
output:
  archive: /data/sites/daily.json
  model_dir: /data/am
  statistics: /data/sites/monthly.json
sites:
  gamsberg: { lon: 16.22309385609976, lat: -23.34357719776235, altitude: 2347 }
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse_config(MINIMAL).unwrap();
        assert_eq!(config.input.pattern, DEFAULT_FILE_PATTERN);
        assert_eq!(config.parse_options().unpopulated, UnpopulatedCells::Nan);
        assert!(config.layers.dry_air);
        assert_eq!(config.preamble.f_max_ghz, 400.0);
        assert!(config.model.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.includes_year(1980));
    }

    #[test]
    fn test_full_config() {
        let yaml = format!(
            "{MINIMAL}{}",
            r#"
parse:
  unpopulated: reject
interpolation:
  method: nearest
  extrapolation: reject
layers:
  dry_air: false
  lineshape: Voigt-Kielkopf
preamble:
  f_max_ghz: 100
model:
  executable: am
logging:
  level: debug
"#
        );
        let config = parse_config(&yaml).unwrap();
        assert_eq!(config.parse_options().unpopulated, UnpopulatedCells::Reject);
        assert_eq!(config.interpolation.extrapolation, Extrapolation::Reject);
        assert_eq!(config.layers.lineshape.as_deref(), Some("Voigt-Kielkopf"));
        assert_eq!(config.model.unwrap().executable, PathBuf::from("am"));
    }

    #[test]
    fn test_year_range() {
        let yaml = MINIMAL.replace("dir: /data/merra2", "dir: /data/merra2\n  start_year: 2009\n  end_year: 2020");
        let config = parse_config(&yaml).unwrap();
        assert!(!config.includes_year(2008));
        assert!(config.includes_year(2009));
        assert!(config.includes_year(2020));
        assert!(!config.includes_year(2021));

        let bad = MINIMAL.replace("dir: /data/merra2", "dir: /data/merra2\n  start_year: 2021\n  end_year: 2020");
        assert!(parse_config(&bad).is_err());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(parse_config(&MINIMAL.replace("lat: -23.34357719776235", "lat: -123.0")).is_err());
        let bad_policy = format!("{MINIMAL}parse:\n  unpopulated: maybe\n");
        assert!(parse_config(&bad_policy).is_err());
        let bad_level = format!("{MINIMAL}logging:\n  level: loud\n");
        assert!(parse_config(&bad_level).is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("MERRA_PROFILER_TEST_DIR", "/scratch/merra");
        let result = expand_env_vars("dir: ${MERRA_PROFILER_TEST_DIR}/raw").unwrap();
        assert_eq!(result, "dir: /scratch/merra/raw");

        std::env::remove_var("MERRA_PROFILER_UNSET");
        let result = expand_env_vars("${MERRA_PROFILER_UNSET:-/tmp/am}").unwrap();
        assert_eq!(result, "/tmp/am");

        assert!(expand_env_vars("${MERRA_PROFILER_UNSET}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_comments_are_not_expanded() {
        std::env::remove_var("MERRA_PROFILER_UNSET");
        let text = "# uses ${MERRA_PROFILER_UNSET}\n  # ${ also fine\ndir: ${MERRA_PROFILER_UNSET:-/tmp}\n";
        let result = expand_env_vars(text).unwrap();
        assert_eq!(result, "# uses ${MERRA_PROFILER_UNSET}\n  # ${ also fine\ndir: /tmp\n");
    }

    #[test]
    fn test_shipped_config_loads() {
        let config = parse_config(include_str!("../config/profiler.yaml")).unwrap();
        assert_eq!(config.sites.len(), 3);
        assert!(config.includes_year(2015));
        config.file_pattern().unwrap();
    }
}
