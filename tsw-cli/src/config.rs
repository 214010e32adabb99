//! Configuration handling for the TSW CLI
//!
//! Supports loading configuration from tsw.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{CliError, CliResult};
use tsw_core::{AlignParams, ExclusionAxis, ReportOptions, TimeEncoding, TimeWeightMethod};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub align: AlignConfig,
    #[serde(default)]
    pub io: IoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Process (record, template) pairs one at a time, in input order
    #[serde(default)]
    pub deterministic: bool,

    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Gap penalty (g)
    #[serde(default = "default_gap_penalty")]
    pub gap_penalty: f64,

    /// Time-penalty parameter (T)
    #[serde(default = "default_time_param")]
    pub time_param: f64,

    /// Time-weight strategy: PropDiff, AbsDiff or Uniform
    #[serde(default)]
    pub method: TimeWeightMethod,

    /// Maximum alignments per pair, -1 for unbounded
    #[serde(default = "default_mem")]
    pub mem: i64,

    #[serde(default = "default_true")]
    pub remove_overlap: bool,

    /// Axis claimed by accepted alignments: s1, s2 or both.
    /// s2 lets one template be reported several times within a record.
    #[serde(default = "default_exclusion")]
    pub exclusion: ExclusionAxis,

    /// How event times are read: elapsed or absolute
    #[serde(default)]
    pub time_encoding: TimeEncoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoConfig {
    /// Separator between id and sequence in records/templates files
    #[serde(default = "default_tab")]
    pub input_delimiter: char,

    /// Separator between cells of the similarity matrix file
    #[serde(default = "default_comma")]
    pub similarity_delimiter: char,

    /// Separator between columns of delimited output
    #[serde(default = "default_tab")]
    pub output_delimiter: char,

    #[serde(default)]
    pub format: OutputFormat,

    /// Report spans one-based inclusive
    #[serde(default = "default_true")]
    pub one_based: bool,

    /// Decimal places for scores
    #[serde(default = "default_precision")]
    pub precision: usize,
}

// Default value functions
fn default_threads() -> usize { num_cpus::get() }
fn default_gap_penalty() -> f64 { 0.4 }
fn default_time_param() -> f64 { 0.5 }
fn default_mem() -> i64 { -1 }
fn default_true() -> bool { true }
fn default_exclusion() -> ExclusionAxis { ExclusionAxis::S2 }
fn default_tab() -> char { '\t' }
fn default_comma() -> char { ',' }
fn default_precision() -> usize { 4 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            deterministic: false,
            threads: default_threads(),
        }
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            gap_penalty: default_gap_penalty(),
            time_param: default_time_param(),
            method: TimeWeightMethod::default(),
            mem: default_mem(),
            remove_overlap: true,
            exclusion: default_exclusion(),
            time_encoding: TimeEncoding::default(),
        }
    }
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_delimiter: default_tab(),
            similarity_delimiter: default_comma(),
            output_delimiter: default_tab(),
            format: OutputFormat::default(),
            one_based: true,
            precision: default_precision(),
        }
    }
}

impl AlignConfig {
    /// Engine parameters described by this section
    pub fn to_params(&self) -> CliResult<AlignParams> {
        let params = AlignParams::default()
            .with_gap_penalty(self.gap_penalty)
            .with_time_param(self.time_param)
            .with_method(self.method)
            .with_mem(self.mem)
            .map_err(|e| CliError::config(e.to_string()))?
            .with_remove_overlap(self.remove_overlap)
            .with_exclusion(self.exclusion)
            .with_time_encoding(self.time_encoding);
        params
            .validate()
            .map_err(|e| CliError::config(e.to_string()))?;
        Ok(params)
    }
}

impl IoConfig {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            delimiter: self.output_delimiter,
            one_based: self.one_based,
            precision: self.precision,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                // Try to find tsw.toml in current directory
                let default_path = PathBuf::from("tsw.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: tsw.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::info!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
