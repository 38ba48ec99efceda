use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    aggregate::{AggregateSettings, DEFAULT_REFERENCE_YEAR},
    layout::EpwLayout,
    model::CloudThresholds,
    render::OutputFormat,
};

/// Directory charts are written to when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default output format, "svg" or "json".
    pub default_format: Option<String>,

    pub output_dir: Option<PathBuf>,

    /// Year used to date the daily temperature records.
    pub reference_year: Option<i32>,

    /// Example TOML:
    /// [cloud_thresholds]
    /// above = 7.0
    /// below = 4.0
    pub cloud_thresholds: Option<CloudThresholds>,

    #[serde(default)]
    pub layout: EpwLayout,
}

impl Config {
    /// Default output format as a strongly-typed `OutputFormat`, SVG when unset.
    pub fn default_format(&self) -> Result<OutputFormat> {
        match self.default_format.as_deref() {
            Some(s) => OutputFormat::try_from(s),
            None => Ok(OutputFormat::Svg),
        }
    }

    pub fn set_default_format(&mut self, format: OutputFormat) {
        self.default_format = Some(format.as_str().to_string());
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or(DEFAULT_REFERENCE_YEAR)
    }

    pub fn cloud_thresholds(&self) -> CloudThresholds {
        self.cloud_thresholds.unwrap_or_default()
    }

    /// Replace the cloud thresholds; `below` must not exceed `above`.
    pub fn set_cloud_thresholds(&mut self, above: f64, below: f64) -> Result<()> {
        if !above.is_finite() || !below.is_finite() || below > above {
            return Err(anyhow!(
                "Invalid cloud thresholds: below ({below}) must be a number no greater than above ({above})."
            ));
        }

        self.cloud_thresholds = Some(CloudThresholds { above, below });
        Ok(())
    }

    pub fn aggregate_settings(&self) -> AggregateSettings {
        AggregateSettings {
            cloud: self.cloud_thresholds(),
            reference_year: self.reference_year(),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "epw-viz", "epw-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
