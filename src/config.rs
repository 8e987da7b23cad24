//! Configuration file support for printpad
//!
//! Supports TOML configuration files with the following search order:
//! 1. `--config <path>` - explicitly specified path
//! 2. `./printpad.toml` - current directory
//! 3. `~/.config/printpad/config.toml` - user config
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [padding]
//! ratio = "2:3"
//! border_percent = 5.0
//! color = "#FFFFFF"
//!
//! [metadata]
//! preserve_exif = true
//!
//! [output]
//! jpeg_quality = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compositor::{BorderColor, PaddingConfig};
use crate::geometry::{AspectRatio, PadMode};
use crate::pipeline::{JobOptions, OverwritePolicy};
use crate::writer::WriterOptions;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Well-formed TOML with an unusable value
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Padding configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaddingSection {
    /// Target aspect ratio, e.g. "2:3"
    #[serde(default)]
    pub ratio: Option<String>,

    /// Use even-border mode instead of a ratio
    #[serde(default)]
    pub even: Option<bool>,

    /// Border size in pixels for even-border mode
    #[serde(default)]
    pub margin: Option<u32>,

    /// Extra outer border in percent (5.0 = 5%)
    #[serde(default)]
    pub border_percent: Option<f64>,

    /// Border color as hex, e.g. "#FFFFFF"
    #[serde(default)]
    pub color: Option<String>,
}

/// Metadata preservation options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataSection {
    /// Carry the ICC color profile
    #[serde(default)]
    pub preserve_icc: Option<bool>,

    /// Carry the EXIF block
    #[serde(default)]
    pub preserve_exif: Option<bool>,

    /// Carry the stored DPI
    #[serde(default)]
    pub preserve_dpi: Option<bool>,
}

/// Output configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    /// JPEG quality (1-100)
    #[serde(default)]
    pub jpeg_quality: Option<u8>,

    /// Replace existing output files instead of skipping them
    #[serde(default)]
    pub overwrite: Option<bool>,
}

/// General configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneralSection {
    /// Number of threads for parallel processing
    #[serde(default)]
    pub threads: Option<usize>,

    /// Follow the source orientation when applying a ratio
    #[serde(default)]
    pub match_orientation: Option<bool>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Padding settings
    #[serde(default)]
    pub padding: PaddingSection,

    /// Metadata settings
    #[serde(default)]
    pub metadata: MetadataSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputSection,

    /// General settings
    #[serde(default)]
    pub general: GeneralSection,
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default search path
    ///
    /// Search order:
    /// 1. `./printpad.toml`
    /// 2. `~/.config/printpad/config.toml`
    /// 3. Default values (if no file found)
    pub fn load() -> Result<Self, ConfigError> {
        let current_dir_config = PathBuf::from("printpad.toml");
        if current_dir_config.exists() {
            return Self::load_from_path(&current_dir_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("printpad").join("config.toml");
            if user_config.exists() {
                return Self::load_from_path(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Convert to job options
    pub fn to_job_options(&self) -> Result<JobOptions, ConfigError> {
        self.merge_with_cli(&CliOverrides::default())
    }

    /// Merge with CLI arguments (CLI takes precedence) into job options
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> Result<JobOptions, ConfigError> {
        let defaults = PaddingConfig::default();

        let ratio_str = cli.ratio.as_deref().or(self.padding.ratio.as_deref());
        let even = cli.even.or(self.padding.even).unwrap_or(false);
        let margin = cli.margin.or(self.padding.margin).unwrap_or(0);
        let mode = if even {
            PadMode::Even { margin }
        } else {
            match ratio_str {
                Some(s) => mode_from_ratio(s)?,
                None => defaults.mode,
            }
        };

        let border_percent = cli
            .border_percent
            .or(self.padding.border_percent)
            .unwrap_or(0.0);
        if !border_percent.is_finite() || border_percent < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "border_percent must be a non-negative percentage, got {border_percent}"
            )));
        }

        let color = match cli.color.as_deref().or(self.padding.color.as_deref()) {
            Some(s) => s
                .parse::<BorderColor>()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            None => BorderColor::WHITE,
        };

        let padding = PaddingConfig::builder()
            .mode(mode)
            .border_color(color)
            .border_percent(border_percent / 100.0)
            .preserve_icc(
                cli.preserve_icc
                    .or(self.metadata.preserve_icc)
                    .unwrap_or(defaults.preserve_icc),
            )
            .preserve_exif(
                cli.preserve_exif
                    .or(self.metadata.preserve_exif)
                    .unwrap_or(defaults.preserve_exif),
            )
            .preserve_dpi(
                cli.preserve_dpi
                    .or(self.metadata.preserve_dpi)
                    .unwrap_or(defaults.preserve_dpi),
            )
            .build();

        let writer = match cli.jpeg_quality.or(self.output.jpeg_quality) {
            Some(q) => {
                if q == 0 || q > 100 {
                    return Err(ConfigError::Invalid(format!(
                        "jpeg_quality must be 1-100, got {q}"
                    )));
                }
                WriterOptions::builder().jpeg_quality(q).build()
            }
            None => WriterOptions::default(),
        };

        let overwrite = match cli.overwrite.or(self.output.overwrite) {
            Some(true) => OverwritePolicy::Overwrite,
            _ => OverwritePolicy::Skip,
        };

        Ok(JobOptions::builder()
            .padding(padding)
            .writer(writer)
            .overwrite(overwrite)
            .match_orientation(
                cli.match_orientation
                    .or(self.general.match_orientation)
                    .unwrap_or(true),
            )
            .threads(cli.threads.or(self.general.threads))
            .build())
    }

    /// Get config file search paths
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("printpad.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("printpad").join("config.toml"));
        }

        paths
    }
}

/// Parse a ratio string into a padding mode, recognizing the presets
fn mode_from_ratio(s: &str) -> Result<PadMode, ConfigError> {
    let ratio: AspectRatio = s
        .parse()
        .map_err(|e: crate::geometry::GeometryError| ConfigError::Invalid(e.to_string()))?;

    let presets = [
        AspectRatio::CLASSIC_35MM,
        AspectRatio::PRINT_4X5,
        AspectRatio::SQUARE,
    ];
    if presets.contains(&ratio) {
        Ok(PadMode::Preset(ratio))
    } else {
        Ok(PadMode::Custom(ratio))
    }
}

/// CLI override values for merging with config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub ratio: Option<String>,
    pub even: Option<bool>,
    pub margin: Option<u32>,
    pub border_percent: Option<f64>,
    pub color: Option<String>,
    pub preserve_icc: Option<bool>,
    pub preserve_exif: Option<bool>,
    pub preserve_dpi: Option<bool>,
    pub jpeg_quality: Option<u8>,
    pub overwrite: Option<bool>,
    pub threads: Option<usize>,
    pub match_orientation: Option<bool>,
}

impl CliOverrides {
    /// Create new empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set ratio override
    pub fn with_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.ratio = Some(ratio.into());
        self
    }

    /// Set even-border mode override
    pub fn with_even(mut self, even: bool) -> Self {
        self.even = Some(even);
        self
    }

    /// Set even-border margin override
    pub fn with_margin(mut self, margin: u32) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Set outer border percentage override
    pub fn with_border_percent(mut self, percent: f64) -> Self {
        self.border_percent = Some(percent);
        self
    }

    /// Set border color override
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set overwrite override
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }
}
