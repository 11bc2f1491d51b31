pub mod resolve;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use snapdiff::compare::metric::validate_tolerance;
use snapdiff::{Algorithm, MarkerStyle, Rect};

pub use self::resolve::{CliOverrides, ResolvedRunConfig};
pub use self::template::{config_file_exists, write_template};

pub(crate) const CONFIG_DIR: &str = ".snapdiff";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_COLOR_TOLERANCE: f64 = 0.1;
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 0.2;
pub const DEFAULT_BLOCK_SIZE: u32 = 10;
pub const DEFAULT_MARK_SIZE: u32 = 10;

/// clap value parser for tolerances.
pub fn parse_tolerance(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_tolerance("tolerance", v).map_err(|e| e.to_string())
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    Exact,
    ColorFuzzy,
    #[default]
    PixelFuzzy,
}

impl std::str::FromStr for AlgorithmKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as clap::ValueEnum>::from_str(s, true)
    }
}

/// Comparison algorithm and tolerances.
///
/// Every field is `Option`; `None` means "use default".
/// Serves both TOML deserialization (`[compare]`) and CLI argument parsing.
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Comparison algorithm
    #[arg(long, value_enum)]
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<AlgorithmKind>,

    /// Max normalized color distance per pixel (0.0-1.0)
    #[arg(long, value_parser = parse_tolerance)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_tolerance: Option<f64>,

    /// Max fraction of differing pixels per block (0.0-1.0)
    #[arg(long, value_parser = parse_tolerance)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_tolerance: Option<f64>,

    /// Edge length of the square blocks used by pixel-fuzzy
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_size: Option<u32>,
}

impl CompareConfig {
    /// Overlay non-None fields from `other` onto self.
    pub fn merge(&mut self, other: &CompareConfig) {
        if other.algorithm.is_some() {
            self.algorithm = other.algorithm;
        }
        if other.color_tolerance.is_some() {
            self.color_tolerance = other.color_tolerance;
        }
        if other.pixel_tolerance.is_some() {
            self.pixel_tolerance = other.pixel_tolerance;
        }
        if other.block_size.is_some() {
            self.block_size = other.block_size;
        }
    }

    /// Fill the gaps with defaults and build the engine's algorithm.
    pub fn algorithm(&self) -> Algorithm {
        let color_tolerance = self.color_tolerance.unwrap_or(DEFAULT_COLOR_TOLERANCE);
        match self.algorithm.unwrap_or_default() {
            AlgorithmKind::Exact => Algorithm::Exact,
            AlgorithmKind::ColorFuzzy => Algorithm::ColorFuzzy { color_tolerance },
            AlgorithmKind::PixelFuzzy => Algorithm::PixelFuzzy {
                pixel_tolerance: self.pixel_tolerance.unwrap_or(DEFAULT_PIXEL_TOLERANCE),
                color_tolerance,
                block_size: self.block_size.unwrap_or(DEFAULT_BLOCK_SIZE),
            },
        }
    }
}

/// How differences are marked on the candidate image.
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
pub struct MarkerConfig {
    #[arg(long = "marker", value_enum)]
    #[serde(default, rename = "style", skip_serializing_if = "Option::is_none")]
    pub style: Option<MarkerStyle>,

    /// Width of one marking cell in pixels
    #[arg(long = "mark-width")]
    #[serde(default, rename = "width", skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Height of one marking cell in pixels
    #[arg(long = "mark-height")]
    #[serde(default, rename = "height", skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl MarkerConfig {
    pub fn merge(&mut self, other: &MarkerConfig) {
        if other.style.is_some() {
            self.style = other.style;
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Mask image; opaque black pixels are excluded from comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    /// Rectangles excluded from comparison, in canvas coordinates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rect: Vec<Rect>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compare: CompareConfig,
    #[serde(default)]
    pub marker: MarkerConfig,
    #[serde(default)]
    pub mask: MaskConfig,
}

impl Config {
    /// Validate semantic constraints that serde cannot express.
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("color_tolerance", self.compare.color_tolerance),
            ("pixel_tolerance", self.compare.pixel_tolerance),
        ] {
            if let Some(v) = value {
                validate_tolerance("tolerance", v).with_context(|| format!("compare.{name}"))?;
            }
        }

        if self.compare.block_size == Some(0) {
            bail!("compare.block_size must be greater than 0");
        }

        for (name, value) in [("width", self.marker.width), ("height", self.marker.height)] {
            if value == Some(0) {
                bail!("marker.{name} must be greater than 0");
            }
        }

        for r in &self.mask.rect {
            if r.is_empty() {
                bail!(
                    "Mask rectangle at ({}, {}) has invalid dimensions ({}x{}). \
                     Both width and height must be > 0",
                    r.x,
                    r.y,
                    r.width,
                    r.height,
                );
            }
        }

        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    Path::new(CONFIG_DIR).join(CONFIG_FILE)
}

/// Read and validate a config file.
pub fn load_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load `.snapdiff/config.toml`, falling back to defaults when it is absent.
pub fn load() -> Result<Config> {
    let path = config_path();
    if !path.exists() {
        return Ok(Config::default());
    }
    load_from(&path)
}
