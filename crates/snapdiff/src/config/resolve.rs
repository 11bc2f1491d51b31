use std::path::PathBuf;

use anyhow::{Context, Result};
use snapdiff::{Algorithm, MarkerStyle, Marking, Rect};

use super::{AlgorithmKind, CompareConfig, Config, DEFAULT_MARK_SIZE, MarkerConfig, load, load_from};

/// Values extracted from the CLI that participate in the merge.
#[derive(Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub mask: Option<PathBuf>,
    pub compare: CompareConfig,
    pub marker: MarkerConfig,
}

/// `SNAPDIFF_*` environment variables.
#[derive(Default)]
pub struct EnvOverrides {
    pub compare: CompareConfig,
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let algorithm = get("SNAPDIFF_ALGORITHM")
            .map(|v| v.parse::<AlgorithmKind>())
            .transpose()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("SNAPDIFF_ALGORITHM must be exact, color-fuzzy or pixel-fuzzy")?;
        let color_tolerance = get("SNAPDIFF_COLOR_TOLERANCE")
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("SNAPDIFF_COLOR_TOLERANCE must be a valid float")?;
        let pixel_tolerance = get("SNAPDIFF_PIXEL_TOLERANCE")
            .map(|v| v.parse::<f64>())
            .transpose()
            .context("SNAPDIFF_PIXEL_TOLERANCE must be a valid float")?;
        let block_size = get("SNAPDIFF_BLOCK_SIZE")
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("SNAPDIFF_BLOCK_SIZE must be a positive integer")?;

        Ok(Self {
            compare: CompareConfig {
                algorithm,
                color_tolerance,
                pixel_tolerance,
                block_size,
            },
        })
    }
}

/// Fully resolved config after CLI > env > file > defaults merge.
#[derive(Debug)]
pub struct ResolvedRunConfig {
    pub algorithm: Algorithm,
    pub marking: Marking,
    pub marker_style: MarkerStyle,
    pub mask_image: Option<PathBuf>,
    pub mask_rects: Vec<Rect>,
}

impl ResolvedRunConfig {
    pub fn new(cli: CliOverrides) -> Result<Self> {
        // 1. File layer
        let file_config = match &cli.config {
            Some(path) => load_from(path)?,
            None => load()?,
        };

        // 2. Env layer
        let env = EnvOverrides::from_env()?;

        Self::merge(file_config, env, cli)
    }

    /// CLI > env > file (highest priority first), then defaults.
    pub fn merge(file: Config, env: EnvOverrides, cli: CliOverrides) -> Result<Self> {
        let mut compare = file.compare;
        compare.merge(&env.compare);
        compare.merge(&cli.compare);

        let algorithm = compare.algorithm();
        algorithm.validate().context("Invalid comparison settings")?;

        let mut marker = file.marker;
        marker.merge(&cli.marker);
        let marking = Marking::new(
            marker.width.unwrap_or(DEFAULT_MARK_SIZE),
            marker.height.unwrap_or(DEFAULT_MARK_SIZE),
        );
        marking.validate().context("Invalid marker settings")?;

        Ok(Self {
            algorithm,
            marking,
            marker_style: marker.style.unwrap_or_default(),
            mask_image: cli.mask.or(file.mask.image),
            mask_rects: file.mask.rect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> Result<EnvOverrides> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvOverrides::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn defaults_without_any_layer() {
        let resolved =
            ResolvedRunConfig::merge(Config::default(), EnvOverrides::default(), CliOverrides::default())
                .unwrap();
        assert_eq!(
            resolved.algorithm,
            Algorithm::PixelFuzzy {
                pixel_tolerance: 0.2,
                color_tolerance: 0.1,
                block_size: 10
            }
        );
        assert_eq!(resolved.marking, Marking::new(10, 10));
        assert_eq!(resolved.marker_style, MarkerStyle::Box);
        assert!(resolved.mask_image.is_none());
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let mut file = Config::default();
        file.compare.algorithm = Some(AlgorithmKind::ColorFuzzy);
        file.compare.color_tolerance = Some(0.3);
        file.mask.image = Some(PathBuf::from("file-mask.png"));

        let env = env_from(&[("SNAPDIFF_COLOR_TOLERANCE", "0.2")]).unwrap();
        let resolved = ResolvedRunConfig::merge(file, env, CliOverrides::default()).unwrap();
        assert_eq!(
            resolved.algorithm,
            Algorithm::ColorFuzzy {
                color_tolerance: 0.2
            }
        );
        assert_eq!(resolved.mask_image, Some(PathBuf::from("file-mask.png")));

        let mut file = Config::default();
        file.compare.color_tolerance = Some(0.3);
        let env = env_from(&[
            ("SNAPDIFF_COLOR_TOLERANCE", "0.2"),
            ("SNAPDIFF_ALGORITHM", "exact"),
        ])
        .unwrap();
        let cli = CliOverrides {
            mask: Some(PathBuf::from("cli-mask.png")),
            compare: CompareConfig {
                algorithm: Some(AlgorithmKind::ColorFuzzy),
                color_tolerance: Some(0.01),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = ResolvedRunConfig::merge(file, env, cli).unwrap();
        assert_eq!(
            resolved.algorithm,
            Algorithm::ColorFuzzy {
                color_tolerance: 0.01
            }
        );
        assert_eq!(resolved.mask_image, Some(PathBuf::from("cli-mask.png")));
    }

    #[test]
    fn env_values_are_validated() {
        assert!(env_from(&[("SNAPDIFF_BLOCK_SIZE", "-3")]).is_err());
        assert!(env_from(&[("SNAPDIFF_ALGORITHM", "perceptual")]).is_err());

        let env = env_from(&[("SNAPDIFF_PIXEL_TOLERANCE", "4.0")]).unwrap();
        let err = ResolvedRunConfig::merge(Config::default(), env, CliOverrides::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("pixel tolerance"));
    }

    #[test]
    fn zero_marker_is_rejected() {
        let cli = CliOverrides {
            marker: MarkerConfig {
                width: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(
            ResolvedRunConfig::merge(Config::default(), EnvOverrides::default(), cli).is_err()
        );
    }
}
