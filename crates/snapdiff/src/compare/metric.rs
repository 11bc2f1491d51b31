use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::error::CompareError;

/// Pixel comparison algorithm together with its tolerance parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Algorithm {
    /// Pixels differ iff their RGBA values are not bit-identical.
    Exact,
    /// Pixels differ iff their normalized color distance exceeds
    /// `color_tolerance`.
    ColorFuzzy { color_tolerance: f64 },
    /// The image is split into `block_size` square tiles. A tile differs iff
    /// the fraction of its pixels exceeding `color_tolerance` is strictly
    /// greater than `pixel_tolerance`; every pixel of such a tile is a
    /// difference, and no pixel of any other tile is.
    PixelFuzzy {
        pixel_tolerance: f64,
        color_tolerance: f64,
        block_size: u32,
    },
}

pub fn validate_tolerance(name: &'static str, value: f64) -> Result<f64, CompareError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CompareError::InvalidTolerance { name, value });
    }
    Ok(value)
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::ColorFuzzy { .. } => "color-fuzzy",
            Self::PixelFuzzy { .. } => "pixel-fuzzy",
        }
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        match *self {
            Self::Exact => {}
            Self::ColorFuzzy { color_tolerance } => {
                validate_tolerance("color tolerance", color_tolerance)?;
            }
            Self::PixelFuzzy {
                pixel_tolerance,
                color_tolerance,
                block_size,
            } => {
                validate_tolerance("pixel tolerance", pixel_tolerance)?;
                validate_tolerance("color tolerance", color_tolerance)?;
                if block_size == 0 {
                    return Err(CompareError::InvalidBlockSize);
                }
            }
        }
        Ok(())
    }

    /// Per-pixel decision, ignoring any block aggregation.
    pub fn pixel_differs(&self, a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
        match *self {
            Self::Exact => a != b,
            Self::ColorFuzzy { color_tolerance } | Self::PixelFuzzy { color_tolerance, .. } => {
                color_distance(a, b) > color_tolerance
            }
        }
    }

    /// Row-major difference flags for two images of equal dimensions.
    pub(crate) fn evaluate(&self, reference: &RgbaImage, candidate: &RgbaImage) -> Vec<bool> {
        debug_assert_eq!(reference.dimensions(), candidate.dimensions());
        let per_pixel: Vec<bool> = reference
            .pixels()
            .zip(candidate.pixels())
            .map(|(a, b)| self.pixel_differs(a, b))
            .collect();

        match *self {
            Self::Exact | Self::ColorFuzzy { .. } => per_pixel,
            Self::PixelFuzzy {
                pixel_tolerance,
                block_size,
                ..
            } => aggregate_blocks(
                &per_pixel,
                reference.width(),
                reference.height(),
                block_size,
                pixel_tolerance,
            ),
        }
    }
}

/// Mean absolute R, G, B difference, normalized to `0.0..=1.0`. An alpha
/// change scores on its own, so the distance is zero iff the pixels are
/// identical.
pub fn color_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
    let rgb: u32 = a.0[..3]
        .iter()
        .zip(&b.0[..3])
        .map(|(&x, &y)| u32::from(x.abs_diff(y)))
        .sum();
    let rgb = f64::from(rgb) / (3.0 * 255.0);
    let alpha = f64::from(a.0[3].abs_diff(b.0[3])) / 255.0;
    rgb.max(alpha)
}

fn aggregate_blocks(
    per_pixel: &[bool],
    width: u32,
    height: u32,
    block_size: u32,
    pixel_tolerance: f64,
) -> Vec<bool> {
    let w = width as usize;
    let block = block_size as usize;
    let mut flagged = vec![false; per_pixel.len()];

    for ty in (0..height as usize).step_by(block) {
        let tile_h = block.min(height as usize - ty);
        for tx in (0..w).step_by(block) {
            let tile_w = block.min(w - tx);

            let differing = (ty..ty + tile_h)
                .map(|y| {
                    per_pixel[y * w + tx..y * w + tx + tile_w]
                        .iter()
                        .filter(|&&d| d)
                        .count()
                })
                .sum::<usize>();
            let fraction = differing as f64 / (tile_w * tile_h) as f64;

            // Exactly at the tolerance is still a match.
            if fraction > pixel_tolerance {
                for y in ty..ty + tile_h {
                    flagged[y * w + tx..y * w + tx + tile_w].fill(true);
                }
            }
        }
    }

    flagged
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn with_diffs(w: u32, h: u32, points: &[(u32, u32)]) -> RgbaImage {
        let mut img = RgbaImage::from_pixel(w, h, WHITE);
        for &(x, y) in points {
            img.put_pixel(x, y, BLACK);
        }
        img
    }

    fn count(flags: &[bool]) -> usize {
        flags.iter().filter(|&&f| f).count()
    }

    #[test]
    fn distance_bounds() {
        assert_eq!(color_distance(&WHITE, &WHITE), 0.0);
        assert_eq!(color_distance(&Rgba([0, 0, 0, 0]), &WHITE), 1.0);
        assert_eq!(color_distance(&WHITE, &BLACK), 1.0);
        assert_eq!(color_distance(&BLACK, &WHITE), 1.0);
        // One channel fully changed is a third of the RGB range.
        let red = Rgba([255, 0, 0, 255]);
        assert!((color_distance(&red, &BLACK) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn alpha_change_alone_is_a_distance() {
        let opaque = Rgba([10, 20, 30, 255]);
        let faded = Rgba([10, 20, 30, 0]);
        assert_eq!(color_distance(&opaque, &faded), 1.0);
        assert!(color_distance(&opaque, &Rgba([10, 20, 30, 254])) > 0.0);
    }

    #[test]
    fn opaque_black_and_white_differ_at_high_tolerance() {
        let a = RgbaImage::from_pixel(4, 4, WHITE);
        let b = RgbaImage::from_pixel(4, 4, BLACK);
        let algo = Algorithm::ColorFuzzy {
            color_tolerance: 0.8,
        };
        assert_eq!(count(&algo.evaluate(&a, &b)), 16);
        let all = Algorithm::ColorFuzzy {
            color_tolerance: 1.0,
        };
        assert_eq!(count(&all.evaluate(&a, &b)), 0);
    }

    #[test]
    fn exact_flags_single_channel_change() {
        let a = RgbaImage::from_pixel(4, 4, WHITE);
        let mut b = a.clone();
        b.put_pixel(2, 1, Rgba([255, 254, 255, 255]));
        let flags = Algorithm::Exact.evaluate(&a, &b);
        assert_eq!(count(&flags), 1);
        assert!(flags[4 + 2]);
    }

    #[test]
    fn color_fuzzy_tolerates_small_shift() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([100, 100, 100, 255]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([110, 110, 110, 255]));
        let loose = Algorithm::ColorFuzzy {
            color_tolerance: 0.1,
        };
        let strict = Algorithm::ColorFuzzy {
            color_tolerance: 0.01,
        };
        assert_eq!(count(&loose.evaluate(&a, &b)), 0);
        assert_eq!(count(&strict.evaluate(&a, &b)), 4);
    }

    #[test]
    fn block_at_tolerance_is_not_flagged() {
        let reference = RgbaImage::from_pixel(10, 10, WHITE);
        let ten: Vec<(u32, u32)> = (0..10).map(|i| (i, i)).collect();
        let candidate = with_diffs(10, 10, &ten);
        let algo = Algorithm::PixelFuzzy {
            pixel_tolerance: 0.1,
            color_tolerance: 0.1,
            block_size: 10,
        };
        assert_eq!(count(&algo.evaluate(&reference, &candidate)), 0);
    }

    #[test]
    fn block_over_tolerance_flags_whole_block() {
        let reference = RgbaImage::from_pixel(10, 10, WHITE);
        let mut eleven: Vec<(u32, u32)> = (0..10).map(|i| (i, i)).collect();
        eleven.push((0, 9));
        let candidate = with_diffs(10, 10, &eleven);
        let algo = Algorithm::PixelFuzzy {
            pixel_tolerance: 0.1,
            color_tolerance: 0.1,
            block_size: 10,
        };
        assert_eq!(count(&algo.evaluate(&reference, &candidate)), 100);
    }

    #[test]
    fn edge_tiles_use_their_own_size() {
        // 5x5 image, block 4: the bottom-right tile is a single pixel.
        let reference = RgbaImage::from_pixel(5, 5, WHITE);
        let candidate = with_diffs(5, 5, &[(4, 4)]);
        let algo = Algorithm::PixelFuzzy {
            pixel_tolerance: 0.5,
            color_tolerance: 0.0,
            block_size: 4,
        };
        let flags = algo.evaluate(&reference, &candidate);
        assert_eq!(count(&flags), 1);
        assert!(flags[24]);
    }

    #[test]
    fn subthreshold_tile_hides_individual_differences() {
        let reference = RgbaImage::from_pixel(8, 4, WHITE);
        // Left tile: 1/16 differs. Right tile: 5/16 differs.
        let candidate = with_diffs(8, 4, &[(0, 0), (4, 0), (5, 0), (6, 0), (7, 0), (4, 1)]);
        let algo = Algorithm::PixelFuzzy {
            pixel_tolerance: 0.25,
            color_tolerance: 0.0,
            block_size: 4,
        };
        let flags = algo.evaluate(&reference, &candidate);
        assert!(!flags[0]);
        assert_eq!(count(&flags), 16);
        assert!(flags[3 * 8 + 7]);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert_eq!(
            Algorithm::ColorFuzzy {
                color_tolerance: 1.5
            }
            .validate(),
            Err(CompareError::InvalidTolerance {
                name: "color tolerance",
                value: 1.5
            })
        );
        assert_eq!(
            Algorithm::PixelFuzzy {
                pixel_tolerance: 0.1,
                color_tolerance: 0.1,
                block_size: 0
            }
            .validate(),
            Err(CompareError::InvalidBlockSize)
        );
        assert!(
            Algorithm::PixelFuzzy {
                pixel_tolerance: f64::NAN,
                color_tolerance: 0.1,
                block_size: 3
            }
            .validate()
            .is_err()
        );
        assert!(Algorithm::Exact.validate().is_ok());
    }

    #[test]
    fn serde_uses_kebab_tags() {
        let algo: Algorithm = toml::from_str(
            "type = \"pixel-fuzzy\"\npixel_tolerance = 0.2\ncolor_tolerance = 0.1\nblock_size = 10\n",
        )
        .unwrap();
        assert_eq!(
            algo,
            Algorithm::PixelFuzzy {
                pixel_tolerance: 0.2,
                color_tolerance: 0.1,
                block_size: 10
            }
        );
        assert_eq!(algo.name(), "pixel-fuzzy");
    }
}
