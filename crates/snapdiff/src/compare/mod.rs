pub mod cluster;
mod error;
pub mod mask;
pub mod metric;
pub mod reconcile;
mod rect;
pub mod render;

use image::RgbaImage;
use serde::Serialize;
use tracing::debug;

pub use self::cluster::{FeaturePoint, Marking, Region};
pub use self::error::CompareError;
pub use self::mask::Mask;
pub use self::metric::Algorithm;
pub use self::reconcile::Extents;
pub use self::rect::Rect;
pub use self::render::MarkerStyle;

/// Outcome of one comparison. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub equal: bool,
    pub algorithm: Algorithm,
    /// Differing pixels in row-major order.
    pub differences: Vec<(u32, u32)>,
    pub resized: bool,
    pub padding_offset: (u32, u32),
    pub extents: Extents,
}

/// A finished comparison together with the reconciled, masked working
/// images it was computed on.
pub struct Comparison {
    pub result: ComparisonResult,
    reference: RgbaImage,
    candidate: RgbaImage,
    /// The candidate padded to the canvas, before masking.
    padded_candidate: RgbaImage,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        self.result.equal
    }

    pub fn reference(&self) -> &RgbaImage {
        &self.reference
    }

    pub fn candidate(&self) -> &RgbaImage {
        &self.candidate
    }

    /// Differences scored by their color distance.
    pub fn feature_points(&self) -> Vec<FeaturePoint> {
        self.result
            .differences
            .iter()
            .map(|&(x, y)| {
                let score = metric::color_distance(
                    self.reference.get_pixel(x, y),
                    self.candidate.get_pixel(x, y),
                );
                FeaturePoint::new(x, y, score)
            })
            .collect()
    }

    pub fn regions(&self, marking: Marking) -> Result<Vec<Region>, CompareError> {
        cluster::cluster(
            &self.feature_points(),
            self.result.extents.canvas,
            marking,
        )
    }

    pub fn difference_map(&self) -> RgbaImage {
        render::difference_map(
            &self.reference,
            &self.candidate,
            &self.result.differences,
            &self.result.extents,
        )
    }

    /// Mark clustered differences on the padded, unmasked candidate.
    /// `None` when the images are equal.
    pub fn mark_differences(
        &self,
        marking: Marking,
        style: MarkerStyle,
    ) -> Result<Option<RgbaImage>, CompareError> {
        let regions = self.regions(marking)?;
        Ok(render::mark_regions(
            &self.padded_candidate,
            &regions,
            marking,
            style,
        ))
    }
}

fn ensure_not_empty(which: &'static str, image: &RgbaImage) -> Result<(), CompareError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CompareError::EmptyImage {
            which,
            width,
            height,
        });
    }
    Ok(())
}

/// Compare `candidate` against `reference`.
///
/// Images of different sizes are padded onto a common canvas; canvas pixels
/// covered by only one of the two originals always count as differences
/// unless masked. Masked pixels never differ. Caller images are not modified.
pub fn compare(
    reference: &RgbaImage,
    candidate: &RgbaImage,
    mask: Option<&Mask>,
    algorithm: Algorithm,
) -> Result<Comparison, CompareError> {
    algorithm.validate()?;
    ensure_not_empty("reference", reference)?;
    ensure_not_empty("candidate", candidate)?;

    let extents = Extents::of(reference, candidate);
    if let Some(mask) = mask {
        mask.check_alignment(&extents)?;
    }

    let reconcile::Reconciled {
        reference: mut work_ref,
        candidate: mut work_cand,
        extents,
    } = reconcile::reconcile(reference, candidate);
    let padded_candidate = work_cand.clone();

    if let Some(mask) = mask {
        mask.overlay(&mut work_ref, &mut work_cand);
    }

    let mut flags = algorithm.evaluate(&work_ref, &work_cand);
    let (w, h) = extents.canvas;

    if extents.resized() {
        let is_masked = |x, y| mask.is_some_and(|m| m.is_masked(x, y));
        for y in 0..h {
            for x in 0..w {
                if extents.coverage_mismatch(x, y) && !is_masked(x, y) {
                    flags[y as usize * w as usize + x as usize] = true;
                }
            }
        }
    }

    let differences: Vec<(u32, u32)> = flags
        .iter()
        .enumerate()
        .filter(|&(_, &differs)| differs)
        .map(|(i, _)| ((i % w as usize) as u32, (i / w as usize) as u32))
        .collect();

    debug!(
        algorithm = algorithm.name(),
        width = w,
        height = h,
        differences = differences.len(),
        resized = extents.resized(),
        "comparison finished"
    );

    Ok(Comparison {
        result: ComparisonResult {
            equal: differences.is_empty(),
            algorithm,
            differences,
            resized: extents.resized(),
            padding_offset: extents.padding_offset(),
            extents,
        },
        reference: work_ref,
        candidate: work_cand,
        padded_candidate,
    })
}
