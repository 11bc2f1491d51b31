use image::{Rgba, RgbaImage};
use serde::Serialize;
use tracing::debug;

use super::rect::Rect;

/// Fill colour for canvas area introduced by padding.
pub const PADDING: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Sizes recorded while aligning two images onto a common canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extents {
    pub reference: (u32, u32),
    pub candidate: (u32, u32),
    pub canvas: (u32, u32),
}

impl Extents {
    pub fn of(reference: &RgbaImage, candidate: &RgbaImage) -> Self {
        let reference = reference.dimensions();
        let candidate = candidate.dimensions();
        Self {
            reference,
            candidate,
            canvas: (
                reference.0.max(candidate.0),
                reference.1.max(candidate.1),
            ),
        }
    }

    pub fn resized(&self) -> bool {
        self.reference != self.candidate
    }

    /// How much the smaller extent was grown in each dimension.
    pub fn padding_offset(&self) -> (u32, u32) {
        (
            self.canvas.0 - self.reference.0.min(self.candidate.0),
            self.canvas.1 - self.reference.1.min(self.candidate.1),
        )
    }

    /// True when exactly one of the two originals covers `(x, y)`.
    pub fn coverage_mismatch(&self, x: u32, y: u32) -> bool {
        let inside = |(w, h): (u32, u32)| Rect::new(0, 0, w, h).contains(x, y);
        inside(self.reference) != inside(self.candidate)
    }
}

/// Working copies of both images on a shared canvas.
pub struct Reconciled {
    pub reference: RgbaImage,
    pub candidate: RgbaImage,
    pub extents: Extents,
}

/// Copy both images onto a canvas of their maximum width and height.
/// Originals are anchored at the top-left; new pixels are [`PADDING`].
pub fn reconcile(reference: &RgbaImage, candidate: &RgbaImage) -> Reconciled {
    let extents = Extents::of(reference, candidate);
    if !extents.resized() {
        return Reconciled {
            reference: reference.clone(),
            candidate: candidate.clone(),
            extents,
        };
    }

    let (w, h) = extents.canvas;
    debug!(
        reference = ?extents.reference,
        candidate = ?extents.candidate,
        canvas = ?extents.canvas,
        "padding images to a common canvas"
    );
    Reconciled {
        reference: pad_to(reference, w, h),
        candidate: pad_to(candidate, w, h),
        extents,
    }
}

/// Paste `src` onto a transparent canvas of `w x h`, anchored at top-left.
pub fn pad_to(src: &RgbaImage, w: u32, h: u32) -> RgbaImage {
    if src.dimensions() == (w, h) {
        return src.clone();
    }
    let mut canvas = RgbaImage::from_pixel(w, h, PADDING);
    image::imageops::replace(&mut canvas, src, 0, 0);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREY: Rgba<u8> = Rgba([200, 200, 200, 255]);

    #[test]
    fn equal_sizes_are_untouched() {
        let a = RgbaImage::from_pixel(4, 3, GREY);
        let r = reconcile(&a, &a);
        assert!(!r.extents.resized());
        assert_eq!(r.extents.padding_offset(), (0, 0));
        assert_eq!(r.reference, a);
        assert_eq!(r.candidate, a);
    }

    #[test]
    fn smaller_image_is_padded() {
        let a = RgbaImage::from_pixel(10, 10, GREY);
        let b = RgbaImage::from_pixel(10, 12, GREY);
        let r = reconcile(&a, &b);
        assert!(r.extents.resized());
        assert_eq!(r.extents.canvas, (10, 12));
        assert_eq!(r.extents.padding_offset(), (0, 2));
        assert_eq!(r.reference.dimensions(), (10, 12));
        assert_eq!(*r.reference.get_pixel(0, 11), PADDING);
        assert_eq!(*r.reference.get_pixel(9, 9), GREY);
        assert_eq!(r.candidate, b);
    }

    #[test]
    fn crossed_sizes_grow_both() {
        let a = RgbaImage::from_pixel(30, 5, GREY);
        let b = RgbaImage::from_pixel(5, 30, GREY);
        let r = reconcile(&a, &b);
        assert_eq!(r.extents.canvas, (30, 30));
        assert_eq!(r.extents.padding_offset(), (25, 25));
        // Covered by the reference only.
        assert!(r.extents.coverage_mismatch(20, 2));
        // Covered by both, and by neither.
        assert!(!r.extents.coverage_mismatch(2, 2));
        assert!(!r.extents.coverage_mismatch(20, 20));
    }
}
