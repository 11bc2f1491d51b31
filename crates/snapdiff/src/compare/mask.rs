use image::{Rgba, RgbaImage};
use tracing::debug;

use super::error::CompareError;
use super::reconcile::Extents;
use super::rect::Rect;

/// Colour that marks a masked pixel in a mask image, and the value written
/// into both working images wherever the mask applies.
pub const MASK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const CLEAR_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Regions excluded from comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    masked: Vec<bool>,
}

impl Mask {
    /// Empty mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            masked: vec![false; width as usize * height as usize],
        }
    }

    /// Read a mask image: opaque black pixels are masked, everything else is
    /// compared.
    pub fn from_image(image: &RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            masked: image.pixels().map(|p| *p == MASK_COLOR).collect(),
        }
    }

    pub fn from_rects(width: u32, height: u32, rects: &[Rect]) -> Result<Self, CompareError> {
        let mut mask = Self::new(width, height);
        for rect in rects {
            mask.add_rect(*rect)?;
        }
        Ok(mask)
    }

    /// Mask a rectangle; parts outside the mask are dropped.
    pub fn add_rect(&mut self, rect: Rect) -> Result<(), CompareError> {
        if rect.is_empty() {
            return Err(CompareError::InvalidMaskRect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            });
        }
        let Some(clipped) = rect.clip(self.width, self.height) else {
            return Ok(());
        };
        let w = self.width as usize;
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * w;
            self.masked[row + clipped.x as usize..row + clipped.right() as usize].fill(true);
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Outside the mask's own extent nothing is masked.
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.masked[y as usize * self.width as usize + x as usize]
    }

    pub fn masked_count(&self) -> usize {
        self.masked.iter().filter(|&&m| m).count()
    }

    /// Render as an image that [`Mask::from_image`] reads back unchanged.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            if self.is_masked(x, y) {
                MASK_COLOR
            } else {
                CLEAR_COLOR
            }
        })
    }

    /// The mask must span at least one of the two original images.
    pub(crate) fn check_alignment(&self, extents: &Extents) -> Result<(), CompareError> {
        let covers = |(w, h): (u32, u32)| self.width >= w && self.height >= h;
        if covers(extents.reference) || covers(extents.candidate) {
            return Ok(());
        }
        Err(CompareError::MaskMismatch {
            mask_w: self.width,
            mask_h: self.height,
            ref_w: extents.reference.0,
            ref_h: extents.reference.1,
            cand_w: extents.candidate.0,
            cand_h: extents.candidate.1,
        })
    }

    /// Stamp [`MASK_COLOR`] into both images at every masked pixel.
    pub(crate) fn overlay(&self, reference: &mut RgbaImage, candidate: &mut RgbaImage) {
        let w = reference.width().min(self.width);
        let h = reference.height().min(self.height);
        let mut stamped = 0usize;
        for y in 0..h {
            for x in 0..w {
                if self.is_masked(x, y) {
                    reference.put_pixel(x, y, MASK_COLOR);
                    candidate.put_pixel(x, y, MASK_COLOR);
                    stamped += 1;
                }
            }
        }
        debug!(stamped, "applied mask");
    }
}
