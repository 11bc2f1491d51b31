use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::cluster::{Marking, Region};
use super::metric::color_distance;
use super::reconcile::Extents;

/// Colour of markers, boxes and padding borders. Never produced by the
/// greyscale map itself.
pub const MARK_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerStyle {
    /// Outline every region.
    #[default]
    Box,
    /// Cross at the center of every region.
    Point,
}

/// Greyscale map of difference severity on a black canvas. Brighter means
/// a larger color distance between the two images at that pixel.
pub fn difference_map(
    reference: &RgbaImage,
    candidate: &RgbaImage,
    differences: &[(u32, u32)],
    extents: &Extents,
) -> RgbaImage {
    let (w, h) = reference.dimensions();
    let mut map = RgbaImage::from_pixel(w, h, BACKGROUND);

    for &(x, y) in differences {
        let d = color_distance(reference.get_pixel(x, y), candidate.get_pixel(x, y));
        let grey = (d * 255.0).round() as u8;
        map.put_pixel(x, y, Rgba([grey, grey, grey, 255]));
    }

    if extents.resized() {
        draw_content_border(&mut map, extents.reference);
        draw_content_border(&mut map, extents.candidate);
    }
    map
}

/// Mark the first padded column and row next to an original of size
/// `content` on a larger canvas.
fn draw_content_border(map: &mut RgbaImage, content: (u32, u32)) {
    let (w, h) = map.dimensions();
    let (cw, ch) = content;
    if cw < w {
        for y in 0..(ch + 1).min(h) {
            map.put_pixel(cw, y, MARK_COLOR);
        }
    }
    if ch < h {
        for x in 0..(cw + 1).min(w) {
            map.put_pixel(x, ch, MARK_COLOR);
        }
    }
}

/// Copy of `canvas` with every region marked, or `None` when there is
/// nothing to mark.
pub fn mark_regions(
    canvas: &RgbaImage,
    regions: &[Region],
    marking: Marking,
    style: MarkerStyle,
) -> Option<RgbaImage> {
    if regions.is_empty() {
        return None;
    }
    let mut out = canvas.clone();
    for region in regions {
        match style {
            MarkerStyle::Box => draw_outline(&mut out, region),
            MarkerStyle::Point => draw_cross(&mut out, region, marking),
        }
    }
    Some(out)
}

fn draw_outline(img: &mut RgbaImage, region: &Region) {
    let r = region.rect;
    let (right, bottom) = (r.right() - 1, r.bottom() - 1);
    for x in r.x..=right {
        img.put_pixel(x, r.y, MARK_COLOR);
        img.put_pixel(x, bottom, MARK_COLOR);
    }
    for y in r.y..=bottom {
        img.put_pixel(r.x, y, MARK_COLOR);
        img.put_pixel(right, y, MARK_COLOR);
    }
}

fn draw_cross(img: &mut RgbaImage, region: &Region, marking: Marking) {
    let (w, h) = img.dimensions();
    let (cx, cy) = region.rect.centroid();
    let (arm_x, arm_y) = (marking.width / 2, marking.height / 2);

    for x in cx.saturating_sub(arm_x)..=(cx + arm_x).min(w - 1) {
        img.put_pixel(x, cy, MARK_COLOR);
    }
    for y in cy.saturating_sub(arm_y)..=(cy + arm_y).min(h - 1) {
        img.put_pixel(cx, y, MARK_COLOR);
    }
}
