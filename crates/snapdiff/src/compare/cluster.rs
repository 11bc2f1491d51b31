//! Grouping of scattered difference pixels into rectangular regions.
//!
//! The canvas is divided into a fixed grid of `width x height` cells anchored
//! at the origin. Every cell that holds at least one difference becomes one
//! region, clipped to the canvas so cells on the right and bottom edges may
//! be smaller than the marking size.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::error::CompareError;
use super::rect::Rect;

/// A difference pixel promoted to a clusterable unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeaturePoint {
    pub x: u32,
    pub y: u32,
    /// Severity of the difference, `0.0..=1.0`.
    pub score: f64,
}

impl FeaturePoint {
    pub const fn new(x: u32, y: u32, score: f64) -> Self {
        Self { x, y, score }
    }

    /// `(x, y)` ascending, then score descending.
    fn cluster_order(&self, other: &Self) -> Ordering {
        self.x
            .cmp(&other.x)
            .then(self.y.cmp(&other.y))
            .then(other.score.total_cmp(&self.score))
    }
}

/// Size of one marking cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marking {
    pub width: u32,
    pub height: u32,
}

impl Marking {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), CompareError> {
        if self.width == 0 || self.height == 0 {
            return Err(CompareError::InvalidMarker {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// One occupied marking cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    pub rect: Rect,
    /// Number of feature points absorbed by this region.
    pub points: usize,
    /// Highest score among the absorbed points.
    pub peak: f64,
}

impl Region {
    fn seed(rect: Rect, point: &FeaturePoint) -> Self {
        Self {
            rect,
            points: 1,
            peak: point.score,
        }
    }

    fn absorb(&mut self, point: &FeaturePoint) {
        self.points += 1;
        self.peak = self.peak.max(point.score);
    }
}

/// Cluster `points` on a `canvas` sized grid of `marking` cells.
///
/// Points outside the canvas are ignored. Regions come back in row-major
/// cell order.
pub fn cluster(
    points: &[FeaturePoint],
    canvas: (u32, u32),
    marking: Marking,
) -> Result<Vec<Region>, CompareError> {
    marking.validate()?;
    let (w, h) = canvas;
    let cols = w.div_ceil(marking.width) as usize;
    let rows = h.div_ceil(marking.height) as usize;

    let mut arena: Vec<FeaturePoint> = points
        .iter()
        .filter(|p| p.x < w && p.y < h)
        .copied()
        .collect();
    arena.sort_by(FeaturePoint::cluster_order);

    // Visited state per cell: the region that owns it, once emitted.
    let mut owner: Vec<Option<usize>> = vec![None; cols * rows];
    let mut regions: Vec<Region> = Vec::new();

    for point in &arena {
        let col = point.x / marking.width;
        let row = point.y / marking.height;
        let cell = row as usize * cols + col as usize;
        match owner[cell] {
            Some(idx) => regions[idx].absorb(point),
            None => {
                let Some(rect) = Rect::new(
                    col * marking.width,
                    row * marking.height,
                    marking.width,
                    marking.height,
                )
                .clip(w, h) else {
                    continue;
                };
                owner[cell] = Some(regions.len());
                regions.push(Region::seed(rect, point));
            }
        }
    }

    regions.sort_by_key(|r| (r.rect.y, r.rect.x));
    Ok(regions)
}
