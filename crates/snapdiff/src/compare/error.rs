use thiserror::Error;

/// Configuration and alignment failures. A comparison that returns one of
/// these produced no verdict.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompareError {
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("block size must be greater than 0")]
    InvalidBlockSize,

    #[error("marking size must be greater than 0, got {width}x{height}")]
    InvalidMarker { width: u32, height: u32 },

    #[error("mask rectangle at ({x}, {y}) has an empty size {width}x{height}")]
    InvalidMaskRect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("{which} image is empty ({width}x{height})")]
    EmptyImage {
        which: &'static str,
        width: u32,
        height: u32,
    },

    #[error(
        "mask {mask_w}x{mask_h} covers neither the reference ({ref_w}x{ref_h}) \
         nor the candidate ({cand_w}x{cand_h})"
    )]
    MaskMismatch {
        mask_w: u32,
        mask_h: u32,
        ref_w: u32,
        ref_h: u32,
        cand_w: u32,
        cand_h: u32,
    },
}
