//! Visual regression comparison engine.
//!
//! Decides whether a candidate image matches a reference image under an
//! exact, color-fuzzy or block-fuzzy tolerance model, and renders where the
//! two differ.

pub mod compare;

pub use compare::{
    Algorithm, Comparison, ComparisonResult, CompareError, Mask, MarkerStyle, Marking, Rect,
    Region, compare,
};
