pub mod terminal;

/// Outcome of one reference/candidate pair.
pub enum Verdict {
    Pass,
    Fail {
        differences: usize,
        regions: usize,
        /// `Some((ref_w, ref_h, cand_w, cand_h))` when the sizes differ.
        dimension_mismatch: Option<(u32, u32, u32, u32)>,
    },
    /// Candidate without a reference.
    Missing,
    Error(String),
}
