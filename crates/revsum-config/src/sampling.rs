//! Sampling parameters handed to downstream notebooks.
//!
//! Only the contract lives here; the actual ranking and sampling happen in
//! the consumers.

use serde::Serialize;

/// Resolved sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sampling {
    /// Cap on the number of ranked items considered. Always > 0.
    pub top_book_count: u32,

    /// Sampling ratio in (0, 1], or `None` for no sampling.
    pub fraction: Option<f64>,
}

impl Sampling {
    /// Whether a downstream sampling step should run at all.
    pub fn is_enabled(&self) -> bool {
        self.fraction.is_some()
    }
}
