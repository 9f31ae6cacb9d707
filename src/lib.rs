pub mod algorithms;
pub mod analysis;
pub mod augmentation;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use algorithms::*;
pub use analysis::*;
pub use data::*;
pub use error::AlignError;
pub use pipeline::*;

/// Outcome of a circular shift search between two angular signals.
///
/// `best_shift` counts samples (or rotation hypotheses for the sector
/// strategy) in the clockwise direction, see [`algorithms::correlation`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AlignmentResult {
    pub best_shift: usize,
    pub best_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_curve: Option<Vec<f64>>,
}

impl AlignmentResult {
    /// Pick the argmax of a per-shift score curve.
    ///
    /// Exact ties go to the smallest shift. An empty curve yields shift `0`
    /// with score `0`.
    pub fn from_curve(curve: Vec<f64>, keep_curve: bool) -> Self {
        Self::from_curve_with_tolerance(curve, keep_curve, 0.0)
    }

    /// Like [`AlignmentResult::from_curve`], but scores within `tolerance` of
    /// the maximum also count as ties.
    pub fn from_curve_with_tolerance(curve: Vec<f64>, keep_curve: bool, tolerance: f64) -> Self {
        let max = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let best_shift = curve
            .iter()
            .position(|&score| score >= max - tolerance)
            .unwrap_or(0);
        let best_score = curve.get(best_shift).copied().unwrap_or(0.0);

        Self {
            best_shift,
            best_score,
            score_curve: keep_curve.then_some(curve),
        }
    }

    /// `true` when the best score clears the caller's threshold.
    pub fn is_aligned(&self, similarity_threshold: f64) -> bool {
        self.best_score > similarity_threshold
    }
}

/// Rounding slack of FFT-computed curves, under which two shifts tie.
pub const TIE_TOLERANCE: f64 = 1e-9;

pub type Result<T> = std::result::Result<T, AlignError>;
