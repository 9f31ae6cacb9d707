//! Circular shift search with normalised cross-correlation.
//!
//! For a shift `s` the score is the Pearson correlation between the outer
//! profile shifted by `s` and the inner profile:
//!
//! ```text
//! score(s) = pearson(circular_shift(outer, s), inner)
//! ```
//!
//! Since sample indices grow clockwise, `best_shift` is the number of samples
//! the inner disk has been turned clockwise relative to the outer ring. The
//! correcting rotation is `-best_shift`.

use crate::algorithms::profile::{circular_shift, AngularProfile};
use crate::{AlignError, AlignmentResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Centered energy below which a signal is treated as flat.
pub const FLAT_ENERGY: f64 = 1e-12;

/// A strategy for computing the per-shift score curve.
///
/// Implementations must agree with the brute-force definition; they may only
/// differ in cost.
pub trait ShiftScorer: Send + Sync {
    /// Returns the name of the scorer
    fn name(&self) -> &'static str;

    /// Score every shift in `[0, N)`. Inputs have equal, non-zero length.
    fn score_curve(&self, inner: &[f64], outer: &[f64]) -> Vec<f64>;

    /// Score gap under which two shifts count as tied. Exact scorers use 0.
    fn tie_tolerance(&self) -> f64 {
        0.0
    }

    /// Search all circular shifts and keep the best one.
    fn align(
        &self,
        inner: &AngularProfile,
        outer: &AngularProfile,
        keep_curve: bool,
    ) -> crate::Result<AlignmentResult> {
        if inner.len() != outer.len() {
            return Err(AlignError::ShapeMismatch {
                inner: inner.len(),
                outer: outer.len(),
            });
        }
        if inner.is_empty() {
            return Ok(AlignmentResult::from_curve(Vec::new(), keep_curve));
        }

        let curve = self.score_curve(inner.samples(), outer.samples());
        Ok(AlignmentResult::from_curve_with_tolerance(
            curve,
            keep_curve,
            self.tie_tolerance(),
        ))
    }
}

/// Reference `O(N^2)` search evaluating the Pearson score for every shift.
pub struct BruteForceScorer;

impl ShiftScorer for BruteForceScorer {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn score_curve(&self, inner: &[f64], outer: &[f64]) -> Vec<f64> {
        // Shifts are independent; selection happens afterwards in one pass.
        (0..inner.len())
            .into_par_iter()
            .map(|shift| pearson(&circular_shift(outer, shift), inner))
            .collect()
    }
}

/// Zero-mean normalised cross-correlation of two equal-length signals.
///
/// Returns `0` when either signal is flat (or the lengths differ), never NaN.
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let (mut cross, mut energy_a, mut energy_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cross += dx * dy;
        energy_a += dx * dx;
        energy_b += dy * dy;
    }
    normalized_score(cross, energy_a, energy_b)
}

/// Normalise a centered cross term by the two centered energies.
pub(crate) fn normalized_score(cross: f64, energy_a: f64, energy_b: f64) -> f64 {
    if energy_a <= FLAT_ENERGY || energy_b <= FLAT_ENERGY {
        return 0.0;
    }
    let score = cross / (energy_a * energy_b).sqrt();
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// How the shift search is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringMethod {
    BruteForce,
    #[default]
    Fft,
}

impl ScoringMethod {
    pub fn scorer(self) -> Box<dyn ShiftScorer> {
        match self {
            ScoringMethod::BruteForce => Box::new(BruteForceScorer),
            ScoringMethod::Fft => Box::new(crate::algorithms::FftScorer),
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMethod::BruteForce => f.write_str("brute-force"),
            ScoringMethod::Fft => f.write_str("fft"),
        }
    }
}

impl FromStr for ScoringMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brute-force" | "brute" | "bruteforce" => Ok(ScoringMethod::BruteForce),
            "fft" => Ok(ScoringMethod::Fft),
            other => Err(format!("unknown scoring method '{other}', expected brute-force or fft")),
        }
    }
}

/// Align two profiles with the default (FFT) scorer, without the score curve.
pub fn align(inner: &AngularProfile, outer: &AngularProfile) -> crate::Result<AlignmentResult> {
    ScoringMethod::default().scorer().align(inner, outer, false)
}
