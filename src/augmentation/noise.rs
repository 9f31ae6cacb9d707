//! Seeded noise injection into angular profiles.
//!
//! The same seed always draws the same noise shape; the amplitude only
//! scales it. That keeps robustness sweeps comparable across amplitudes.

use crate::algorithms::{AngularProfile, ScoringMethod};
use crate::AlignError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    /// Uniform in `[-amplitude, amplitude]`.
    #[default]
    Uniform,
    /// Normal with standard deviation `amplitude`.
    Gaussian,
}

impl FromStr for NoiseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(NoiseKind::Uniform),
            "gaussian" | "normal" => Ok(NoiseKind::Gaussian),
            other => Err(format!("unknown noise kind '{other}', expected uniform or gaussian")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileNoise {
    seed: u64,
    kind: NoiseKind,
}

impl ProfileNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            kind: NoiseKind::Uniform,
        }
    }

    pub fn with_kind(mut self, kind: NoiseKind) -> Self {
        self.kind = kind;
        self
    }

    /// The unscaled noise vector for `len` samples.
    pub fn unit_noise(&self, len: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        match self.kind {
            NoiseKind::Uniform => (0..len).map(|_| rng.gen_range(-1.0..=1.0)).collect(),
            NoiseKind::Gaussian => (0..len)
                .map(|_| {
                    let v: f64 = StandardNormal.sample(&mut rng);
                    v
                })
                .collect(),
        }
    }

    /// Add noise of the given amplitude to every sample.
    pub fn apply(&self, profile: &AngularProfile, amplitude: f64) -> crate::Result<AngularProfile> {
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(AlignError::InvalidConfig(format!(
                "noise amplitude must be finite and non-negative, got {amplitude}"
            )));
        }

        let noisy = profile
            .samples()
            .iter()
            .zip(self.unit_noise(profile.len()))
            .map(|(v, n)| v + amplitude * n)
            .collect();
        Ok(AngularProfile::new(noisy))
    }
}

/// Outcome of aligning a noisy inner profile at one amplitude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoisePoint {
    pub amplitude: f64,
    pub best_shift: usize,
    pub best_score: f64,
}

/// Align `inner` perturbed at each amplitude against the clean `outer`.
pub fn noise_sweep(
    inner: &AngularProfile,
    outer: &AngularProfile,
    amplitudes: &[f64],
    noise: &ProfileNoise,
    method: ScoringMethod,
) -> crate::Result<Vec<NoisePoint>> {
    let scorer = method.scorer();
    amplitudes
        .iter()
        .map(|&amplitude| {
            let noisy = noise.apply(inner, amplitude)?;
            let result = scorer.align(&noisy, outer, false)?;
            tracing::debug!(
                amplitude,
                best_shift = result.best_shift,
                best_score = result.best_score,
                "Noise level scored"
            );
            Ok(NoisePoint {
                amplitude,
                best_shift: result.best_shift,
                best_score: result.best_score,
            })
        })
        .collect()
}
