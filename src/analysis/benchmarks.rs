use crate::algorithms::{AngularProfile, ScoringMethod};
use instant::Instant;
use serde::{Deserialize, Serialize};

/// Timing of one scoring method on a profile pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodTiming {
    pub method: ScoringMethod,
    pub best_shift: usize,
    pub best_score: f64,
    pub mean_time_ms: f64,
}

/// Brute force and FFT side by side on the same inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodComparison {
    pub num_points: usize,
    pub repetitions: usize,
    pub timings: Vec<MethodTiming>,
    pub shifts_agree: bool,
    /// Largest per-shift score difference between the two curves.
    pub max_score_difference: f64,
}

pub struct BenchmarkRunner {
    pub methods: Vec<ScoringMethod>,
    pub repetitions: usize,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRunner {
    pub fn new() -> Self {
        Self {
            methods: vec![ScoringMethod::BruteForce, ScoringMethod::Fft],
            repetitions: 5,
        }
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions.max(1);
        self
    }

    pub fn run(
        &self,
        inner: &AngularProfile,
        outer: &AngularProfile,
    ) -> crate::Result<MethodComparison> {
        let mut timings = Vec::with_capacity(self.methods.len());
        let mut curves = Vec::with_capacity(self.methods.len());

        for &method in &self.methods {
            let scorer = method.scorer();
            let start = Instant::now();
            let mut result = scorer.align(inner, outer, true)?;
            for _ in 1..self.repetitions {
                result = scorer.align(inner, outer, true)?;
            }
            let mean_time_ms = start.elapsed().as_secs_f64() * 1000.0 / self.repetitions as f64;

            tracing::debug!(%method, mean_time_ms, best_shift = result.best_shift, "Method timed");
            curves.push(result.score_curve.take().unwrap_or_default());
            timings.push(MethodTiming {
                method,
                best_shift: result.best_shift,
                best_score: result.best_score,
                mean_time_ms,
            });
        }

        let shifts_agree = timings.windows(2).all(|w| w[0].best_shift == w[1].best_shift);
        let max_score_difference = curves
            .windows(2)
            .flat_map(|w| w[0].iter().zip(&w[1]).map(|(a, b)| (a - b).abs()))
            .fold(0.0, f64::max);

        Ok(MethodComparison {
            num_points: inner.len(),
            repetitions: self.repetitions,
            timings,
            shifts_agree,
            max_score_difference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_agree() {
        let outer = AngularProfile::new((0..360).map(|i| ((i * 131 + 7) % 211) as f64).collect());
        let inner = outer.circular_shift(47);
        let comparison = BenchmarkRunner::new().with_repetitions(2).run(&inner, &outer).unwrap();

        assert_eq!(comparison.timings.len(), 2);
        assert!(comparison.shifts_agree);
        assert!(comparison.max_score_difference < 1e-6);
        assert!(comparison.timings.iter().all(|t| t.best_shift == 47));
    }

    #[test]
    fn test_mismatched_lengths_fail() {
        let a = AngularProfile::new(vec![1.0, 2.0, 3.0]);
        let b = AngularProfile::new(vec![1.0, 2.0]);
        assert!(BenchmarkRunner::new().run(&a, &b).is_err());
    }
}
