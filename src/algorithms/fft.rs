use crate::algorithms::correlation::{normalized_score, ShiftScorer};
use crate::TIE_TOLERANCE;
use num_complex::Complex;
use rustfft::FftPlanner;

/// `O(N log N)` circular cross-correlation through the FFT.
///
/// Produces the same curve as [`crate::algorithms::BruteForceScorer`] up to
/// floating point rounding. Means and energies of a circularly shifted
/// signal do not change, so only the cross term depends on the shift.
pub struct FftScorer;

impl ShiftScorer for FftScorer {
    fn name(&self) -> &'static str {
        "fft"
    }

    /// Rounding in the transforms can split exact ties by ~1e-12.
    fn tie_tolerance(&self) -> f64 {
        TIE_TOLERANCE
    }

    fn score_curve(&self, inner: &[f64], outer: &[f64]) -> Vec<f64> {
        let n = inner.len();
        let (inner_centered, inner_energy) = center(inner);
        let (outer_centered, outer_energy) = center(outer);

        let cross = circular_cross_correlation(&inner_centered, &outer_centered);
        debug_assert_eq!(cross.len(), n);

        cross
            .into_iter()
            .map(|c| normalized_score(c, inner_energy, outer_energy))
            .collect()
    }
}

/// Subtract the mean; returns the centered signal and its energy.
fn center(signal: &[f64]) -> (Vec<f64>, f64) {
    let mean = signal.iter().sum::<f64>() / signal.len() as f64;
    let centered: Vec<f64> = signal.iter().map(|v| v - mean).collect();
    let energy = centered.iter().map(|v| v * v).sum();
    (centered, energy)
}

/// `c[s] = sum_j a[(j + s) mod N] * b[j]`, computed as `IFFT(A * conj(B)) / N`.
fn circular_cross_correlation(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len();
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut a_spec: Vec<Complex<f64>> = a.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let mut b_spec: Vec<Complex<f64>> = b.iter().map(|&v| Complex::new(v, 0.0)).collect();
    forward.process(&mut a_spec);
    forward.process(&mut b_spec);

    let mut product: Vec<Complex<f64>> = a_spec
        .iter()
        .zip(&b_spec)
        .map(|(x, y)| x * y.conj())
        .collect();
    inverse.process(&mut product);

    // rustfft leaves the inverse transform unnormalised.
    product.iter().map(|v| v.re / n as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{AngularProfile, BruteForceScorer};

    fn pseudo_random(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                (state >> 56) as f64
            })
            .collect()
    }

    #[test]
    fn test_cross_correlation_matches_definition() {
        let a = [1.0, 2.0, 0.0, -1.0, 3.0];
        let b = [0.5, -2.0, 1.0, 4.0, 0.0];
        let c = circular_cross_correlation(&a, &b);
        for s in 0..5 {
            let expected: f64 = (0..5).map(|j| a[(j + s) % 5] * b[j]).sum();
            assert!((c[s] - expected).abs() < 1e-9, "shift {s}");
        }
    }

    #[test]
    fn test_curve_agrees_with_brute_force() {
        for &n in &[7usize, 360, 1000] {
            let inner = pseudo_random(n, 3);
            let outer = pseudo_random(n, 11);
            let fft = FftScorer.score_curve(&inner, &outer);
            let brute = BruteForceScorer.score_curve(&inner, &outer);
            for (s, (f, b)) in fft.iter().zip(&brute).enumerate() {
                assert!((f - b).abs() < 1e-9, "n={n} shift={s}: {f} vs {b}");
            }
        }
    }

    #[test]
    fn test_known_offset_large_n() {
        let outer = AngularProfile::new(pseudo_random(3600, 42));
        let inner = outer.circular_shift(1234);
        let result = FftScorer.align(&inner, &outer, false).unwrap();
        assert_eq!(result.best_shift, 1234);
        assert!((result.best_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_profile_is_zero_not_nan() {
        let flat = AngularProfile::new(vec![3.0; 64]);
        let other = AngularProfile::new(pseudo_random(64, 1));
        let result = FftScorer.align(&other, &flat, true).unwrap();
        assert!(result.score_curve.unwrap().iter().all(|&s| s == 0.0));
        assert_eq!(result.best_shift, 0);
    }
}
