use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ring_align::augmentation::ProfileNoise;
use ring_align::*;

/// Non-smooth profile: independent uniform samples in `[0, 255)`.
fn random_profile(n: usize, seed: u64) -> AngularProfile {
    let mut rng = StdRng::seed_from_u64(seed);
    AngularProfile::new((0..n).map(|_| rng.gen_range(0.0..255.0)).collect())
}

fn std_dev(profile: &AngularProfile) -> f64 {
    profile.variance().sqrt()
}

#[test]
fn test_shift_identity() {
    let p = random_profile(360, 1);
    assert_eq!(p.circular_shift(0), p);
    assert_eq!(p.circular_shift(360), p);
    assert_eq!(p.circular_shift(720 + 5), p.circular_shift(5));
}

#[test]
fn test_self_alignment_both_methods() {
    let p = random_profile(360, 2);
    for method in [ScoringMethod::BruteForce, ScoringMethod::Fft] {
        let result = method.scorer().align(&p, &p, false).unwrap();
        assert_eq!(result.best_shift, 0, "{method}");
        assert!((result.best_score - 1.0).abs() < 1e-9, "{method}");
    }
}

#[test]
fn test_known_offset_recovered_for_every_shift() {
    let outer = random_profile(360, 3);
    for k in 0..360 {
        let inner = outer.circular_shift(k);
        let result = align(&inner, &outer).unwrap();
        assert_eq!(result.best_shift, k, "offset {k}");
        assert!(result.best_score > 0.999_999);
    }
}

#[test]
fn test_known_offset_brute_force_sample() {
    let outer = random_profile(360, 4);
    for k in [1, 47, 179, 180, 359] {
        let inner = outer.circular_shift(k);
        let result = BruteForceScorer.align(&inner, &outer, false).unwrap();
        assert_eq!(result.best_shift, k);
    }
}

#[test]
fn test_flat_profiles_are_degenerate_not_errors() {
    let flat = AngularProfile::new(vec![0.0; 360]);
    for method in [ScoringMethod::BruteForce, ScoringMethod::Fft] {
        let result = method.scorer().align(&flat, &flat, true).unwrap();
        assert_eq!(result.best_shift, 0);
        assert_eq!(result.best_score, 0.0);
        assert!(!result.is_aligned(0.6));
        assert!(result.score_curve.unwrap().iter().all(|s| *s == 0.0));
    }
}

#[test]
fn test_fft_matches_brute_force() {
    for (n, seed) in [(360, 10), (3600, 11), (997, 12)] {
        let inner = random_profile(n, seed);
        let outer = random_profile(n, seed + 100);
        let fft = FftScorer.align(&inner, &outer, true).unwrap();
        let brute = BruteForceScorer.align(&inner, &outer, true).unwrap();

        assert_eq!(fft.best_shift, brute.best_shift, "n={n}");
        assert!((fft.best_score - brute.best_score).abs() < 1e-6, "n={n}");
        let (fc, bc) = (fft.score_curve.unwrap(), brute.score_curve.unwrap());
        assert!(fc.iter().zip(&bc).all(|(a, b)| (a - b).abs() < 1e-6));
    }
}

#[test]
fn test_scores_stay_in_range() {
    let inner = random_profile(256, 20);
    let outer = random_profile(256, 21);
    let result = FftScorer.align(&inner, &outer, true).unwrap();
    assert!(result.score_curve.unwrap().iter().all(|s| (-1.0..=1.0).contains(s)));
}

#[test]
fn test_periodic_profile_tie_break_is_deterministic() {
    // Period of 60 samples: six shifts tie exactly.
    let base = random_profile(60, 30).into_samples();
    let outer = AngularProfile::new(base.iter().cycle().take(360).copied().collect());
    let inner = outer.circular_shift(200);

    for method in [ScoringMethod::BruteForce, ScoringMethod::Fft] {
        let result = method.scorer().align(&inner, &outer, false).unwrap();
        assert_eq!(result.best_shift, 20, "{method}");
    }
}

#[test]
fn test_noise_up_to_one_standard_deviation_keeps_shift() {
    let outer = random_profile(360, 40);
    let inner = outer.circular_shift(123);
    let sigma = std_dev(&outer);
    let noise = ProfileNoise::new(41);

    let mut previous = f64::INFINITY;
    for fraction in [0.0, 0.25, 0.5, 0.75, 1.0] {
        let noisy = noise.apply(&inner, fraction * sigma).unwrap();
        let result = align(&noisy, &outer).unwrap();
        assert_eq!(result.best_shift, 123, "noise at {fraction} sigma");
        assert!(result.best_score <= previous + 1e-12);
        previous = result.best_score;
    }
    assert!(previous > 0.6);
}

#[test]
fn test_length_mismatch() {
    let err = align(&random_profile(360, 1), &random_profile(180, 1)).unwrap_err();
    assert!(matches!(err, AlignError::ShapeMismatch { inner: 360, outer: 180 }));
}
