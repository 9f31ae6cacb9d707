use serde::{Deserialize, Serialize};

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rotation that undoes a clockwise disk offset of `rotation_degrees`.
pub fn correction_degrees(rotation_degrees: f64) -> f64 {
    normalize_degrees(-rotation_degrees)
}

/// Smallest absolute angle between two directions, in `[0, 180]`.
pub fn angular_error_degrees(measured: f64, expected: f64) -> f64 {
    normalize_degrees(measured - expected).abs()
}

/// Aggregate statistics of a fixture sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub total: usize,
    /// Fixtures whose recovered angle is within tolerance.
    pub hits: usize,
    pub hit_rate: f64,
    pub aligned: usize,
    pub mean_error_degrees: f64,
    pub max_error_degrees: f64,
    pub mean_score: f64,
}

impl SweepSummary {
    /// Summarise `(error_degrees, best_score, aligned)` triples.
    pub fn from_items<I>(items: I, tolerance_degrees: f64) -> Self
    where
        I: IntoIterator<Item = (f64, f64, bool)>,
    {
        let mut summary = SweepSummary::default();
        let mut error_sum = 0.0;
        let mut score_sum = 0.0;

        for (error, score, aligned) in items {
            summary.total += 1;
            if error <= tolerance_degrees {
                summary.hits += 1;
            }
            if aligned {
                summary.aligned += 1;
            }
            error_sum += error;
            score_sum += score;
            summary.max_error_degrees = summary.max_error_degrees.max(error);
        }

        if summary.total > 0 {
            let n = summary.total as f64;
            summary.hit_rate = summary.hits as f64 / n;
            summary.mean_error_degrees = error_sum / n;
            summary.mean_score = score_sum / n;
        }
        summary
    }
}
