//! Batch scoring of rendered fixtures with known rotations.

use crate::analysis::{angular_error_degrees, SweepSummary};
use crate::data::{list_fixtures, load, Image};
use crate::logging::SweepSpan;
use crate::pipeline::{RingAligner, SweepItem, SweepReport};
use chrono::Utc;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default tolerance for counting a fixture as recovered.
pub const DEFAULT_TOLERANCE_DEGREES: f64 = 1.0;

/// Scores every fixture with one aligner and compares against ground truth.
///
/// Fixtures are independent, so they are solved in parallel; the report
/// lists them in ascending angle order regardless.
pub struct FixtureSweep {
    aligner: RingAligner,
    tolerance_degrees: f64,
}

impl FixtureSweep {
    pub fn new(aligner: RingAligner) -> Self {
        Self {
            aligner,
            tolerance_degrees: DEFAULT_TOLERANCE_DEGREES,
        }
    }

    pub fn with_tolerance(mut self, tolerance_degrees: f64) -> Self {
        self.tolerance_degrees = tolerance_degrees.abs();
        self
    }

    /// Score in-memory fixtures, e.g. straight from `RotationRenderer::generate`.
    pub fn run<I>(&self, fixtures: I) -> crate::Result<SweepReport>
    where
        I: IntoIterator<Item = (u32, Image)>,
    {
        let fixtures: Vec<(u32, Option<PathBuf>, Image)> =
            fixtures.into_iter().map(|(angle, image)| (angle, None, image)).collect();
        self.score(fixtures)
    }

    /// Score every `rotated_NNNdeg` image in `dir`.
    pub fn run_dir<P: AsRef<Path>>(&self, dir: P) -> crate::Result<SweepReport> {
        let listed = list_fixtures(dir.as_ref())?;
        tracing::info!(dir = %dir.as_ref().display(), fixtures = listed.len(), "Loading fixtures");

        let fixtures = listed
            .into_par_iter()
            .map(|(angle, path)| {
                let image = load(&path)?;
                Ok((angle, Some(path), image))
            })
            .collect::<crate::Result<Vec<_>>>()?;
        self.score(fixtures)
    }

    fn score(
        &self,
        mut fixtures: Vec<(u32, Option<PathBuf>, Image)>,
    ) -> crate::Result<SweepReport> {
        fixtures.sort_by_key(|(angle, _, _)| *angle);
        let run_id = Uuid::new_v4();
        let span = SweepSpan::new(fixtures.len(), run_id);
        let _enter = span.enter();

        let items = fixtures
            .into_par_iter()
            .map(|(angle, file, image)| {
                let report = self.aligner.solve(&image)?;
                let error_degrees = angular_error_degrees(report.rotation_degrees, angle as f64);
                span.record_item(angle, report.best_shift, error_degrees);
                Ok(SweepItem {
                    angle,
                    file,
                    best_shift: report.best_shift,
                    best_score: report.best_score,
                    aligned: report.aligned,
                    rotation_degrees: report.rotation_degrees,
                    error_degrees,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let summary = SweepSummary::from_items(
            items.iter().map(|i| (i.error_degrees, i.best_score, i.aligned)),
            self.tolerance_degrees,
        );
        let processing_time_ms = span.record_completion(summary.total, summary.hits);
        let config = self.aligner.config();

        Ok(SweepReport {
            run_id,
            timestamp: Utc::now(),
            strategy: config.strategy,
            method: config.scoring_method(),
            tolerance_degrees: self.tolerance_degrees,
            items,
            summary,
            processing_time_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignmentConfig;
    use crate::data::RotationRenderer;
    use image::{GrayImage, Luma};

    fn source() -> Image {
        Image::from_gray(GrayImage::from_fn(161, 161, |x, y| {
            let phi = (y as f64 - 80.0).atan2(x as f64 - 80.0);
            let v = 120.0 + 60.0 * (phi + 0.3).cos() + 30.0 * (2.0 * phi).sin();
            Luma([v.round() as u8])
        }))
    }

    #[test]
    fn test_in_memory_sweep_recovers_angles() {
        let source = source();
        let renderer = RotationRenderer::new(&source, 35).unwrap();
        let aligner = RingAligner::new(AlignmentConfig::builder(70, 150).build().unwrap()).unwrap();

        let report = FixtureSweep::new(aligner).run(renderer.generate(60).unwrap()).unwrap();

        assert_eq!(report.items.len(), 6);
        let angles: Vec<u32> = report.items.iter().map(|i| i.angle).collect();
        assert_eq!(angles, vec![0, 60, 120, 180, 240, 300]);
        assert_eq!(report.summary.hits, 6);
        assert_eq!(report.summary.max_error_degrees, 0.0);
    }

    #[test]
    fn test_empty_sweep() {
        let aligner = RingAligner::new(AlignmentConfig::default()).unwrap();
        let report = FixtureSweep::new(aligner).run(Vec::new()).unwrap();
        assert_eq!(report.summary.total, 0);
        assert!(report.items.is_empty());
    }
}
