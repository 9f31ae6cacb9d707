//! Structured spans for solve and sweep runs.

use std::time::Instant;
use tracing::{field, span, Level, Span};
use uuid::Uuid;

/// Span covering one alignment run.
///
/// Result fields are declared empty at creation and filled in by the
/// `record_*` methods, so they appear on the span in JSON output.
pub struct AlignmentSpan {
    span: Span,
    start_time: Instant,
}

impl AlignmentSpan {
    pub fn new(operation: &str, strategy: &str, num_points: usize, correlation_id: Uuid) -> Self {
        let span = span!(
            Level::INFO,
            "alignment",
            operation = operation,
            strategy = strategy,
            num_points = num_points,
            correlation_id = %correlation_id,
            best_shift = field::Empty,
            best_score = field::Empty,
            aligned = field::Empty,
            execution_time_ms = field::Empty
        );

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    /// Record the profile statistics of one sampled circle.
    pub fn record_profile(&self, ring: &str, mean: f64, variance: f64) {
        tracing::debug!(parent: &self.span, ring, mean, variance, "Profile sampled");
    }

    pub fn record_sectors(&self, scores: &[f64]) {
        tracing::debug!(parent: &self.span, sector_scores = ?scores, "Sector scores computed");
    }

    /// Record the final decision and return the elapsed time in milliseconds.
    pub fn record_result(&self, best_shift: usize, best_score: f64, aligned: bool) -> f64 {
        let elapsed_ms = self.elapsed_ms();
        self.span.record("best_shift", best_shift);
        self.span.record("best_score", best_score);
        self.span.record("aligned", aligned);
        self.span.record("execution_time_ms", elapsed_ms);

        tracing::info!(
            parent: &self.span,
            best_shift,
            best_score,
            aligned,
            execution_time_ms = elapsed_ms,
            "Alignment completed"
        );
        elapsed_ms
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

/// Span covering a batch of fixtures.
pub struct SweepSpan {
    span: Span,
    start_time: Instant,
}

impl SweepSpan {
    pub fn new(fixtures: usize, run_id: Uuid) -> Self {
        let span = span!(
            Level::INFO,
            "fixture_sweep",
            fixtures = fixtures,
            run_id = %run_id,
            hits = field::Empty
        );
        Self {
            span,
            start_time: Instant::now(),
        }
    }

    pub fn record_item(&self, angle: u32, best_shift: usize, error_degrees: f64) {
        tracing::debug!(parent: &self.span, angle, best_shift, error_degrees, "Fixture scored");
    }

    pub fn record_completion(&self, total: usize, hits: usize) -> f64 {
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        self.span.record("hits", hits);
        tracing::info!(parent: &self.span, total, hits, elapsed_ms, "Fixture sweep completed");
        elapsed_ms
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_span_without_subscriber() {
        let span = AlignmentSpan::new("solve", "point", 360, Uuid::new_v4());
        let _guard = span.enter();
        span.record_profile("inner", 120.0, 15.0);
        let elapsed = span.record_result(47, 0.93, true);
        assert!(elapsed >= 0.0);
        assert!(span.elapsed_ms() >= elapsed);
    }

    #[test]
    fn test_sweep_span_records_completion() {
        let span = SweepSpan::new(3, Uuid::new_v4());
        span.record_item(30, 30, 0.0);
        assert!(span.record_completion(3, 3) >= 0.0);
    }
}
