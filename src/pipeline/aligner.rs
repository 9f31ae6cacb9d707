//! Entry point tying sampling, sector comparison and scoring together.

use crate::algorithms::{sample_profile, AngularProfile, Circle, SectorComparator};
use crate::analysis::correction_degrees;
use crate::config::{AlignmentConfig, Strategy};
use crate::data::{load, Channel, Image};
use crate::logging::{self, AlignmentSpan};
use crate::pipeline::{AlignmentReport, ChannelReport, ProfileDiagnostics};
use crate::{AlignError, AlignmentResult};
use std::path::Path;

/// Solves ring captchas for one fixed configuration.
#[derive(Debug, Clone)]
pub struct RingAligner {
    config: AlignmentConfig,
}

impl RingAligner {
    pub fn new(config: AlignmentConfig) -> crate::Result<Self> {
        config
            .validate()
            .map_err(|errors| AlignError::InvalidConfig(errors.join("; ")))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Inner and outer sampling circles for `image`.
    pub fn circles(&self, image: &Image) -> (Circle, Circle) {
        let center = self.config.center.unwrap_or_else(|| image.center());
        (
            Circle::new(center, self.config.inner_radius()),
            Circle::new(center, self.config.outer_radius()),
        )
    }

    pub fn profiles(
        &self,
        image: &Image,
        channel: Channel,
    ) -> crate::Result<(AngularProfile, AngularProfile)> {
        let (inner, outer) = self.circles(image);
        let n = self.config.num_points;
        Ok((
            sample_profile(image, inner, n, channel)?,
            sample_profile(image, outer, n, channel)?,
        ))
    }

    /// Solve the image named by `image_path` in the configuration.
    pub fn solve_configured(&self) -> crate::Result<AlignmentReport> {
        let path = self
            .config
            .image_path
            .as_deref()
            .ok_or_else(|| AlignError::InvalidConfig("no image_path configured".into()))?;
        self.solve_path(path)
    }

    pub fn solve_path<P: AsRef<Path>>(&self, path: P) -> crate::Result<AlignmentReport> {
        let image = load(path.as_ref())?;
        tracing::debug!(
            path = %path.as_ref().display(),
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        self.solve(&image)
    }

    pub fn solve(&self, image: &Image) -> crate::Result<AlignmentReport> {
        let correlation_id = logging::new_correlation_id();
        let strategy = self.config.strategy;
        let span = AlignmentSpan::new(
            "solve",
            &strategy.to_string(),
            self.config.num_points,
            correlation_id,
        );
        let _enter = span.enter();

        let (result, sector_scores) = self.align_channel(image, self.config.channel, Some(&span))?;
        let aligned = result.is_aligned(self.config.similarity_threshold);
        let processing_time_ms = span.record_result(result.best_shift, result.best_score, aligned);
        let rotation_degrees = self.shift_to_degrees(result.best_shift);

        Ok(AlignmentReport {
            correlation_id,
            strategy,
            method: self.config.scoring_method(),
            channel: self.config.channel,
            num_points: self.config.num_points,
            best_shift: result.best_shift,
            best_score: result.best_score,
            aligned,
            similarity_threshold: self.config.similarity_threshold,
            rotation_degrees,
            correction_degrees: correction_degrees(rotation_degrees),
            processing_time_ms,
            score_curve: result.score_curve,
            sector_scores,
        })
    }

    /// Run the configured strategy once per channel.
    pub fn channel_report(&self, image: &Image) -> crate::Result<Vec<ChannelReport>> {
        Channel::ALL
            .iter()
            .map(|&channel| {
                let (result, _) = self.align_channel(image, channel, None)?;
                Ok(ChannelReport {
                    channel,
                    best_shift: result.best_shift,
                    best_score: result.best_score,
                    aligned: result.is_aligned(self.config.similarity_threshold),
                    rotation_degrees: self.shift_to_degrees(result.best_shift),
                })
            })
            .collect()
    }

    pub fn diagnostics(&self, image: &Image) -> crate::Result<ProfileDiagnostics> {
        let channel = self.config.channel;
        let (inner, outer) = self.profiles(image, channel)?;
        Ok(ProfileDiagnostics {
            channel,
            difference: inner.difference(&outer)?,
            inner_derivative: inner.derivative(),
            outer_derivative: outer.derivative(),
            inner_variance: inner.variance(),
            outer_variance: outer.variance(),
            inner,
            outer,
        })
    }

    pub fn shift_to_degrees(&self, shift: usize) -> f64 {
        shift as f64 * 360.0 / self.config.num_points as f64
    }

    fn align_channel(
        &self,
        image: &Image,
        channel: Channel,
        span: Option<&AlignmentSpan>,
    ) -> crate::Result<(AlignmentResult, Option<Vec<f64>>)> {
        let keep_curve = self.config.include_score_curve;

        match self.config.strategy {
            Strategy::Point => {
                let (inner, outer) = self.profiles(image, channel)?;
                if let Some(span) = span {
                    span.record_profile("inner", inner.mean(), inner.variance());
                    span.record_profile("outer", outer.mean(), outer.variance());
                }
                let result = self.config.method.scorer().align(&inner, &outer, keep_curve)?;
                Ok((result, None))
            }
            Strategy::Sector => {
                let (inner, outer) = self.circles(image);
                let comparator = SectorComparator::new(
                    inner.center,
                    inner.radius,
                    outer.radius,
                    self.config.sector_count,
                )?
                .with_channel(channel)
                .with_samples_per_degree(self.config.samples_per_degree);

                let result = comparator.sweep(image, self.config.num_points, keep_curve)?;
                let scores = comparator.compare_at(image, self.shift_to_degrees(result.best_shift));
                if let Some(span) = span {
                    span.record_sectors(&scores);
                }
                Ok((result, Some(scores)))
            }
        }
    }
}
