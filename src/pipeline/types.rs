use crate::algorithms::{AngularProfile, ScoringMethod};
use crate::analysis::SweepSummary;
use crate::config::Strategy;
use crate::data::Channel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Complete outcome of one solve, ready for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub correlation_id: Uuid,
    pub strategy: Strategy,
    /// Shift scorer, absent for the sector strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ScoringMethod>,
    pub channel: Channel,
    pub num_points: usize,

    /// Clockwise offset of the disk, in samples (or hypotheses).
    pub best_shift: usize,
    pub best_score: f64,
    pub aligned: bool,
    pub similarity_threshold: f64,

    /// `best_shift` expressed in degrees, in `[0, 360)`.
    pub rotation_degrees: f64,

    /// Rotation that realigns the disk, in `(-180, 180]`.
    pub correction_degrees: f64,

    pub processing_time_ms: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_curve: Option<Vec<f64>>,

    /// Per-sector similarity at the chosen rotation (sector strategy only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_scores: Option<Vec<f64>>,
}

/// Result of running the configured strategy on a single channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelReport {
    pub channel: Channel,
    pub best_shift: usize,
    pub best_score: f64,
    pub aligned: bool,
    pub rotation_degrees: f64,
}

/// Raw profiles plus the derived curves used when inspecting a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDiagnostics {
    pub channel: Channel,
    pub inner: AngularProfile,
    pub outer: AngularProfile,
    /// `inner - outer`, sample by sample.
    pub difference: Vec<f64>,
    pub inner_derivative: Vec<f64>,
    pub outer_derivative: Vec<f64>,
    pub inner_variance: f64,
    pub outer_variance: f64,
}

/// One fixture of a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepItem {
    /// Ground-truth rotation the fixture was rendered with.
    pub angle: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    pub best_shift: usize,
    pub best_score: f64,
    pub aligned: bool,
    pub rotation_degrees: f64,
    pub error_degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ScoringMethod>,
    pub tolerance_degrees: f64,
    pub items: Vec<SweepItem>,
    pub summary: SweepSummary,
    pub processing_time_ms: f64,
}
