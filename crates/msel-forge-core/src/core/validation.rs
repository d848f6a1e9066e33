// crates/msel-forge-core/src/core/validation.rs
// ============================================================================
// Module: MSEL Forge Validation Verdicts
// Description: Critic verdicts, issue kinds, and per-inject quality metrics.
// Purpose: Capture accept/reject decisions and observability scores.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every draft inject receives a [`ValidationResult`]. Rejections carry the
//! issue kinds that caused them; warnings pass through without blocking.
//! Quality metrics are observability only and never influence the
//! accept/reject decision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Issue Kinds
// ============================================================================

/// Kind of defect found by the critic pipeline.
///
/// # Invariants
/// - Variants are stable for serialization and audit matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueKind {
    /// Malformed structure or field contents.
    Schema,
    /// Illegal phase transition.
    Fsm,
    /// Unknown asset referenced by the draft.
    State,
    /// Time offset regresses behind the accepted timeline.
    Temporal,
    /// Impossible technique sequencing.
    Causal,
    /// Language-model verdict flagged a logical defect.
    Logical,
    /// Compliance requirement gap.
    Compliance,
    /// Validator backend was unavailable.
    Validator,
}

impl ValidationIssueKind {
    /// Returns the wire label used in error strings and trace records.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Fsm => "fsm",
            Self::State => "state",
            Self::Temporal => "temporal",
            Self::Causal => "causal",
            Self::Logical => "logical",
            Self::Compliance => "compliance",
            Self::Validator => "validator",
        }
    }
}

impl fmt::Display for ValidationIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One defect or observation recorded by the critic.
///
/// # Invariants
/// - `message` is stable enough to be matched by refinement prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Defect kind.
    pub kind: ValidationIssueKind,
    /// Human-readable defect description.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue of the given kind.
    #[must_use]
    pub fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

// ============================================================================
// SECTION: Validation Result
// ============================================================================

/// Critic verdict for one draft inject.
///
/// # Invariants
/// - `is_valid` is false if and only if `errors` is non-empty.
/// - `metrics` is observability only and never drives the verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Overall accept/reject decision.
    pub is_valid: bool,
    /// Logical-consistency verdict from the model-assisted check.
    pub logical_consistency: bool,
    /// Compliance verdict (quality signal, never a hard gate).
    pub compliance_ok: bool,
    /// Causal-validity verdict.
    pub causal_validity: bool,
    /// Blocking defects.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking observations.
    pub warnings: Vec<ValidationIssue>,
    /// Optional per-inject quality metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ValidationMetrics>,
}

impl ValidationResult {
    /// Creates an unconditional acceptance with no checks recorded.
    ///
    /// Used only by legacy mode for A/B measurement.
    #[must_use]
    pub const fn accept_unchecked() -> Self {
        Self {
            is_valid: true,
            logical_consistency: true,
            compliance_ok: true,
            causal_validity: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            metrics: None,
        }
    }
}

// ============================================================================
// SECTION: Quality Metrics
// ============================================================================

/// Weights applied to the component scores of the overall quality score.
///
/// # Invariants
/// - Weights are expected to sum to 1.0; callers own that property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticWeights {
    /// Weight of the logical-consistency score.
    pub logic: f64,
    /// Weight of the causal-validity score.
    pub causal: f64,
    /// Weight of the compliance score.
    pub compliance: f64,
    /// Weight of the temporal-consistency score.
    pub temporal: f64,
    /// Weight of the asset-consistency score.
    pub asset: f64,
}

impl Default for CriticWeights {
    fn default() -> Self {
        Self {
            logic: 0.30,
            causal: 0.25,
            compliance: 0.15,
            temporal: 0.15,
            asset: 0.15,
        }
    }
}

/// Per-inject quality scores in `[0, 1]` plus aggregate statistics.
///
/// # Invariants
/// - `overall_quality_score` is the weighted sum of the component scores.
/// - `confidence_interval` and `p_value` are present once at least two prior
///   scores exist for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Logical-consistency score.
    pub logical_consistency_score: f64,
    /// Causal-validity score.
    pub causal_validity_score: f64,
    /// Compliance score.
    pub compliance_score: f64,
    /// Temporal-consistency score.
    pub temporal_consistency_score: f64,
    /// Asset-consistency score.
    pub asset_consistency_score: f64,
    /// Weighted overall quality score.
    pub overall_quality_score: f64,
    /// 95% confidence interval over the run's overall scores, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<(f64, f64)>,
    /// Two-sided p-value against the reference mean, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

/// Reference mean used for the significance test over quality scores.
pub const REFERENCE_QUALITY_MEAN: f64 = 0.7;

// ============================================================================
// SECTION: Score Statistics
// ============================================================================

/// Running statistics over a run's overall quality scores.
///
/// # Invariants
/// - Interval and p-value helpers return `None` below two samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreStats {
    /// Observed overall scores in acceptance order.
    samples: Vec<f64>,
}

impl ScoreStats {
    /// Creates empty statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Records one overall quality score.
    pub fn record(&mut self, score: f64) {
        self.samples.push(score);
    }

    /// Returns the number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when no samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the sample mean, when any samples exist.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss, reason = "Sample counts stay far below 2^52.")]
        let count = self.samples.len() as f64;
        Some(self.samples.iter().sum::<f64>() / count)
    }

    /// Returns the sample standard deviation, when at least two samples exist.
    #[must_use]
    pub fn stddev(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        #[allow(clippy::cast_precision_loss, reason = "Sample counts stay far below 2^52.")]
        let divisor = (self.samples.len() - 1) as f64;
        let variance =
            self.samples.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / divisor;
        Some(variance.sqrt())
    }

    /// Returns the normal-approximation 95% confidence interval over the mean.
    #[must_use]
    pub fn confidence_interval(&self) -> Option<(f64, f64)> {
        let mean = self.mean()?;
        let stddev = self.stddev()?;
        #[allow(clippy::cast_precision_loss, reason = "Sample counts stay far below 2^52.")]
        let count = self.samples.len() as f64;
        let margin = 1.96 * stddev / count.sqrt();
        Some((mean - margin, mean + margin))
    }

    /// Returns the two-sided p-value against `reference` under a normal
    /// approximation, when at least two samples exist.
    #[must_use]
    pub fn p_value_against(&self, reference: f64) -> Option<f64> {
        let mean = self.mean()?;
        let stddev = self.stddev()?;
        if stddev == 0.0 {
            return Some(if (mean - reference).abs() < f64::EPSILON { 1.0 } else { 0.0 });
        }
        #[allow(clippy::cast_precision_loss, reason = "Sample counts stay far below 2^52.")]
        let count = self.samples.len() as f64;
        let z = (mean - reference) / (stddev / count.sqrt());
        Some((2.0 * (1.0 - standard_normal_cdf(z.abs()))).clamp(0.0, 1.0))
    }
}

/// Standard normal cumulative distribution via the Abramowitz-Stegun
/// polynomial approximation of the error function.
fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Error-function approximation with absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}
