//! Criterion scoring for pose accuracy.
//!
//! Each evaluator turns landmark geometry into bounded 0-100 scores; the
//! combiner merges them into one overall accuracy with feedback.

/// Joint angle measurement and angle-deviation scoring
pub mod angle;

/// Landmark proximity (contact) scoring
pub mod connection;

/// Whole-pose comparison against reference landmarks
pub mod position;

/// Criteria-free scoring directly against a reference pose
pub mod reference_comparison;

/// Weighted combination of sub-scores
pub mod combiner;

/// Human-readable feedback messages
pub mod feedback;

use crate::constants::{EXCELLENT_THRESHOLD, GOOD_THRESHOLD, NEEDS_IMPROVEMENT_THRESHOLD};
use crate::landmark::LandmarkName;
use serde::{Deserialize, Serialize};

/// Common view over authored criteria
pub trait Criterion {
    /// Display name of the criterion
    fn name(&self) -> &str;

    /// Landmarks the criterion reads
    fn landmarks(&self) -> Vec<LandmarkName>;

    /// Relative importance, strictly positive
    fn weight(&self) -> f64;
}

/// Quality bucket for a criterion score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    Excellent,
    Good,
    NeedsImprovement,
    Poor,
    NotDetected,
    NotVisible,
}

impl ScoreStatus {
    /// Bucket a measured score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            Self::Excellent
        } else if score >= GOOD_THRESHOLD {
            Self::Good
        } else if score >= NEEDS_IMPROVEMENT_THRESHOLD {
            Self::NeedsImprovement
        } else {
            Self::Poor
        }
    }

    /// Short marker used in feedback lines
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Excellent => "✓",
            Self::Good => "○",
            Self::NeedsImprovement => "△",
            Self::Poor => "✗",
            Self::NotDetected | Self::NotVisible => "?",
        }
    }

    /// Whether the criterion was actually measured
    #[must_use]
    pub const fn is_measured(self) -> bool {
        !matches!(self, Self::NotDetected | Self::NotVisible)
    }
}

/// What kind of criterion produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    Angle,
    Connection,
}

/// Outcome of evaluating one criterion.
///
/// For angles `target`/`actual` are degrees; for connections `target` is the
/// maximum distance and `actual` the measured distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Criterion type
    pub kind: CriterionKind,
    /// Criterion name from the catalog
    pub name: String,
    /// Landmarks the criterion was measured on
    pub points: Vec<LandmarkName>,
    /// Authored target value
    pub target: f64,
    /// Measured value, absent when the criterion could not be measured
    pub actual: Option<f64>,
    /// Distance of the measurement from the ideal
    pub deviation: Option<f64>,
    /// Score in 0-100
    pub score: f64,
    /// Quality bucket
    pub status: ScoreStatus,
    /// Authored weight
    pub weight: f64,
    /// Set when some landmark was below the evaluator's visibility floor
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub low_visibility: bool,
    /// Diagnostic for unmeasured or degraded criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Weighted mean of scores, `None` when the total weight is zero
#[must_use]
pub fn weighted_mean(scores: &[CriterionScore]) -> Option<f64> {
    let (weighted, total_weight) = scores
        .iter()
        .fold((0.0, 0.0), |(sum, weight), s| (sum + s.score * s.weight, weight + s.weight));

    if total_weight > 0.0 {
        Some(weighted / total_weight)
    } else {
        None
    }
}

/// Round to a number of decimal places for presentation
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(value: f64, weight: f64) -> CriterionScore {
        CriterionScore {
            kind: CriterionKind::Angle,
            name: "test".to_string(),
            points: vec![],
            target: 90.0,
            actual: Some(90.0),
            deviation: Some(0.0),
            score: value,
            status: ScoreStatus::from_score(value),
            weight,
            low_visibility: false,
            message: None,
        }
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(ScoreStatus::from_score(100.0), ScoreStatus::Excellent);
        assert_eq!(ScoreStatus::from_score(85.0), ScoreStatus::Excellent);
        assert_eq!(ScoreStatus::from_score(84.99), ScoreStatus::Good);
        assert_eq!(ScoreStatus::from_score(70.0), ScoreStatus::Good);
        assert_eq!(ScoreStatus::from_score(50.0), ScoreStatus::NeedsImprovement);
        assert_eq!(ScoreStatus::from_score(49.9), ScoreStatus::Poor);
        assert_eq!(ScoreStatus::from_score(0.0), ScoreStatus::Poor);
    }

    #[test]
    fn test_weighted_mean() {
        let scores = vec![score(100.0, 3.0), score(50.0, 1.0)];
        assert!((weighted_mean(&scores).unwrap() - 87.5).abs() < 1e-12);
        assert!(weighted_mean(&[]).is_none());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(82.456, 2), 82.46);
        assert_eq!(round_to(168.24, 1), 168.2);
        assert_eq!(round_to(0.1234, 3), 0.123);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ScoreStatus::NeedsImprovement).unwrap();
        assert_eq!(json, "\"needs_improvement\"");
        let json = serde_json::to_string(&ScoreStatus::NotVisible).unwrap();
        assert_eq!(json, "\"not_visible\"");
    }
}
