//! Evaluation result returned to callers.

use crate::catalog::View;
use crate::landmark::LandmarkName;
use crate::scoring::position::LandmarkScore;
use crate::scoring::{round_to, CriterionKind, CriterionScore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an evaluation produced no score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationFailure {
    /// The pose id is not in the catalog
    ConfigNotFound { pose_id: String },
    /// Required landmarks are absent from the user's set
    MissingRequiredLandmarks { missing: Vec<LandmarkName> },
}

impl fmt::Display for EvaluationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigNotFound { pose_id } => write!(f, "No criteria configured for pose: {pose_id}"),
            Self::MissingRequiredLandmarks { missing } => {
                write!(f, "Missing required landmarks: {}", join(missing))
            }
        }
    }
}

/// Accuracy of one pose attempt.
///
/// Sub-scores are `None` when their evaluator did not apply. A failed
/// evaluation has `overall_accuracy` 0, no criterion scores and a
/// [`EvaluationFailure`] describing the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyResult {
    pub pose_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    /// Combined accuracy in 0-100
    pub overall_accuracy: f64,
    pub angle_accuracy: Option<f64>,
    pub connection_accuracy: Option<f64>,
    pub position_accuracy: Option<f64>,
    /// Angle scores followed by connection scores, in authored order
    pub criterion_scores: Vec<CriterionScore>,
    /// Per-landmark position scores, empty without a reference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub position_scores: Vec<LandmarkScore>,
    /// Summary line first, then per-criterion hints
    pub feedback: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<EvaluationFailure>,
}

impl AccuracyResult {
    /// Build the result of an evaluation that could not be scored
    #[must_use]
    pub fn failed(pose_id: impl Into<String>, failure: EvaluationFailure) -> Self {
        let feedback = match &failure {
            EvaluationFailure::ConfigNotFound { .. } => Vec::new(),
            EvaluationFailure::MissingRequiredLandmarks { missing } => {
                vec![format!("Cannot detect: {}", join(missing))]
            }
        };

        Self {
            pose_id: pose_id.into(),
            view: None,
            overall_accuracy: 0.0,
            angle_accuracy: None,
            connection_accuracy: None,
            position_accuracy: None,
            criterion_scores: Vec::new(),
            position_scores: Vec::new(),
            feedback,
            warnings: vec![failure.to_string()],
            failure: Some(failure),
        }
    }

    /// Whether the pose was scored
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Angle criterion scores
    pub fn angle_scores(&self) -> impl Iterator<Item = &CriterionScore> {
        self.criterion_scores.iter().filter(|s| s.kind == CriterionKind::Angle)
    }

    /// Connection criterion scores
    pub fn connection_scores(&self) -> impl Iterator<Item = &CriterionScore> {
        self.criterion_scores.iter().filter(|s| s.kind == CriterionKind::Connection)
    }

    /// Copy rounded for display: accuracies and scores to 2 decimals,
    /// angles to 1 and distances to 3
    #[must_use]
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        out.overall_accuracy = round_to(out.overall_accuracy, 2);
        for sub in [&mut out.angle_accuracy, &mut out.connection_accuracy, &mut out.position_accuracy] {
            *sub = sub.map(|v| round_to(v, 2));
        }
        for score in &mut out.criterion_scores {
            let decimals = match score.kind {
                CriterionKind::Angle => 1,
                CriterionKind::Connection => 3,
            };
            score.target = round_to(score.target, decimals);
            score.actual = score.actual.map(|v| round_to(v, decimals));
            score.deviation = score.deviation.map(|v| round_to(v, decimals));
            score.score = round_to(score.score, 2);
        }
        for landmark in &mut out.position_scores {
            landmark.distance = round_to(landmark.distance, 3);
            landmark.score = round_to(landmark.score, 2);
        }
        out
    }
}

fn join(names: &[LandmarkName]) -> String {
    names.iter().copied().map(LandmarkName::as_str).collect::<Vec<_>>().join(", ")
}
