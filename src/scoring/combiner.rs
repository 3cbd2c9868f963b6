use super::angle::AngleEvaluation;
use super::connection::ConnectionEvaluation;
use super::feedback;
use super::position::PositionMatch;
use crate::constants::{
    DEFAULT_ANGLE_WITH_CONNECTION_WEIGHT, DEFAULT_CONNECTION_WITH_ANGLE_WEIGHT, DEFAULT_FULL_ANGLE_WEIGHT,
    DEFAULT_FULL_CONNECTION_WEIGHT, DEFAULT_FULL_POSITION_WEIGHT, DEFAULT_POSITION_WEIGHT, MAX_SCORE,
    WEIGHT_SUM_EPSILON,
};
use crate::result::AccuracyResult;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sub-score weights for each combination of available evaluators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinerWeights {
    /// Angle share when connections are present without a reference
    pub angle_with_connection: f64,
    /// Connection share when connections are present without a reference
    pub connection_with_angle: f64,
    /// Position share when a reference is present without connections
    pub position_weight: f64,
    /// Angle share when every evaluator applies
    pub full_angle: f64,
    /// Position share when every evaluator applies
    pub full_position: f64,
    /// Connection share when every evaluator applies
    pub full_connection: f64,
}

impl Default for CombinerWeights {
    fn default() -> Self {
        Self {
            angle_with_connection: DEFAULT_ANGLE_WITH_CONNECTION_WEIGHT,
            connection_with_angle: DEFAULT_CONNECTION_WITH_ANGLE_WEIGHT,
            position_weight: DEFAULT_POSITION_WEIGHT,
            full_angle: DEFAULT_FULL_ANGLE_WEIGHT,
            full_position: DEFAULT_FULL_POSITION_WEIGHT,
            full_connection: DEFAULT_FULL_CONNECTION_WEIGHT,
        }
    }
}

impl CombinerWeights {
    /// Check that every weight is within `[0, 1]` and each split sums to 1
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` naming the offending weight or split.
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("angle_with_connection", self.angle_with_connection),
            ("connection_with_angle", self.connection_with_angle),
            ("position_weight", self.position_weight),
            ("full_angle", self.full_angle),
            ("full_position", self.full_position),
            ("full_connection", self.full_connection),
        ];
        for (name, weight) in all {
            if !(0.0..=1.0).contains(&weight) {
                return Err(Error::ConfigError(format!(
                    "Weight {name} must be between 0.0 and 1.0, got {weight}"
                )));
            }
        }

        let pair = self.angle_with_connection + self.connection_with_angle;
        if (pair - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(Error::ConfigError(format!(
                "angle_with_connection + connection_with_angle must sum to 1.0, got {pair}"
            )));
        }

        let full = self.full_angle + self.full_position + self.full_connection;
        if (full - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(Error::ConfigError(format!(
                "full_angle + full_position + full_connection must sum to 1.0, got {full}"
            )));
        }

        Ok(())
    }
}

/// Merges evaluator outputs into one [`AccuracyResult`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCombiner {
    weights: CombinerWeights,
}

impl ScoreCombiner {
    #[must_use]
    pub const fn new(weights: CombinerWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub const fn weights(&self) -> &CombinerWeights {
        &self.weights
    }

    /// Overall accuracy for the evaluators that applied.
    ///
    /// The weighting is picked by which optional sub-scores are present.
    #[must_use]
    pub fn overall(&self, angle: f64, connection: Option<f64>, position: Option<f64>) -> f64 {
        let w = &self.weights;
        let overall = match (connection, position) {
            (None, None) => angle,
            (Some(connection), None) => w.angle_with_connection * angle + w.connection_with_angle * connection,
            (None, Some(position)) => (1.0 - w.position_weight) * angle + w.position_weight * position,
            (Some(connection), Some(position)) => {
                w.full_angle * angle + w.full_position * position + w.full_connection * connection
            }
        };
        overall.clamp(0.0, MAX_SCORE)
    }

    /// Combine the sub-results of one pose.
    ///
    /// Connections count only when at least one connection criterion was
    /// evaluated. When no angle could be measured the angle sub-score is
    /// taken as 0 and a warning is added.
    #[must_use]
    pub fn combine(
        &self,
        angles: &AngleEvaluation,
        connections: Option<&ConnectionEvaluation>,
        position: Option<&PositionMatch>,
    ) -> AccuracyResult {
        let mut warnings = angles.warnings.clone();

        let angle_accuracy = angles.subscore().unwrap_or_else(|| {
            log::warn!("No angle criteria could be scored");
            warnings.push("No angle criteria could be scored".to_string());
            0.0
        });

        let connections = connections.filter(|c| !c.scores.is_empty());
        let connection_accuracy = connections.and_then(ConnectionEvaluation::subscore);
        let position_accuracy = position.map(|p| p.overall_score);

        let overall_accuracy = self.overall(angle_accuracy, connection_accuracy, position_accuracy);

        log::info!(
            "Overall accuracy {:.1} (angle {:.1}, connection {:?}, position {:?})",
            overall_accuracy,
            angle_accuracy,
            connection_accuracy,
            position_accuracy
        );

        let mut criterion_scores = angles.scores.clone();
        if let Some(connections) = connections {
            criterion_scores.extend(connections.scores.iter().cloned());
        }

        AccuracyResult {
            pose_id: String::new(),
            view: None,
            overall_accuracy,
            angle_accuracy: Some(angle_accuracy),
            connection_accuracy,
            position_accuracy,
            criterion_scores,
            position_scores: position.map(|p| p.landmark_scores.clone()).unwrap_or_default(),
            feedback: feedback::generate(overall_accuracy, angles, connections),
            warnings,
            failure: None,
        }
    }
}
