use super::{weighted_mean, Criterion, CriterionKind, CriterionScore, ScoreStatus};
use crate::catalog::ConnectionCriterion;
use crate::constants::MAX_SCORE;
use crate::landmark::LandmarkSet;

/// Proximity score: 100 when the points coincide, falling linearly to 0 at
/// `max_distance` and staying there.
#[must_use]
pub fn score_connection(distance: f64, max_distance: f64) -> f64 {
    if max_distance <= 0.0 {
        return if distance <= 0.0 { MAX_SCORE } else { 0.0 };
    }
    (MAX_SCORE * (1.0 - distance / max_distance)).max(0.0)
}

/// Evaluate one connection criterion.
///
/// Never skips: an absent landmark yields `not_detected` and one below
/// `visibility_floor` yields `not_visible`, both scored 0.
#[must_use]
pub fn evaluate_connection(landmarks: &LandmarkSet, criterion: &ConnectionCriterion, visibility_floor: f64) -> CriterionScore {
    let unmeasured = |status: ScoreStatus, message: String| CriterionScore {
        kind: CriterionKind::Connection,
        name: criterion.name.clone(),
        points: criterion.landmarks(),
        target: criterion.max_distance,
        actual: None,
        deviation: None,
        score: 0.0,
        status,
        weight: criterion.weight,
        low_visibility: status == ScoreStatus::NotVisible,
        message: Some(message),
    };

    let (Some(a), Some(b)) = (landmarks.get(criterion.point_a), landmarks.get(criterion.point_b)) else {
        log::debug!("Connection '{}': landmarks not detected", criterion.name);
        return unmeasured(ScoreStatus::NotDetected, "Landmarks not detected".to_string());
    };

    if !a.is_visible(visibility_floor) || !b.is_visible(visibility_floor) {
        log::debug!(
            "Connection '{}': low visibility {:.3}, {:.3}",
            criterion.name,
            a.visibility,
            b.visibility
        );
        let dim: Vec<String> = [a, b]
            .iter()
            .filter(|lm| !lm.is_visible(visibility_floor))
            .map(|lm| format!("{} ({:.0}%)", lm.name, lm.visibility * 100.0))
            .collect();
        return unmeasured(ScoreStatus::NotVisible, format!("Low visibility: {}", dim.join(", ")));
    }

    let distance = a.planar_distance(b);
    let score = score_connection(distance, criterion.max_distance);

    log::debug!(
        "Connection '{}': distance {:.3}, max {:.3}, score {:.1}",
        criterion.name,
        distance,
        criterion.max_distance,
        score
    );

    CriterionScore {
        kind: CriterionKind::Connection,
        name: criterion.name.clone(),
        points: criterion.landmarks(),
        target: criterion.max_distance,
        actual: Some(distance),
        deviation: Some(distance),
        score,
        status: ScoreStatus::from_score(score),
        weight: criterion.weight,
        low_visibility: false,
        message: None,
    }
}

/// Scores of all connection criteria of a pose
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionEvaluation {
    /// One score per criterion, in authored order
    pub scores: Vec<CriterionScore>,
}

impl ConnectionEvaluation {
    /// Weighted mean including unmeasured connections as zeros
    #[must_use]
    pub fn subscore(&self) -> Option<f64> {
        weighted_mean(&self.scores)
    }
}

/// Evaluate every connection criterion of a pose
#[must_use]
pub fn evaluate_connections(
    landmarks: &LandmarkSet,
    criteria: &[ConnectionCriterion],
    visibility_floor: f64,
) -> ConnectionEvaluation {
    ConnectionEvaluation {
        scores: criteria
            .iter()
            .map(|criterion| evaluate_connection(landmarks, criterion, visibility_floor))
            .collect(),
    }
}
