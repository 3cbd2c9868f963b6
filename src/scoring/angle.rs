use super::{weighted_mean, Criterion, CriterionKind, CriterionScore, ScoreStatus};
use crate::catalog::AngleCriterion;
use crate::constants::{ANGLE_EPSILON, MAX_SCORE, TOLERANCE_EDGE_SCORE};
use crate::landmark::{Landmark, LandmarkSet};

/// Angle in degrees at `vertex` between the rays to `point_a` and `point_b`.
///
/// Planar only; depth is ignored. Always in `[0, 180]`. A zero-length ray
/// yields 90 degrees instead of NaN.
#[must_use]
pub fn angle_at(point_a: &Landmark, vertex: &Landmark, point_b: &Landmark) -> f64 {
    let u = point_a.position() - vertex.position();
    let v = point_b.position() - vertex.position();

    let denominator = (u.norm() * v.norm()).max(ANGLE_EPSILON);
    let cos_angle = (u.dot(&v) / denominator).clamp(-1.0, 1.0);

    cos_angle.acos().to_degrees()
}

/// Score an angle against its target.
///
/// Inside the tolerance band the score falls linearly from 100 to 85; past it
/// the remaining 85 points are lost over one more tolerance width, then the
/// score stays at 0.
#[must_use]
pub fn score_angle(actual: f64, target: f64, tolerance: f64) -> f64 {
    let deviation = (actual - target).abs();

    if tolerance <= 0.0 {
        return if deviation == 0.0 { MAX_SCORE } else { 0.0 };
    }

    if deviation <= tolerance {
        MAX_SCORE - (deviation / tolerance) * (MAX_SCORE - TOLERANCE_EDGE_SCORE)
    } else {
        let excess = deviation - tolerance;
        (TOLERANCE_EDGE_SCORE - (excess / tolerance) * TOLERANCE_EDGE_SCORE).max(0.0)
    }
}

/// Evaluate one angle criterion.
///
/// Returns `None` when any of the three landmarks is absent from the set.
/// Landmarks below `visibility_floor` still get scored, with the score
/// flagged as low visibility.
#[must_use]
pub fn evaluate_angle(landmarks: &LandmarkSet, criterion: &AngleCriterion, visibility_floor: f64) -> Option<CriterionScore> {
    let point_a = landmarks.get(criterion.point_a)?;
    let vertex = landmarks.get(criterion.vertex)?;
    let point_b = landmarks.get(criterion.point_b)?;

    let actual = angle_at(point_a, vertex, point_b);
    let deviation = (actual - criterion.target_angle).abs();
    let score = score_angle(actual, criterion.target_angle, criterion.tolerance);

    let dim: Vec<String> = [point_a, vertex, point_b]
        .iter()
        .filter(|lm| !lm.is_visible(visibility_floor))
        .map(|lm| format!("{} ({:.0}%)", lm.name, lm.visibility * 100.0))
        .collect();

    log::debug!(
        "Angle '{}': actual {:.1}°, target {:.1}°, deviation {:.1}°, score {:.1}",
        criterion.name,
        actual,
        criterion.target_angle,
        deviation,
        score
    );

    Some(CriterionScore {
        kind: CriterionKind::Angle,
        name: criterion.name.clone(),
        points: criterion.landmarks(),
        target: criterion.target_angle,
        actual: Some(actual),
        deviation: Some(deviation),
        score,
        status: ScoreStatus::from_score(score),
        weight: criterion.weight,
        low_visibility: !dim.is_empty(),
        message: (!dim.is_empty()).then(|| format!("Low visibility: {}", dim.join(", "))),
    })
}

/// Scores of all angle criteria of a pose
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleEvaluation {
    /// Scored criteria, in authored order
    pub scores: Vec<CriterionScore>,
    /// Names of criteria that could not be measured
    pub skipped: Vec<String>,
    /// Degraded-confidence and skip diagnostics
    pub warnings: Vec<String>,
}

impl AngleEvaluation {
    /// Weighted mean over measured criteria; `None` when nothing was measured
    #[must_use]
    pub fn subscore(&self) -> Option<f64> {
        weighted_mean(&self.scores)
    }
}

/// Evaluate every angle criterion of a pose
#[must_use]
pub fn evaluate_angles(landmarks: &LandmarkSet, criteria: &[AngleCriterion], visibility_floor: f64) -> AngleEvaluation {
    let mut evaluation = AngleEvaluation::default();

    for criterion in criteria {
        match evaluate_angle(landmarks, criterion, visibility_floor) {
            Some(score) => {
                if let Some(message) = score.message.as_deref() {
                    evaluation
                        .warnings
                        .push(format!("Angle '{}' scored with low confidence. {message}", criterion.name));
                }
                evaluation.scores.push(score);
            }
            None => {
                let missing: Vec<String> = landmarks
                    .missing(&criterion.landmarks())
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                log::debug!("Angle '{}' skipped, missing {}", criterion.name, missing.join(", "));
                evaluation.warnings.push(format!(
                    "Angle '{}' not scored: missing {}",
                    criterion.name,
                    missing.join(", ")
                ));
                evaluation.skipped.push(criterion.name.clone());
            }
        }
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LandmarkName;
    use proptest::prelude::*;

    fn lm(name: LandmarkName, x: f64, y: f64) -> Landmark {
        Landmark::new(name, x, y, 0.0, 0.95)
    }

    fn knee(target_angle: f64, tolerance: f64) -> AngleCriterion {
        AngleCriterion {
            name: "left leg".to_string(),
            point_a: LandmarkName::LeftHip,
            vertex: LandmarkName::LeftKnee,
            point_b: LandmarkName::LeftAnkle,
            target_angle,
            tolerance,
            weight: 2.0,
        }
    }

    #[test]
    fn test_angle_straight_line() {
        let a = lm(LandmarkName::LeftHip, 0.5, 0.2);
        let v = lm(LandmarkName::LeftKnee, 0.5, 0.4);
        let b = lm(LandmarkName::LeftAnkle, 0.5, 0.6);
        assert!((angle_at(&a, &v, &b) - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_angle_right_angle() {
        let a = lm(LandmarkName::LeftHip, 0.5, 0.2);
        let v = lm(LandmarkName::LeftKnee, 0.5, 0.4);
        let b = lm(LandmarkName::LeftAnkle, 0.7, 0.4);
        assert!((angle_at(&a, &v, &b) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_angle_degenerate_vector_is_finite() {
        let a = lm(LandmarkName::LeftHip, 0.5, 0.4);
        let v = lm(LandmarkName::LeftKnee, 0.5, 0.4);
        let b = lm(LandmarkName::LeftAnkle, 0.7, 0.4);
        let angle = angle_at(&a, &v, &b);
        assert!(angle.is_finite());
        assert!((0.0..=180.0).contains(&angle));
    }

    #[test]
    fn test_angle_ignores_depth() {
        let a = Landmark::new(LandmarkName::LeftHip, 0.5, 0.2, 3.0, 1.0);
        let v = Landmark::new(LandmarkName::LeftKnee, 0.5, 0.4, -1.0, 1.0);
        let b = Landmark::new(LandmarkName::LeftAnkle, 0.7, 0.4, 9.0, 1.0);
        assert!((angle_at(&a, &v, &b) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_angle_curve_points() {
        assert_eq!(score_angle(120.0, 120.0, 20.0), 100.0);
        assert_eq!(score_angle(140.0, 120.0, 20.0), 85.0);
        assert_eq!(score_angle(100.0, 120.0, 20.0), 85.0);
        assert_eq!(score_angle(160.0, 120.0, 20.0), 0.0);
        assert_eq!(score_angle(179.0, 120.0, 20.0), 0.0);
        assert!((score_angle(130.0, 120.0, 20.0) - 92.5).abs() < 1e-12);
        assert!((score_angle(150.0, 120.0, 20.0) - 42.5).abs() < 1e-12);
    }

    #[test]
    fn test_evaluate_angle_missing_landmark() {
        let set: LandmarkSet = vec![lm(LandmarkName::LeftHip, 0.5, 0.2), lm(LandmarkName::LeftKnee, 0.5, 0.4)].into();
        assert!(evaluate_angle(&set, &knee(180.0, 20.0), 0.5).is_none());
    }

    #[test]
    fn test_evaluate_angle_low_visibility_still_scored() {
        let set: LandmarkSet = vec![
            lm(LandmarkName::LeftHip, 0.5, 0.2),
            Landmark::new(LandmarkName::LeftKnee, 0.5, 0.4, 0.0, 0.2),
            lm(LandmarkName::LeftAnkle, 0.5, 0.6),
        ]
        .into();

        let score = evaluate_angle(&set, &knee(180.0, 20.0), 0.5).unwrap();
        assert!(score.low_visibility);
        assert!(score.message.unwrap().contains("left_knee"));
        assert!(score.score > 99.9);
        assert_eq!(score.status, ScoreStatus::Excellent);
    }

    #[test]
    fn test_evaluate_angles_skips_and_warns() {
        let set: LandmarkSet = vec![
            lm(LandmarkName::LeftHip, 0.5, 0.2),
            lm(LandmarkName::LeftKnee, 0.5, 0.4),
            lm(LandmarkName::LeftAnkle, 0.5, 0.6),
        ]
        .into();
        let right = AngleCriterion {
            name: "right leg".to_string(),
            point_a: LandmarkName::RightHip,
            vertex: LandmarkName::RightKnee,
            point_b: LandmarkName::RightAnkle,
            target_angle: 180.0,
            tolerance: 20.0,
            weight: 1.0,
        };

        let evaluation = evaluate_angles(&set, &[knee(180.0, 20.0), right], 0.5);
        assert_eq!(evaluation.scores.len(), 1);
        assert_eq!(evaluation.skipped, vec!["right leg".to_string()]);
        assert!(evaluation.warnings[0].contains("right_hip"));
        assert!(evaluation.subscore().unwrap() > 99.9);
    }

    #[test]
    fn test_evaluate_angles_nothing_scorable() {
        let evaluation = evaluate_angles(&LandmarkSet::new(), &[knee(90.0, 15.0)], 0.5);
        assert!(evaluation.scores.is_empty());
        assert!(evaluation.subscore().is_none());
    }

    proptest! {
        #[test]
        fn prop_zero_deviation_scores_100(target in 0.0f64..=180.0, tolerance in 0.1f64..90.0) {
            prop_assert_eq!(score_angle(target, target, tolerance), 100.0);
        }

        #[test]
        fn prop_tolerance_edge_scores_85(tolerance in 0.1f64..90.0) {
            prop_assert!((score_angle(tolerance, 0.0, tolerance) - 85.0).abs() < 1e-9);
        }

        #[test]
        fn prop_double_tolerance_scores_0(tolerance in 0.1f64..60.0, extra in 0.0f64..60.0) {
            prop_assert_eq!(score_angle(2.0 * tolerance + extra, 0.0, tolerance), 0.0);
        }

        #[test]
        fn prop_score_monotone_in_deviation(tolerance in 0.1f64..90.0, d1 in 0.0f64..180.0, d2 in 0.0f64..180.0) {
            let (small, large) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
            prop_assert!(score_angle(small, 0.0, tolerance) >= score_angle(large, 0.0, tolerance));
        }

        #[test]
        fn prop_score_bounded(actual in -360.0f64..360.0, target in 0.0f64..=180.0, tolerance in 0.1f64..90.0) {
            let score = score_angle(actual, target, tolerance);
            prop_assert!((0.0..=100.0).contains(&score));
        }

        #[test]
        fn prop_angle_in_range(
            ax in -1.0f64..1.0, ay in -1.0f64..1.0,
            vx in -1.0f64..1.0, vy in -1.0f64..1.0,
            bx in -1.0f64..1.0, by in -1.0f64..1.0
        ) {
            let angle = angle_at(
                &lm(LandmarkName::LeftHip, ax, ay),
                &lm(LandmarkName::LeftKnee, vx, vy),
                &lm(LandmarkName::LeftAnkle, bx, by),
            );
            prop_assert!(angle.is_finite());
            prop_assert!((0.0..=180.0).contains(&angle));
        }
    }
}
