use super::angle::angle_at;
use super::round_to;
use crate::constants::{
    COMPARISON_EXCELLENT_TIER, COMPARISON_FAIR_TIER, COMPARISON_GOOD_TIER, DEFAULT_COMPARISON_ANGLE_PENALTY,
    DEFAULT_COMPARISON_ANGLE_WEIGHT, DEFAULT_COMPARISON_DISTANCE_DECAY, DEFAULT_COMPARISON_DISTANCE_WEIGHT,
    DEFAULT_COMPARISON_VISIBILITY_FLOOR, MAX_SCORE, WEIGHT_SUM_EPSILON,
};
use crate::landmark::{LandmarkName, LandmarkSet};
use crate::normalize::{normalize, CenteringStrategy};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Major joints compared between user and reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

impl Joint {
    pub const ALL: [Self; 8] = [
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
    ];

    /// `(point_a, vertex, point_b)` spanning the joint angle
    #[must_use]
    pub const fn landmarks(self) -> (LandmarkName, LandmarkName, LandmarkName) {
        use LandmarkName as L;
        match self {
            Self::LeftElbow => (L::LeftShoulder, L::LeftElbow, L::LeftWrist),
            Self::RightElbow => (L::RightShoulder, L::RightElbow, L::RightWrist),
            Self::LeftShoulder => (L::LeftElbow, L::LeftShoulder, L::LeftHip),
            Self::RightShoulder => (L::RightElbow, L::RightShoulder, L::RightHip),
            Self::LeftHip => (L::LeftShoulder, L::LeftHip, L::LeftKnee),
            Self::RightHip => (L::RightShoulder, L::RightHip, L::RightKnee),
            Self::LeftKnee => (L::LeftHip, L::LeftKnee, L::LeftAnkle),
            Self::RightKnee => (L::RightHip, L::RightKnee, L::RightAnkle),
        }
    }

    /// Lowercase display label, e.g. "left elbow"
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LeftElbow => "left elbow",
            Self::RightElbow => "right elbow",
            Self::LeftShoulder => "left shoulder",
            Self::RightShoulder => "right shoulder",
            Self::LeftHip => "left hip",
            Self::RightHip => "right hip",
            Self::LeftKnee => "left knee",
            Self::RightKnee => "right knee",
        }
    }

    fn angle_in(self, landmarks: &LandmarkSet) -> Option<f64> {
        let (a, vertex, b) = self.landmarks();
        Some(angle_at(landmarks.get(a)?, landmarks.get(vertex)?, landmarks.get(b)?))
    }
}

/// Parameters of the direct reference comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Share of the joint-angle similarity in the overall accuracy
    pub angle_weight: f64,
    /// Share of the distance similarity in the overall accuracy
    pub distance_weight: f64,
    /// Points lost per degree of difference at a joint
    pub angle_penalty: f64,
    /// Decay rate of `100 * exp(-decay * mean_distance)`
    pub distance_decay: f64,
    /// Visibility both sides must exceed for a landmark to enter the distance similarity
    pub visibility: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            angle_weight: DEFAULT_COMPARISON_ANGLE_WEIGHT,
            distance_weight: DEFAULT_COMPARISON_DISTANCE_WEIGHT,
            angle_penalty: DEFAULT_COMPARISON_ANGLE_PENALTY,
            distance_decay: DEFAULT_COMPARISON_DISTANCE_DECAY,
            visibility: DEFAULT_COMPARISON_VISIBILITY_FLOOR,
        }
    }
}

impl ComparisonConfig {
    /// Validate comparison parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for weights outside `[0, 1]` or not
    /// summing to 1, a non-positive penalty or decay, or a floor outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("angle_weight", self.angle_weight),
            ("distance_weight", self.distance_weight),
            ("visibility", self.visibility),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!(
                    "Comparison {name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }

        let sum = self.angle_weight + self.distance_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(Error::ConfigError(format!(
                "Comparison angle_weight + distance_weight must sum to 1.0, got {sum}"
            )));
        }

        for (name, value) in [("angle_penalty", self.angle_penalty), ("distance_decay", self.distance_decay)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::ConfigError(format!(
                    "Comparison {name} must be a finite value greater than 0, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// Outcome at one joint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointFeedback {
    pub joint: Joint,
    /// Score in 0-100
    pub score: f64,
    /// Absolute angle difference in degrees
    pub angle_difference: f64,
    pub message: String,
}

/// Accuracy of a pose measured directly against a reference pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Weighted combination in 0-100
    pub overall_accuracy: f64,
    /// Mean joint score, 0 when no joint could be measured on both sides
    pub angle_score: f64,
    /// Distance similarity, 0 when no landmark is visible on both sides
    pub distance_score: f64,
    /// Landmarks that entered the distance similarity
    pub compared_landmarks: usize,
    /// Per-joint outcome in [`Joint::ALL`] order
    pub joint_feedback: Vec<JointFeedback>,
    pub general_feedback: String,
}

impl ComparisonResult {
    /// Copy with scores and angle differences rounded to 2 decimals
    #[must_use]
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        out.overall_accuracy = round_to(out.overall_accuracy, 2);
        out.angle_score = round_to(out.angle_score, 2);
        out.distance_score = round_to(out.distance_score, 2);
        for joint in &mut out.joint_feedback {
            joint.score = round_to(joint.score, 2);
            joint.angle_difference = round_to(joint.angle_difference, 2);
        }
        out
    }
}

/// Scores a user pose against a reference pose without authored criteria.
///
/// Both sets are normalized hip-center / shoulder-width, then compared on
/// the eight major joint angles and on landmark distances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceComparator {
    config: ComparisonConfig,
}

impl Default for ReferenceComparator {
    fn default() -> Self {
        Self::new(ComparisonConfig::default())
    }
}

impl ReferenceComparator {
    #[must_use]
    pub const fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Compare `user` against `reference`. Never fails.
    #[must_use]
    pub fn compare(&self, user: &LandmarkSet, reference: &LandmarkSet) -> ComparisonResult {
        let user = normalize(user, CenteringStrategy::HipCenter);
        let reference = normalize(reference, CenteringStrategy::HipCenter);

        let joint_feedback = self.compare_joints(&user, &reference);
        let angle_score = if joint_feedback.is_empty() {
            0.0
        } else {
            joint_feedback.iter().map(|j| j.score).sum::<f64>() / joint_feedback.len() as f64
        };

        let (distance_score, compared_landmarks) = self.distance_similarity(&user, &reference);

        let overall_accuracy = (self.config.angle_weight * angle_score + self.config.distance_weight * distance_score)
            .clamp(0.0, MAX_SCORE);

        log::debug!(
            "Reference comparison: {} joints, angle {:.1}, {} landmarks, distance {:.1}, overall {:.1}",
            joint_feedback.len(),
            angle_score,
            compared_landmarks,
            distance_score,
            overall_accuracy
        );

        ComparisonResult {
            overall_accuracy,
            angle_score,
            distance_score,
            compared_landmarks,
            general_feedback: general_feedback(overall_accuracy, &joint_feedback),
            joint_feedback,
        }
    }

    fn compare_joints(&self, user: &LandmarkSet, reference: &LandmarkSet) -> Vec<JointFeedback> {
        Joint::ALL
            .iter()
            .filter_map(|&joint| {
                let difference = (joint.angle_in(reference)? - joint.angle_in(user)?).abs();
                let score = (MAX_SCORE - difference * self.config.angle_penalty).max(0.0);
                Some(JointFeedback {
                    joint,
                    score,
                    angle_difference: difference,
                    message: joint_message(score, difference),
                })
            })
            .collect()
    }

    fn distance_similarity(&self, user: &LandmarkSet, reference: &LandmarkSet) -> (f64, usize) {
        let floor = self.config.visibility;
        let distances: Vec<f64> = user
            .iter()
            .filter_map(|mine| {
                let theirs = reference.get(mine.name)?;
                (mine.visibility > floor && theirs.visibility > floor).then(|| mine.planar_distance(theirs))
            })
            .collect();

        if distances.is_empty() {
            return (0.0, 0);
        }
        let mean = distances.iter().sum::<f64>() / distances.len() as f64;
        let score = (MAX_SCORE * (-mean * self.config.distance_decay).exp()).clamp(0.0, MAX_SCORE);
        (score, distances.len())
    }
}

fn joint_message(score: f64, difference: f64) -> String {
    if score >= COMPARISON_EXCELLENT_TIER {
        "Excellent!".to_string()
    } else if score >= COMPARISON_GOOD_TIER {
        format!("Good, adjust by {difference:.1}°")
    } else if score >= COMPARISON_FAIR_TIER {
        format!("Needs adjustment: {difference:.1}° off")
    } else {
        format!("Incorrect angle: {difference:.1}° difference")
    }
}

/// One-line verdict for a reference comparison, naming the weakest joints
#[must_use]
pub fn general_feedback(overall: f64, joints: &[JointFeedback]) -> String {
    let mut ranked: Vec<&JointFeedback> = joints.iter().collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));

    if overall >= COMPARISON_EXCELLENT_TIER {
        "Excellent pose! Keep it up!".to_string()
    } else if overall >= COMPARISON_GOOD_TIER {
        match ranked.first() {
            Some(worst) => format!("Good pose! Focus on improving your {}.", worst.joint.label()),
            None => "Good pose! Minor adjustments needed.".to_string(),
        }
    } else if overall >= COMPARISON_FAIR_TIER {
        let names: Vec<&str> = ranked.iter().take(2).map(|j| j.joint.label()).collect();
        if names.is_empty() {
            "Needs improvement.".to_string()
        } else {
            format!("Needs improvement. Focus on: {}.", names.join(", "))
        }
    } else {
        "Significant adjustments needed. Review the reference pose and try again.".to_string()
    }
}
