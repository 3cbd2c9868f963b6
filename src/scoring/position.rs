use crate::constants::{
    DEFAULT_BOUNDING_BOX_VISIBILITY_FLOOR, DEFAULT_POSITION_LANDMARK_MAX_DISTANCE, DEFAULT_POSITION_OVERALL_MAX_DISTANCE,
    DEFAULT_POSITION_VISIBILITY_FLOOR, MAX_SCORE, UNMATCHED_MEAN_DISTANCE,
};
use crate::landmark::{LandmarkName, LandmarkSet};
use crate::normalize::{normalize, CenteringStrategy};
use serde::{Deserialize, Serialize};

/// Per-landmark outcome of position matching
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkScore {
    pub landmark: LandmarkName,
    /// Distance between user and reference in the normalized frame
    pub distance: f64,
    /// Score in 0-100
    pub score: f64,
}

/// Whole-pose similarity against a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMatch {
    /// Score in 0-100 derived from the mean distance
    pub overall_score: f64,
    /// Mean distance over matched landmarks, 1.0 when nothing matched
    pub mean_distance: f64,
    /// Number of landmarks that took part in the comparison
    pub matched: usize,
    /// Scores of the matched landmarks, in required order
    pub landmark_scores: Vec<LandmarkScore>,
}

/// Compares a user pose with a reference pose landmark by landmark.
///
/// Both sets are normalized independently with the bounding-box strategy,
/// so body size and placement in the frame do not affect the result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionMatcher {
    visibility_floor: f64,
    bounding_box_floor: f64,
    landmark_max_distance: f64,
    overall_max_distance: f64,
}

impl Default for PositionMatcher {
    fn default() -> Self {
        Self::new(
            DEFAULT_POSITION_VISIBILITY_FLOOR,
            DEFAULT_BOUNDING_BOX_VISIBILITY_FLOOR,
            DEFAULT_POSITION_LANDMARK_MAX_DISTANCE,
            DEFAULT_POSITION_OVERALL_MAX_DISTANCE,
        )
    }
}

impl PositionMatcher {
    /// Create a matcher.
    ///
    /// # Arguments
    /// * `visibility_floor` - Minimum user-side visibility for a landmark to be compared
    /// * `bounding_box_floor` - Visibility a landmark must exceed to shape the normalization box
    /// * `landmark_max_distance` - Distance at which a single landmark scores 0
    /// * `overall_max_distance` - Mean distance at which the overall score reaches 0
    #[must_use]
    pub const fn new(
        visibility_floor: f64,
        bounding_box_floor: f64,
        landmark_max_distance: f64,
        overall_max_distance: f64,
    ) -> Self {
        Self {
            visibility_floor,
            bounding_box_floor,
            landmark_max_distance,
            overall_max_distance,
        }
    }

    /// Match the user landmarks against the reference over `required`.
    ///
    /// A landmark is compared when it is present in both sets and the user's
    /// copy clears the visibility floor. Never fails: with no comparable
    /// landmark the mean distance is taken as 1.0 and the score is 0.
    #[must_use]
    pub fn match_landmarks(&self, user: &LandmarkSet, reference: &LandmarkSet, required: &[LandmarkName]) -> PositionMatch {
        let strategy = CenteringStrategy::BoundingBox {
            visibility_floor: self.bounding_box_floor,
        };
        let user = normalize(user, strategy);
        let reference = normalize(reference, strategy);

        let landmark_scores: Vec<LandmarkScore> = required
            .iter()
            .filter_map(|&name| {
                let mine = user.get(name)?;
                let theirs = reference.get(name)?;
                if !mine.is_visible(self.visibility_floor) {
                    return None;
                }
                let distance = mine.planar_distance(theirs);
                Some(LandmarkScore {
                    landmark: name,
                    distance,
                    score: falloff(distance, self.landmark_max_distance),
                })
            })
            .collect();

        let mean_distance = if landmark_scores.is_empty() {
            UNMATCHED_MEAN_DISTANCE
        } else {
            landmark_scores.iter().map(|s| s.distance).sum::<f64>() / landmark_scores.len() as f64
        };
        let overall_score = if landmark_scores.is_empty() {
            0.0
        } else {
            falloff(mean_distance, self.overall_max_distance)
        };

        log::debug!(
            "Position match: {}/{} landmarks, mean distance {:.3}, score {:.1}",
            landmark_scores.len(),
            required.len(),
            mean_distance,
            overall_score
        );

        PositionMatch {
            overall_score,
            mean_distance,
            matched: landmark_scores.len(),
            landmark_scores,
        }
    }
}

fn falloff(distance: f64, max_distance: f64) -> f64 {
    (MAX_SCORE * (1.0 - distance / max_distance)).max(0.0)
}
