//! Pose accuracy evaluation pipeline.
//!
//! Catalog lookup, required-landmark validation, angle and connection
//! scoring, optional position matching against a reference, then the
//! weighted combination.

use crate::catalog::{Catalog, PoseCriteriaSet};
use crate::config::{ConnectionSpace, EngineConfig};
use crate::landmark::LandmarkSet;
use crate::normalize::{normalize, CenteringStrategy};
use crate::reference::ReferenceStore;
use crate::result::{AccuracyResult, EvaluationFailure};
use crate::scoring::angle::evaluate_angles;
use crate::scoring::combiner::ScoreCombiner;
use crate::scoring::connection::evaluate_connections;
use crate::scoring::position::PositionMatcher;
use crate::scoring::reference_comparison::{ComparisonResult, ReferenceComparator};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One pose attempt to score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub pose_id: String,
    #[serde(alias = "user_keypoints")]
    pub user_landmarks: LandmarkSet,
    /// Enables position matching when present
    #[serde(default, alias = "reference_keypoints", skip_serializing_if = "Option::is_none")]
    pub reference_landmarks: Option<LandmarkSet>,
}

impl EvaluateRequest {
    #[must_use]
    pub fn new(pose_id: impl Into<String>, user_landmarks: LandmarkSet) -> Self {
        Self {
            pose_id: pose_id.into(),
            user_landmarks,
            reference_landmarks: None,
        }
    }

    /// Attach reference landmarks for position matching
    #[must_use]
    pub fn with_reference(mut self, reference: LandmarkSet) -> Self {
        self.reference_landmarks = Some(reference);
        self
    }
}

/// Scores landmark sets against a catalog.
///
/// Holds no mutable state; one engine can serve any number of threads.
#[derive(Debug, Clone)]
pub struct AccuracyEngine<'c> {
    catalog: &'c Catalog,
    config: EngineConfig,
    combiner: ScoreCombiner,
    matcher: PositionMatcher,
    comparator: ReferenceComparator,
}

impl<'c> AccuracyEngine<'c> {
    /// Create an engine over `catalog`
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `config` does not validate.
    pub fn new(catalog: &'c Catalog, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            catalog,
            combiner: ScoreCombiner::new(config.weights),
            matcher: PositionMatcher::new(
                config.visibility.position,
                config.visibility.bounding_box,
                config.position.landmark_max_distance,
                config.position.overall_max_distance,
            ),
            comparator: ReferenceComparator::new(config.comparison),
            config,
        })
    }

    /// Create an engine with default scoring parameters
    #[must_use]
    pub fn with_defaults(catalog: &'c Catalog) -> Self {
        let config = EngineConfig::default();
        Self {
            catalog,
            combiner: ScoreCombiner::new(config.weights),
            matcher: PositionMatcher::default(),
            comparator: ReferenceComparator::new(config.comparison),
            config,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one request.
    ///
    /// Never fails: an unknown pose or missing required landmarks give a
    /// result with overall accuracy 0 and [`AccuracyResult::failure`] set.
    #[must_use]
    pub fn evaluate(&self, request: &EvaluateRequest) -> AccuracyResult {
        self.score(
            &request.pose_id,
            &request.user_landmarks,
            request.reference_landmarks.as_ref(),
            Vec::new(),
        )
    }

    /// Score a pose, fetching the reference from `store`.
    ///
    /// A pose without a stored reference is scored without position matching.
    /// A reference that exists but cannot be read adds a warning.
    #[must_use]
    pub fn evaluate_with_store(&self, pose_id: &str, user: &LandmarkSet, store: &dyn ReferenceStore) -> AccuracyResult {
        let mut warnings = Vec::new();
        let reference = match store.get_reference(pose_id) {
            Ok(reference) => Some(reference.landmarks),
            Err(Error::ReferenceNotFound(_)) => {
                log::debug!("No reference stored for {pose_id}, skipping position matching");
                None
            }
            Err(e) => {
                log::warn!("Could not load reference for {pose_id}: {e}");
                warnings.push(format!("Reference pose could not be loaded, position matching skipped: {e}"));
                None
            }
        };

        self.score(pose_id, user, reference.as_ref(), warnings)
    }

    /// Score `user` directly against reference landmarks.
    ///
    /// Needs no catalog entry: the eight major joint angles and landmark
    /// distances of both poses are compared.
    #[must_use]
    pub fn compare_to_reference(&self, user: &LandmarkSet, reference: &LandmarkSet) -> ComparisonResult {
        self.comparator.compare(user, reference)
    }

    /// Score `user` directly against the reference stored for `pose_id`
    ///
    /// # Errors
    ///
    /// Returns `Error::ReferenceNotFound` when no reference is stored, or
    /// the store's error when the reference cannot be read.
    pub fn compare_with_store(
        &self,
        pose_id: &str,
        user: &LandmarkSet,
        store: &dyn ReferenceStore,
    ) -> Result<ComparisonResult> {
        let reference = store.get_reference(pose_id)?;
        log::debug!("Comparing against stored reference for {pose_id}");
        Ok(self.comparator.compare(user, &reference.landmarks))
    }

    fn score(
        &self,
        pose_id: &str,
        user: &LandmarkSet,
        reference: Option<&LandmarkSet>,
        mut warnings: Vec<String>,
    ) -> AccuracyResult {
        let pose = match self.catalog.criteria(pose_id) {
            Ok(pose) => pose,
            Err(_) => {
                log::warn!("No criteria configured for pose {pose_id}");
                return AccuracyResult::failed(pose_id, EvaluationFailure::ConfigNotFound {
                    pose_id: pose_id.to_string(),
                });
            }
        };

        let missing = user.missing(&pose.required_landmarks);
        if !missing.is_empty() {
            let failure = EvaluationFailure::MissingRequiredLandmarks { missing };
            log::warn!("Cannot score {pose_id}: {failure}");
            let mut result = AccuracyResult::failed(pose_id, failure);
            result.view = Some(pose.view);
            return result;
        }

        warnings.extend(self.visibility_warning(pose, user));

        let angles = evaluate_angles(user, &pose.angle_criteria, self.config.visibility.angle);

        let connections = (!pose.connection_criteria.is_empty()).then(|| {
            let frame = self.connection_frame(user);
            evaluate_connections(&frame, &pose.connection_criteria, self.config.visibility.connection)
        });

        let position = reference.map(|reference| self.matcher.match_landmarks(user, reference, &pose.required_landmarks));

        let combined = self.combiner.combine(&angles, connections.as_ref(), position.as_ref());
        warnings.extend(combined.warnings);

        AccuracyResult {
            pose_id: pose_id.to_string(),
            view: Some(pose.view),
            warnings,
            ..combined
        }
    }

    fn visibility_warning(&self, pose: &PoseCriteriaSet, user: &LandmarkSet) -> Option<String> {
        let dim: Vec<String> = pose
            .required_landmarks
            .iter()
            .filter_map(|&name| user.get(name))
            .filter(|lm| !lm.is_visible(self.config.visibility.angle))
            .map(|lm| format!("{} ({:.0}%)", lm.name, lm.visibility * 100.0))
            .collect();

        (!dim.is_empty()).then(|| format!("Low visibility landmarks: {}", dim.join(", ")))
    }

    fn connection_frame<'a>(&self, user: &'a LandmarkSet) -> Cow<'a, LandmarkSet> {
        match self.config.connection.space {
            ConnectionSpace::Image => Cow::Borrowed(user),
            ConnectionSpace::HipCentered => Cow::Owned(normalize(user, CenteringStrategy::HipCenter)),
            ConnectionSpace::BoundingBox => Cow::Owned(normalize(
                user,
                CenteringStrategy::BoundingBox {
                    visibility_floor: self.config.visibility.bounding_box,
                },
            )),
        }
    }
}
