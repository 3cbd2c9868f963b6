//! Pose criteria catalog.
//!
//! Maps a pose identifier to the landmarks it needs and the angle and
//! connection criteria it is scored against. Catalogs are authored as YAML
//! and validated against the landmark vocabulary when loaded; a malformed
//! pose is rejected, never repaired.

use crate::constants::{DEFAULT_ANGLE_TOLERANCE, DEFAULT_CONNECTION_MAX_DISTANCE, DEFAULT_CRITERION_WEIGHT, MAX_ANGLE_DEGREES};
use crate::landmark::LandmarkName;
use crate::scoring::Criterion;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Catalog bundled with the crate
const BUILTIN_CATALOG: &str = include_str!("../data/pose_criteria.yaml");

/// Camera viewpoint a pose was authored for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Front,
    Side,
    Back,
}

impl std::str::FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(Self::Front),
            "side" => Ok(Self::Side),
            "back" => Ok(Self::Back),
            other => Err(Error::InvalidInput(format!("Unknown view: {other}"))),
        }
    }
}

/// Target angle at `vertex` between the rays to `point_a` and `point_b`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleCriterion {
    pub name: String,
    pub point_a: LandmarkName,
    pub vertex: LandmarkName,
    pub point_b: LandmarkName,
    /// Target in degrees, within `[0, 180]`
    pub target_angle: f64,
    /// Deviation in degrees that still scores 85
    pub tolerance: f64,
    pub weight: f64,
}

impl Criterion for AngleCriterion {
    fn name(&self) -> &str {
        &self.name
    }

    fn landmarks(&self) -> Vec<LandmarkName> {
        vec![self.point_a, self.vertex, self.point_b]
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Two landmarks that should be close together, e.g. a hand holding a foot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionCriterion {
    pub name: String,
    pub point_a: LandmarkName,
    pub point_b: LandmarkName,
    /// Distance at which the connection scores 0
    pub max_distance: f64,
    pub weight: f64,
}

impl Criterion for ConnectionCriterion {
    fn name(&self) -> &str {
        &self.name
    }

    fn landmarks(&self) -> Vec<LandmarkName> {
        vec![self.point_a, self.point_b]
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Everything needed to score one pose
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseCriteriaSet {
    pub pose_id: String,
    pub pose_name: String,
    pub view: View,
    /// Landmarks that must be present for the pose to be scored at all
    pub required_landmarks: Vec<LandmarkName>,
    /// Never empty
    pub angle_criteria: Vec<AngleCriterion>,
    pub connection_criteria: Vec<ConnectionCriterion>,
}

/// A pose dropped while loading a lenient catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogIssue {
    pub pose_id: String,
    pub reason: String,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pose '{}': {}", self.pose_id, self.reason)
    }
}

#[derive(Debug, Deserialize)]
struct AuthoredCatalog {
    #[serde(default)]
    poses: Vec<AuthoredPose>,
}

#[derive(Debug, Deserialize)]
struct AuthoredPose {
    pose_id: String,
    #[serde(default)]
    pose_name: Option<String>,
    view: String,
    #[serde(default)]
    required_landmarks: Vec<String>,
    #[serde(default)]
    angle_criteria: Vec<AuthoredAngle>,
    #[serde(default)]
    connection_criteria: Vec<AuthoredConnection>,
}

#[derive(Debug, Deserialize)]
struct AuthoredAngle {
    name: String,
    point_a: String,
    vertex: String,
    point_b: String,
    target_angle: f64,
    #[serde(default = "default_tolerance")]
    tolerance: f64,
    #[serde(default = "default_weight")]
    weight: f64,
}

#[derive(Debug, Deserialize)]
struct AuthoredConnection {
    name: String,
    point_a: String,
    point_b: String,
    #[serde(default = "default_max_distance")]
    max_distance: f64,
    #[serde(default = "default_weight")]
    weight: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_ANGLE_TOLERANCE
}

fn default_weight() -> f64 {
    DEFAULT_CRITERION_WEIGHT
}

fn default_max_distance() -> f64 {
    DEFAULT_CONNECTION_MAX_DISTANCE
}

fn landmark(name: &str, context: &str) -> std::result::Result<LandmarkName, String> {
    name.parse()
        .map_err(|_| format!("unknown landmark '{name}' in {context}"))
}

fn positive(value: f64, what: &str, context: &str) -> std::result::Result<f64, String> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{what} must be positive in {context}, got {value}"))
    }
}

impl AuthoredAngle {
    fn validate(self) -> std::result::Result<AngleCriterion, String> {
        let context = format!("angle '{}'", self.name);
        if !(0.0..=MAX_ANGLE_DEGREES).contains(&self.target_angle) {
            return Err(format!(
                "target_angle must be within 0-180 in {context}, got {}",
                self.target_angle
            ));
        }
        Ok(AngleCriterion {
            point_a: landmark(&self.point_a, &context)?,
            vertex: landmark(&self.vertex, &context)?,
            point_b: landmark(&self.point_b, &context)?,
            target_angle: self.target_angle,
            tolerance: positive(self.tolerance, "tolerance", &context)?,
            weight: positive(self.weight, "weight", &context)?,
            name: self.name,
        })
    }
}

impl AuthoredConnection {
    fn validate(self) -> std::result::Result<ConnectionCriterion, String> {
        let context = format!("connection '{}'", self.name);
        Ok(ConnectionCriterion {
            point_a: landmark(&self.point_a, &context)?,
            point_b: landmark(&self.point_b, &context)?,
            max_distance: positive(self.max_distance, "max_distance", &context)?,
            weight: positive(self.weight, "weight", &context)?,
            name: self.name,
        })
    }
}

impl AuthoredPose {
    fn validate(self) -> std::result::Result<PoseCriteriaSet, String> {
        let view: View = self
            .view
            .parse()
            .map_err(|_| format!("unknown view '{}'", self.view))?;

        let required_landmarks = self
            .required_landmarks
            .iter()
            .map(|name| landmark(name, "required_landmarks"))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if self.angle_criteria.is_empty() {
            return Err("no angle criteria".to_string());
        }
        let angle_criteria = self
            .angle_criteria
            .into_iter()
            .map(AuthoredAngle::validate)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let connection_criteria = self
            .connection_criteria
            .into_iter()
            .map(AuthoredConnection::validate)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let pose = PoseCriteriaSet {
            pose_name: self.pose_name.unwrap_or_else(|| self.pose_id.clone()),
            pose_id: self.pose_id,
            view,
            required_landmarks,
            angle_criteria,
            connection_criteria,
        };
        log_unrequired_landmarks(&pose);
        Ok(pose)
    }
}

fn log_unrequired_landmarks(pose: &PoseCriteriaSet) {
    let used = pose
        .angle_criteria
        .iter()
        .flat_map(|c| c.landmarks())
        .chain(pose.connection_criteria.iter().flat_map(|c| c.landmarks()));
    for name in used {
        if !pose.required_landmarks.contains(&name) {
            log::debug!("Pose '{}' scores {name}, which is not a required landmark", pose.pose_id);
        }
    }
}

/// Read-only mapping from pose id to its criteria
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    poses: BTreeMap<String, PoseCriteriaSet>,
    rejected: Vec<CatalogIssue>,
}

impl Catalog {
    /// Parse and validate a YAML catalog.
    ///
    /// In strict mode the first malformed pose fails the whole load. Otherwise
    /// malformed poses are dropped, logged and listed in [`Catalog::rejected`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Yaml` when the document is not a catalog and
    /// `Error::CatalogError` for a malformed pose in strict mode.
    pub fn from_yaml_str(content: &str, strict: bool) -> Result<Self> {
        let authored: AuthoredCatalog = serde_yaml::from_str(content)?;
        let mut catalog = Self::default();

        for pose in authored.poses {
            let pose_id = pose.pose_id.clone();
            let outcome = if catalog.poses.contains_key(&pose_id) {
                Err("duplicate pose id".to_string())
            } else {
                pose.validate()
            };

            match outcome {
                Ok(pose) => {
                    catalog.poses.insert(pose_id, pose);
                }
                Err(reason) => {
                    let issue = CatalogIssue { pose_id, reason };
                    if strict {
                        return Err(Error::CatalogError(issue.to_string()));
                    }
                    log::warn!("Rejected catalog entry: {issue}");
                    catalog.rejected.push(issue);
                }
            }
        }

        log::info!(
            "Loaded pose catalog: {} poses, {} rejected",
            catalog.poses.len(),
            catalog.rejected.len()
        );
        Ok(catalog)
    }

    /// Load a YAML catalog from disk
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` when the file cannot be read, otherwise as
    /// [`Catalog::from_yaml_str`].
    pub fn from_file<P: AsRef<Path>>(path: P, strict: bool) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("Reading pose catalog from {}", path.as_ref().display());
        Self::from_yaml_str(&content, strict)
    }

    /// The catalog bundled with the crate
    ///
    /// # Errors
    ///
    /// Fails only if the bundled data is malformed.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CATALOG, true)
    }

    #[must_use]
    pub fn get(&self, pose_id: &str) -> Option<&PoseCriteriaSet> {
        self.poses.get(pose_id)
    }

    /// Criteria for a pose
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` for an unknown pose id.
    pub fn criteria(&self, pose_id: &str) -> Result<&PoseCriteriaSet> {
        self.get(pose_id)
            .ok_or_else(|| Error::ConfigNotFound(pose_id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, pose_id: &str) -> bool {
        self.poses.contains_key(pose_id)
    }

    /// Pose ids in sorted order
    pub fn pose_ids(&self) -> impl Iterator<Item = &str> {
        self.poses.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Poses dropped during a lenient load
    #[must_use]
    pub fn rejected(&self) -> &[CatalogIssue] {
        &self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POSES: &str = r#"
poses:
  - pose_id: Tree_Pose_or_Vrksasana__front
    pose_name: Tree Pose
    view: front
    required_landmarks: [left_hip, left_knee, left_ankle]
    angle_criteria:
      - name: left leg
        point_a: left_hip
        vertex: left_knee
        point_b: left_ankle
        target_angle: 178.1
  - pose_id: Scale_Pose_or_Tolasana__front
    view: front
    required_landmarks: [left_hip, left_knee, left_ankle]
    angle_criteria:
      - name: left leg
        point_a: left_hip
        vertex: left_knee
        point_b: left_anke
        target_angle: 40.0
"#;

    #[test]
    fn test_defaults_applied() {
        let catalog = Catalog::from_yaml_str(TWO_POSES, false).unwrap();
        let pose = catalog.criteria("Tree_Pose_or_Vrksasana__front").unwrap();
        assert_eq!(pose.pose_name, "Tree Pose");
        assert_eq!(pose.view, View::Front);
        assert_eq!(pose.angle_criteria[0].tolerance, 15.0);
        assert_eq!(pose.angle_criteria[0].weight, 1.0);
        assert!(pose.connection_criteria.is_empty());
    }

    #[test]
    fn test_lenient_load_drops_bad_pose() {
        let catalog = Catalog::from_yaml_str(TWO_POSES, false).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains("Scale_Pose_or_Tolasana__front"));
        assert_eq!(catalog.rejected().len(), 1);
        assert!(catalog.rejected()[0].reason.contains("left_anke"));
    }

    #[test]
    fn test_strict_load_fails() {
        let err = Catalog::from_yaml_str(TWO_POSES, true).unwrap_err();
        assert!(matches!(err, Error::CatalogError(msg) if msg.contains("left_anke")));
    }

    #[test]
    fn test_unknown_pose_is_config_not_found() {
        let catalog = Catalog::from_yaml_str(TWO_POSES, false).unwrap();
        assert!(matches!(catalog.criteria("Unknown_Pose"), Err(Error::ConfigNotFound(id)) if id == "Unknown_Pose"));
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.len() > 50);
        assert!(catalog.rejected().is_empty());

        let tree = catalog.criteria("Tree_Pose_or_Vrksasana__front").unwrap();
        assert_eq!(tree.angle_criteria.len(), 4);
        assert_eq!(tree.required_landmarks.len(), 13);

        let archer = catalog.criteria("Akarna_Dhanurasana_front").unwrap();
        assert_eq!(archer.connection_criteria.len(), 2);
        assert_eq!(archer.connection_criteria[0].max_distance, 0.35);

        let ids: Vec<&str> = catalog.pose_ids().collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
