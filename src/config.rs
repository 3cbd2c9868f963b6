//! Configuration management for the pose accuracy engine

use crate::constants::{
    DEFAULT_ANGLE_VISIBILITY_FLOOR, DEFAULT_BOUNDING_BOX_VISIBILITY_FLOOR, DEFAULT_CONNECTION_VISIBILITY_FLOOR,
    DEFAULT_POSITION_LANDMARK_MAX_DISTANCE, DEFAULT_POSITION_OVERALL_MAX_DISTANCE, DEFAULT_POSITION_VISIBILITY_FLOOR,
};
use crate::scoring::combiner::CombinerWeights;
use crate::scoring::reference_comparison::ComparisonConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose criteria catalog
    pub catalog: CatalogConfig,

    /// Reference poses for position matching
    pub references: ReferenceConfig,

    /// Scoring parameters
    pub scoring: EngineConfig,
}

/// Where to load pose criteria from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog YAML file; the built-in catalog is used when unset
    pub path: Option<PathBuf>,

    /// Fail the whole load on the first malformed pose
    pub strict: bool,
}

/// Reference pose lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Directory holding `<pose_id>.json` reference files
    pub directory: Option<PathBuf>,

    /// Compare against the stored reference when one exists
    pub use_position_matching: bool,
}

/// Scoring parameters consumed by [`crate::engine::AccuracyEngine`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Visibility floors per evaluator
    pub visibility: VisibilityConfig,

    /// Connection measurement
    pub connection: ConnectionConfig,

    /// Position matching distance bands
    pub position: PositionConfig,

    /// Sub-score weighting
    pub weights: CombinerWeights,

    /// Criteria-free comparison against a reference pose
    pub comparison: ComparisonConfig,
}

/// Visibility floors (0.0-1.0). Each evaluator has its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Below this an angle is still scored but flagged
    pub angle: f64,

    /// Below this a connection is `not_visible`
    pub connection: f64,

    /// User landmarks below this are left out of position matching
    pub position: f64,

    /// Landmarks must exceed this to shape the normalization bounding box
    pub bounding_box: f64,
}

/// Coordinate frame connection distances are measured in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionSpace {
    /// Detector coordinates, in which authored distances are expressed
    #[default]
    Image,
    /// Hip-centered frame with shoulder-width units
    HipCentered,
    /// Bounding-box frame with unit longer side
    BoundingBox,
}

/// Connection measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub space: ConnectionSpace,
}

/// Position matching distance bands (normalized units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// Distance at which a single landmark scores 0
    pub landmark_max_distance: f64,

    /// Mean distance at which the overall position score reaches 0
    pub overall_max_distance: f64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            strict: false,
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            directory: None,
            use_position_matching: true,
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            angle: DEFAULT_ANGLE_VISIBILITY_FLOOR,
            connection: DEFAULT_CONNECTION_VISIBILITY_FLOOR,
            position: DEFAULT_POSITION_VISIBILITY_FLOOR,
            bounding_box: DEFAULT_BOUNDING_BOX_VISIBILITY_FLOOR,
        }
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            landmark_max_distance: DEFAULT_POSITION_LANDMARK_MAX_DISTANCE,
            overall_max_distance: DEFAULT_POSITION_OVERALL_MAX_DISTANCE,
        }
    }
}

impl EngineConfig {
    /// Validate scoring parameters
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for a floor outside `[0, 1]`, a
    /// non-positive distance band or a weight split that does not sum to 1.
    pub fn validate(&self) -> Result<()> {
        let floors = [
            ("angle", self.visibility.angle),
            ("connection", self.visibility.connection),
            ("position", self.visibility.position),
            ("bounding_box", self.visibility.bounding_box),
        ];
        for (name, floor) in floors {
            if !(0.0..=1.0).contains(&floor) {
                return Err(Error::ConfigError(format!(
                    "Visibility floor {name} must be between 0.0 and 1.0"
                )));
            }
        }

        let distances = [
            ("landmark_max_distance", self.position.landmark_max_distance),
            ("overall_max_distance", self.position.overall_max_distance),
        ];
        for (name, distance) in distances {
            if !(distance > 0.0 && distance.is_finite()) {
                return Err(Error::ConfigError(format!(
                    "Position {name} must be a finite value greater than 0, got {distance}"
                )));
            }
        }

        self.weights.validate()?;
        self.comparison.validate()
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;

        if let Some(path) = &self.catalog.path {
            if !path.exists() {
                return Err(Error::ConfigError(format!("Catalog file not found: {}", path.display())));
            }
        }
        if let Some(directory) = &self.references.directory {
            if !directory.is_dir() {
                return Err(Error::ConfigError(format!(
                    "Reference directory not found: {}",
                    directory.display()
                )));
            }
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Yoga Pose Accuracy Configuration

# Pose criteria catalog (omit path to use the built-in catalog)
catalog:
  strict: false

# Reference poses for position matching
references:
  # directory: "data/reference_poses/keypoints"
  use_position_matching: true

scoring:
  # Visibility floors per evaluator (0.0-1.0)
  visibility:
    angle: 0.5
    connection: 0.1
    position: 0.3
    bounding_box: 0.3

  # Frame for connection distances: image, hip_centered or bounding_box
  connection:
    space: image

  position:
    landmark_max_distance: 0.3
    overall_max_distance: 0.5

  # Each split must sum to 1.0
  weights:
    angle_with_connection: 0.7
    connection_with_angle: 0.3
    position_weight: 0.2
    full_angle: 0.6
    full_position: 0.25
    full_connection: 0.15

  # Direct comparison against a reference pose, without pose criteria
  comparison:
    angle_weight: 0.6
    distance_weight: 0.4
    angle_penalty: 0.5
    distance_decay: 10.0
    visibility: 0.5
"#;
