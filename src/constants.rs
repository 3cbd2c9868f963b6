//! Constants used throughout the scoring engine

/// Number of body landmarks produced by the pose detector
pub const NUM_BODY_LANDMARKS: usize = 33;

/// Visibility floors, one per evaluator
pub const DEFAULT_ANGLE_VISIBILITY_FLOOR: f64 = 0.5;
pub const DEFAULT_CONNECTION_VISIBILITY_FLOOR: f64 = 0.1;
pub const DEFAULT_POSITION_VISIBILITY_FLOOR: f64 = 0.3;
pub const DEFAULT_BOUNDING_BOX_VISIBILITY_FLOOR: f64 = 0.3;

/// Score at exactly one tolerance of deviation
pub const TOLERANCE_EDGE_SCORE: f64 = 85.0;

/// Maximum score
pub const MAX_SCORE: f64 = 100.0;

/// Status bucket thresholds
pub const EXCELLENT_THRESHOLD: f64 = 85.0;
pub const GOOD_THRESHOLD: f64 = 70.0;
pub const NEEDS_IMPROVEMENT_THRESHOLD: f64 = 50.0;

/// Overall accuracy tiers for the summary message
pub const MASTERED_TIER: f64 = 90.0;
pub const GREAT_TIER: f64 = 80.0;
pub const GOOD_TIER: f64 = 70.0;
pub const NEEDS_WORK_TIER: f64 = 50.0;

/// Position matching distance bands (normalized units)
pub const DEFAULT_POSITION_LANDMARK_MAX_DISTANCE: f64 = 0.3;
pub const DEFAULT_POSITION_OVERALL_MAX_DISTANCE: f64 = 0.5;

/// Mean distance assumed when no landmark could be matched
pub const UNMATCHED_MEAN_DISTANCE: f64 = 1.0;

/// Combiner weights
pub const DEFAULT_ANGLE_WITH_CONNECTION_WEIGHT: f64 = 0.7;
pub const DEFAULT_CONNECTION_WITH_ANGLE_WEIGHT: f64 = 0.3;
pub const DEFAULT_POSITION_WEIGHT: f64 = 0.2;
pub const DEFAULT_FULL_ANGLE_WEIGHT: f64 = 0.6;
pub const DEFAULT_FULL_POSITION_WEIGHT: f64 = 0.25;
pub const DEFAULT_FULL_CONNECTION_WEIGHT: f64 = 0.15;

/// Shoulder width below which hip-centered normalization uses the fallback scale
pub const MIN_SHOULDER_WIDTH: f64 = 0.01;
pub const FALLBACK_SHOULDER_SCALE: f64 = 0.1;

/// Scale used when the visible bounding box collapses to a point
pub const DEGENERATE_BOX_SCALE: f64 = 1.0;

/// Guards the vector-norm product in angle computation
pub const ANGLE_EPSILON: f64 = 1e-6;

/// Catalog authoring defaults
pub const DEFAULT_ANGLE_TOLERANCE: f64 = 15.0;
pub const DEFAULT_CRITERION_WEIGHT: f64 = 1.0;
pub const DEFAULT_CONNECTION_MAX_DISTANCE: f64 = 0.1;

/// Maximum representable joint angle in degrees
pub const MAX_ANGLE_DEGREES: f64 = 180.0;

/// Tolerance used when checking that weight splits sum to one
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Direct reference comparison
pub const DEFAULT_COMPARISON_ANGLE_WEIGHT: f64 = 0.6;
pub const DEFAULT_COMPARISON_DISTANCE_WEIGHT: f64 = 0.4;
/// Points lost per degree of joint-angle difference
pub const DEFAULT_COMPARISON_ANGLE_PENALTY: f64 = 0.5;
/// Exponential decay rate of the distance similarity
pub const DEFAULT_COMPARISON_DISTANCE_DECAY: f64 = 10.0;
/// Both sides must exceed this visibility for a landmark to enter the distance similarity
pub const DEFAULT_COMPARISON_VISIBILITY_FLOOR: f64 = 0.5;

/// Joint and overall tiers for reference comparison feedback
pub const COMPARISON_EXCELLENT_TIER: f64 = 90.0;
pub const COMPARISON_GOOD_TIER: f64 = 75.0;
pub const COMPARISON_FAIR_TIER: f64 = 50.0;
