//! Yoga pose accuracy scoring from detected body landmarks.
//!
//! Given the 33 body landmarks of a practitioner and the identifier of the
//! target pose, this library computes how closely the body matches the pose:
//! - Joint angles compared against authored targets with a tolerance band
//! - Contact checks between pairs of landmarks (e.g. a hand holding a foot)
//! - Optional whole-pose comparison against a stored reference
//!
//! The evaluation pipeline consists of:
//! 1. Catalog lookup of the pose's criteria
//! 2. Validation that the required landmarks were detected
//! 3. Angle and connection scoring per criterion
//! 4. Position matching when reference landmarks are available
//! 5. Weighted combination into one accuracy with ranked feedback
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use yoga_pose_accuracy::{catalog::Catalog, engine::{AccuracyEngine, EvaluateRequest}, landmark::LandmarkSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::builtin()?;
//! let engine = AccuracyEngine::with_defaults(&catalog);
//!
//! let json = std::fs::read_to_string("landmarks.json")?;
//! let landmarks: LandmarkSet = serde_json::from_str(&json)?;
//!
//! let result = engine.evaluate(&EvaluateRequest::new("Tree_Pose_or_Vrksasana__front", landmarks));
//! println!("Accuracy: {:.1}%", result.overall_accuracy);
//! for line in &result.feedback {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Position Matching Against Stored References
//!
//! ```no_run
//! use yoga_pose_accuracy::{catalog::Catalog, config::Config, engine::AccuracyEngine,
//!                          landmark::LandmarkSet, reference::DirectoryReferenceStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.yaml")?;
//! let catalog = Catalog::builtin()?;
//! let engine = AccuracyEngine::new(&catalog, config.scoring)?;
//! let store = DirectoryReferenceStore::new("data/reference_poses/keypoints");
//!
//! let landmarks: LandmarkSet = serde_json::from_str(&std::fs::read_to_string("landmarks.json")?)?;
//! let result = engine.evaluate_with_store("Akarna_Dhanurasana_front", &landmarks, &store);
//! println!("{}", serde_json::to_string_pretty(&result.rounded())?);
//! # Ok(())
//! # }
//! ```

/// Body landmark vocabulary and landmark sets
pub mod landmark;

/// Translation and scale normalization of landmark sets
pub mod normalize;

/// Angle, connection and position scoring with the combiner
pub mod scoring;

/// Pose criteria catalog
pub mod catalog;

/// Stored reference poses
pub mod reference;

/// Evaluation pipeline
pub mod engine;

/// Evaluation results
pub mod result;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
