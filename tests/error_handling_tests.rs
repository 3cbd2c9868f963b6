//! Error handling tests for all modules


use test_helpers::{catalog, standing_body};
use yoga_pose_accuracy::{
    catalog::Catalog,
    config::{Config, EngineConfig},
    engine::{AccuracyEngine, EvaluateRequest},
    landmark::{Landmark, LandmarkName, LandmarkSet},
    reference::{DirectoryReferenceStore, InMemoryReferenceStore, ReferencePose, ReferenceStore},
    result::EvaluationFailure,
    Error,
};

const LEG: &str = r#"
poses:
  - pose_id: Straight_Leg
    view: side
    required_landmarks: [left_hip, left_knee, left_ankle]
    angle_criteria:
      - name: left leg
        point_a: left_hip
        vertex: left_knee
        point_b: left_ankle
        target_angle: 180.0
        tolerance: 20.0
"#;

#[test]
fn test_landmark_parse_errors() {
    // Id out of range
    let result: Result<Landmark, _> = serde_json::from_str(r#"{"id": 33, "x": 0.1, "y": 0.2}"#);
    assert!(result.is_err());

    // Unknown name
    let result: Result<Landmark, _> = serde_json::from_str(r#"{"id": 0, "name": "snout", "x": 0.1, "y": 0.2}"#);
    assert!(result.is_err());

    // Name and id disagree
    let result: Result<Landmark, _> = serde_json::from_str(r#"{"id": 0, "name": "left_knee", "x": 0.1, "y": 0.2}"#);
    assert!(result.is_err());

    // Negative visibility
    let result: Result<Landmark, _> =
        serde_json::from_str(r#"{"id": 0, "x": 0.1, "y": 0.2, "visibility": -0.1}"#);
    assert!(result.is_err());

    // One bad entry fails the whole set
    let result: Result<LandmarkSet, _> =
        serde_json::from_str(r#"[{"id": 0, "x": 0.1, "y": 0.2}, {"id": 99, "x": 0.1, "y": 0.2}]"#);
    assert!(result.is_err());
}

#[test]
fn test_landmark_name_parse_error_variant() {
    match "left_anke".parse::<LandmarkName>() {
        Err(Error::InvalidInput(msg)) => assert!(msg.contains("left_anke")),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_unknown_pose_is_reported_not_raised() {
    let catalog = catalog(LEG);
    let engine = AccuracyEngine::with_defaults(&catalog);
    let result = engine.evaluate(&EvaluateRequest::new("Warrior_IV", standing_body()));

    assert!(!result.is_success());
    assert_eq!(result.overall_accuracy, 0.0);
    assert_eq!(
        result.failure,
        Some(EvaluationFailure::ConfigNotFound {
            pose_id: "Warrior_IV".to_string()
        })
    );
    assert!(result.warnings[0].contains("Warrior_IV"));
    assert!(matches!(catalog.criteria("Warrior_IV"), Err(Error::ConfigNotFound(_))));
}

#[test]
fn test_empty_landmark_set_lists_every_required_landmark() {
    let catalog = catalog(LEG);
    let engine = AccuracyEngine::with_defaults(&catalog);
    let result = engine.evaluate(&EvaluateRequest::new("Straight_Leg", LandmarkSet::new()));

    match result.failure {
        Some(EvaluationFailure::MissingRequiredLandmarks { missing }) => assert_eq!(
            missing,
            vec![LandmarkName::LeftHip, LandmarkName::LeftKnee, LandmarkName::LeftAnkle]
        ),
        other => panic!("Expected MissingRequiredLandmarks, got {other:?}"),
    }
}

#[test]
fn test_engine_rejects_invalid_config() {
    let catalog = Catalog::default();

    let mut config = EngineConfig::default();
    config.visibility.angle = -0.5;
    assert!(matches!(AccuracyEngine::new(&catalog, config), Err(Error::ConfigError(_))));

    let mut config = EngineConfig::default();
    config.weights.angle_with_connection = 0.5;
    assert!(matches!(AccuracyEngine::new(&catalog, config), Err(Error::ConfigError(_))));

    let mut config = EngineConfig::default();
    config.position.overall_max_distance = -1.0;
    assert!(AccuracyEngine::new(&catalog, config).is_err());
}

#[test]
fn test_file_errors() {
    assert!(matches!(
        Config::from_file("/nonexistent/config.yaml"),
        Err(Error::Io(_))
    ));
    assert!(matches!(
        Catalog::from_file("/nonexistent/pose_criteria.yaml", false),
        Err(Error::Io(_))
    ));

    let path = std::env::temp_dir().join(format!("yoga-accuracy-bad-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "scoring: [not, a, map]").unwrap();
    assert!(matches!(Config::from_file(&path), Err(Error::ConfigError(_))));
    std::fs::remove_file(path).ok();
}

#[test]
fn test_unreadable_reference_warns_and_skips_position() {
    let dir = std::env::temp_dir().join(format!("yoga-accuracy-refs-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Straight_Leg.json"), r#"{"keypoints": [{"id": 77, "x": 0, "y": 0}]}"#).unwrap();

    let catalog = catalog(LEG);
    let engine = AccuracyEngine::with_defaults(&catalog);
    let store = DirectoryReferenceStore::new(&dir);

    assert!(matches!(store.get_reference("Straight_Leg"), Err(Error::Json(_))));

    let result = engine.evaluate_with_store("Straight_Leg", &standing_body(), &store);
    assert!(result.is_success());
    assert!(result.position_accuracy.is_none());
    assert!(result.warnings.iter().any(|w| w.contains("Reference pose could not be loaded")));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_reference_store_not_found() {
    let store = InMemoryReferenceStore::new();
    match store.get_reference("Straight_Leg") {
        Err(Error::ReferenceNotFound(id)) => assert_eq!(id, "Straight_Leg"),
        other => panic!("Expected ReferenceNotFound, got {other:?}"),
    }
}

#[test]
fn test_reference_store_is_object_safe() {
    let mut memory = InMemoryReferenceStore::new();
    memory.insert(ReferencePose::new("Straight_Leg", standing_body()));
    let stores: Vec<Box<dyn ReferenceStore>> = vec![
        Box::new(memory),
        Box::new(DirectoryReferenceStore::new(std::env::temp_dir())),
    ];

    assert!(stores[0].get_reference("Straight_Leg").is_ok());
    assert!(matches!(stores[1].get_reference("No_Such_Pose_Stored"), Err(Error::ReferenceNotFound(_))));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        Error::ConfigNotFound("Tree".to_string()).to_string(),
        "No criteria configured for pose: Tree"
    );
    assert_eq!(
        Error::ReferenceNotFound("Tree".to_string()).to_string(),
        "No reference pose stored for: Tree"
    );
}
