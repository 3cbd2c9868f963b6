//! Command-line scorer for yoga pose attempts.

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};
use yoga_pose_accuracy::catalog::Catalog;
use yoga_pose_accuracy::config::Config;
use yoga_pose_accuracy::engine::{AccuracyEngine, EvaluateRequest};
use yoga_pose_accuracy::landmark::LandmarkSet;
use yoga_pose_accuracy::reference::{parse_landmarks_document, DirectoryReferenceStore};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pose identifier from the catalog
    #[arg(short, long, required_unless_present = "list_poses")]
    pose: Option<String>,

    /// JSON file with the user's landmarks (a list, or an object with `keypoints`)
    #[arg(short, long, required_unless_present = "list_poses")]
    landmarks: Option<PathBuf>,

    /// JSON file with reference landmarks for position matching
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Directory of `<pose_id>.json` reference files
    #[arg(long)]
    references_dir: Option<PathBuf>,

    /// Skip position matching even when a reference is available
    #[arg(long)]
    no_position_matching: bool,

    /// Compare directly against the reference pose instead of the catalog criteria
    #[arg(long, conflicts_with = "no_position_matching")]
    compare: bool,

    /// Pose criteria catalog (YAML); the built-in catalog is used otherwise
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<PathBuf>,

    /// List the poses in the catalog and exit
    #[arg(long)]
    list_poses: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            Config::from_file(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(path) = &args.catalog {
        config.catalog.path = Some(path.clone());
    }
    if let Some(dir) = &args.references_dir {
        config.references.directory = Some(dir.clone());
    }
    if args.no_position_matching {
        config.references.use_position_matching = false;
    }
    config.validate()?;

    let catalog = match &config.catalog.path {
        Some(path) => Catalog::from_file(path, config.catalog.strict)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::builtin()?,
    };

    if args.list_poses {
        for pose_id in catalog.pose_ids() {
            println!("{pose_id}");
        }
        return Ok(());
    }

    let (Some(pose_id), Some(landmarks_path)) = (&args.pose, &args.landmarks) else {
        bail!("--pose and --landmarks are required");
    };

    let engine = AccuracyEngine::new(&catalog, config.scoring)?;
    let user = read_landmarks(landmarks_path)?;
    info!("Scoring {} landmarks against {pose_id}", user.len());

    if args.compare {
        let comparison = match (&args.reference, &config.references.directory) {
            (Some(path), _) => engine.compare_to_reference(&user, &read_landmarks(path)?),
            (None, Some(dir)) => engine
                .compare_with_store(pose_id, &user, &DirectoryReferenceStore::new(dir))
                .with_context(|| format!("loading reference for {pose_id}"))?,
            (None, None) => bail!("--compare needs --reference or a references directory"),
        };
        println!("{}", serde_json::to_string_pretty(&comparison.rounded())?);
        return Ok(());
    }

    let result = match (&args.reference, &config.references.directory) {
        _ if !config.references.use_position_matching => engine.evaluate(&EvaluateRequest::new(pose_id.as_str(), user)),
        (Some(path), _) => {
            let reference = read_landmarks(path)?;
            engine.evaluate(&EvaluateRequest::new(pose_id.as_str(), user).with_reference(reference))
        }
        (None, Some(dir)) => engine.evaluate_with_store(pose_id, &user, &DirectoryReferenceStore::new(dir)),
        (None, None) => engine.evaluate(&EvaluateRequest::new(pose_id.as_str(), user)),
    };

    println!("{}", serde_json::to_string_pretty(&result.rounded())?);

    Ok(())
}

/// Read landmarks from either a bare JSON list or a reference pose document
fn read_landmarks(path: &Path) -> Result<LandmarkSet> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    parse_landmarks_document(&content).with_context(|| format!("parsing landmarks in {}", path.display()))
}
