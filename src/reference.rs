//! Stored reference poses for position matching.

use crate::catalog::View;
use crate::landmark::LandmarkSet;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Landmarks of a pose performed correctly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePose {
    /// Pose this reference belongs to; empty when the file omits it
    #[serde(default)]
    pub pose_id: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Camera view the reference was captured from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    /// Reference landmarks in image-normalized coordinates
    #[serde(alias = "keypoints")]
    pub landmarks: LandmarkSet,
}

impl ReferencePose {
    #[must_use]
    pub fn new(pose_id: impl Into<String>, landmarks: LandmarkSet) -> Self {
        Self {
            pose_id: pose_id.into(),
            name: None,
            view: None,
            landmarks,
        }
    }
}

/// Parse landmarks from either a bare JSON list or a reference pose document.
///
/// # Errors
///
/// Returns `Error::Json` for malformed JSON or landmarks that fail
/// validation, reported against the form the document actually has.
pub fn parse_landmarks_document(content: &str) -> Result<LandmarkSet> {
    let document: serde_json::Value = serde_json::from_str(content)?;
    if document.is_array() {
        return Ok(serde_json::from_value(document)?);
    }
    let reference: ReferencePose = serde_json::from_value(document)?;
    Ok(reference.landmarks)
}

/// Source of reference poses
pub trait ReferenceStore: Send + Sync {
    /// Fetch the reference for a pose
    ///
    /// # Errors
    ///
    /// Returns `Error::ReferenceNotFound` when no reference exists, or an
    /// I/O or parse error when one exists but cannot be read.
    fn get_reference(&self, pose_id: &str) -> Result<ReferencePose>;
}

/// References held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceStore {
    poses: HashMap<String, ReferencePose>,
}

impl InMemoryReferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the reference for `reference.pose_id`
    pub fn insert(&mut self, reference: ReferencePose) {
        self.poses.insert(reference.pose_id.clone(), reference);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl ReferenceStore for InMemoryReferenceStore {
    fn get_reference(&self, pose_id: &str) -> Result<ReferencePose> {
        self.poses
            .get(pose_id)
            .cloned()
            .ok_or_else(|| Error::ReferenceNotFound(pose_id.to_string()))
    }
}

/// References stored as `<directory>/<pose_id>.json`
#[derive(Debug, Clone)]
pub struct DirectoryReferenceStore {
    directory: PathBuf,
}

impl DirectoryReferenceStore {
    #[must_use]
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, pose_id: &str) -> Result<PathBuf> {
        if pose_id.is_empty() || pose_id.contains(&['/', '\\'][..]) || pose_id.contains("..") {
            return Err(Error::InvalidInput(format!("Invalid pose id for reference lookup: {pose_id}")));
        }
        Ok(self.directory.join(format!("{pose_id}.json")))
    }
}

impl ReferenceStore for DirectoryReferenceStore {
    fn get_reference(&self, pose_id: &str) -> Result<ReferencePose> {
        let path = self.path_for(pose_id)?;
        if !path.is_file() {
            log::debug!("No reference file at {}", path.display());
            return Err(Error::ReferenceNotFound(pose_id.to_string()));
        }

        let content = std::fs::read_to_string(&path)?;
        let mut reference: ReferencePose = serde_json::from_str(&content)?;
        if reference.pose_id.is_empty() {
            reference.pose_id = pose_id.to_string();
        }

        log::debug!(
            "Loaded reference for {} with {} landmarks",
            pose_id,
            reference.landmarks.len()
        );
        Ok(reference)
    }
}
