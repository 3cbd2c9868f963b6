//! Body landmark vocabulary and landmark sets.
//!
//! The pose detector emits 33 anatomical landmarks in a fixed order. Every
//! landmark can be addressed either by its index or by its snake_case name;
//! both resolve to the same [`LandmarkName`].

use crate::constants::NUM_BODY_LANDMARKS;
use crate::{Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Anatomical landmark identifiers in detector index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkName {
    /// All landmarks, indexed by detector id
    pub const ALL: [Self; NUM_BODY_LANDMARKS] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Detector index of this landmark (0-32)
    #[must_use]
    pub const fn id(self) -> usize {
        self as usize
    }

    /// Look up a landmark by detector index
    #[must_use]
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// Canonical snake_case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown landmark name: {s}")))
    }
}

/// A single detected body landmark.
///
/// Coordinates are whatever frame the producer used: the detector emits
/// image-normalized `x`/`y` in `[0, 1]`, while normalized copies may be
/// negative. `visibility` is always in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLandmark", into = "RawLandmark")]
pub struct Landmark {
    /// Which anatomical point this is
    pub name: LandmarkName,
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
    /// Depth coordinate
    pub z: f64,
    /// Detector confidence that the point is visible (0.0-1.0)
    pub visibility: f64,
}

impl Landmark {
    /// Create a new landmark
    #[must_use]
    pub const fn new(name: LandmarkName, x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            name,
            x,
            y,
            z,
            visibility,
        }
    }

    /// Detector index of this landmark
    #[must_use]
    pub const fn id(&self) -> usize {
        self.name.id()
    }

    /// Check if the landmark clears a visibility floor
    #[must_use]
    pub fn is_visible(&self, floor: f64) -> bool {
        self.visibility >= floor
    }

    /// Planar position, ignoring depth
    #[must_use]
    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Planar Euclidean distance to another landmark
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.position(), &other.position())
    }
}

/// Wire form of a landmark: id is mandatory, name is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLandmark {
    #[serde(alias = "landmark_id")]
    id: usize,
    #[serde(default)]
    name: Option<String>,
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default = "default_visibility")]
    visibility: f64,
}

fn default_visibility() -> f64 {
    1.0
}

impl TryFrom<RawLandmark> for Landmark {
    type Error = Error;

    fn try_from(raw: RawLandmark) -> Result<Self> {
        let by_id = LandmarkName::from_id(raw.id)
            .ok_or_else(|| Error::InvalidInput(format!("Landmark id {} out of range 0-32", raw.id)))?;

        if let Some(name) = raw.name.as_deref() {
            let by_name: LandmarkName = name.parse()?;
            if by_name != by_id {
                return Err(Error::InvalidInput(format!(
                    "Landmark id {} ({by_id}) does not match name {name}",
                    raw.id
                )));
            }
        }

        if !(0.0..=1.0).contains(&raw.visibility) {
            return Err(Error::InvalidInput(format!(
                "Visibility {} of {by_id} must be between 0.0 and 1.0",
                raw.visibility
            )));
        }

        Ok(Self::new(by_id, raw.x, raw.y, raw.z, raw.visibility))
    }
}

impl From<Landmark> for RawLandmark {
    fn from(landmark: Landmark) -> Self {
        Self {
            id: landmark.id(),
            name: Some(landmark.name.as_str().to_string()),
            x: landmark.x,
            y: landmark.y,
            z: landmark.z,
            visibility: landmark.visibility,
        }
    }
}

/// Landmarks of one body, addressable by name.
///
/// A set may be partial. When the same landmark is supplied twice the later
/// entry wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    slots: [Option<Landmark>; NUM_BODY_LANDMARKS],
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            slots: [None; NUM_BODY_LANDMARKS],
        }
    }
}

impl LandmarkSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a landmark
    pub fn insert(&mut self, landmark: Landmark) {
        self.slots[landmark.id()] = Some(landmark);
    }

    /// Look up a landmark by name
    #[must_use]
    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.slots[name.id()].as_ref()
    }

    /// Whether the landmark is present at all
    #[must_use]
    pub fn contains(&self, name: LandmarkName) -> bool {
        self.slots[name.id()].is_some()
    }

    /// Number of distinct landmarks present
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no landmark is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Whether all 33 landmarks are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Iterate present landmarks in detector order
    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.slots.iter().flatten()
    }

    /// Names from `names` that are absent, preserving input order
    #[must_use]
    pub fn missing<'a, I>(&self, names: I) -> Vec<LandmarkName>
    where
        I: IntoIterator<Item = &'a LandmarkName>,
    {
        names.into_iter().copied().filter(|name| !self.contains(*name)).collect()
    }

    /// Build a new set by transforming every present landmark
    #[must_use]
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&Landmark) -> Landmark,
    {
        let mut mapped = Self::new();
        for landmark in self.iter() {
            mapped.insert(f(landmark));
        }
        mapped
    }

    /// Copy the present landmarks into a vector
    #[must_use]
    pub fn to_vec(&self) -> Vec<Landmark> {
        self.iter().copied().collect()
    }
}

impl FromIterator<Landmark> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        let mut set = Self::new();
        for landmark in iter {
            set.insert(landmark);
        }
        set
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(landmarks: Vec<Landmark>) -> Self {
        landmarks.into_iter().collect()
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.to_vec()
    }
}
