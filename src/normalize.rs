//! Landmark normalization into a translation and scale invariant frame.

use crate::constants::{DEGENERATE_BOX_SCALE, FALLBACK_SHOULDER_SCALE, MIN_SHOULDER_WIDTH};
use crate::landmark::{Landmark, LandmarkName, LandmarkSet};
use serde::{Deserialize, Serialize};

/// How to pick the origin and unit length of the normalized frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum CenteringStrategy {
    /// Origin at the hip midpoint, unit length is the shoulder width
    HipCenter,
    /// Origin at the center of the visible landmarks' bounding box,
    /// unit length is the longer box side
    BoundingBox {
        /// Landmarks must be strictly above this visibility to shape the box
        visibility_floor: f64,
    },
}

/// Map a landmark set into a normalized frame.
///
/// Returns a new set; visibility values are carried over untouched. When the
/// strategy lacks the anatomy it needs (an incomplete set for
/// [`CenteringStrategy::HipCenter`], no visible landmark for
/// [`CenteringStrategy::BoundingBox`]) the input is returned unchanged.
#[must_use]
pub fn normalize(landmarks: &LandmarkSet, strategy: CenteringStrategy) -> LandmarkSet {
    match strategy {
        CenteringStrategy::HipCenter => normalize_hip_center(landmarks),
        CenteringStrategy::BoundingBox { visibility_floor } => normalize_bounding_box(landmarks, visibility_floor),
    }
}

fn normalize_hip_center(landmarks: &LandmarkSet) -> LandmarkSet {
    if !landmarks.is_complete() {
        log::debug!(
            "Hip-center normalization needs all landmarks, got {}; leaving input unchanged",
            landmarks.len()
        );
        return landmarks.clone();
    }

    let (Some(left_hip), Some(right_hip), Some(left_shoulder), Some(right_shoulder)) = (
        landmarks.get(LandmarkName::LeftHip),
        landmarks.get(LandmarkName::RightHip),
        landmarks.get(LandmarkName::LeftShoulder),
        landmarks.get(LandmarkName::RightShoulder),
    ) else {
        return landmarks.clone();
    };

    let center = nalgebra::center(&left_hip.position(), &right_hip.position());

    let mut scale = left_shoulder.planar_distance(right_shoulder);
    if scale < MIN_SHOULDER_WIDTH {
        scale = FALLBACK_SHOULDER_SCALE;
    }

    landmarks.map(|lm| {
        Landmark::new(
            lm.name,
            (lm.x - center.x) / scale,
            (lm.y - center.y) / scale,
            lm.z / scale,
            lm.visibility,
        )
    })
}

fn normalize_bounding_box(landmarks: &LandmarkSet, visibility_floor: f64) -> LandmarkSet {
    let mut visible = landmarks.iter().filter(|lm| lm.visibility > visibility_floor).peekable();
    if visible.peek().is_none() {
        return landmarks.clone();
    }

    let (min_x, max_x, min_y, max_y) = visible.fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), lm| (min_x.min(lm.x), max_x.max(lm.x), min_y.min(lm.y), max_y.max(lm.y)),
    );

    let center_x = (min_x + max_x) / 2.0;
    let center_y = (min_y + max_y) / 2.0;
    let mut scale = (max_x - min_x).max(max_y - min_y);
    if scale == 0.0 {
        scale = DEGENERATE_BOX_SCALE;
    }

    landmarks.map(|lm| {
        Landmark::new(
            lm.name,
            (lm.x - center_x) / scale,
            (lm.y - center_y) / scale,
            lm.z,
            lm.visibility,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BOX: CenteringStrategy = CenteringStrategy::BoundingBox { visibility_floor: 0.3 };

    fn full_body(offset: f64, scale: f64) -> LandmarkSet {
        LandmarkName::ALL
            .iter()
            .map(|&name| {
                let i = name.id() as f64;
                let x = 0.3 + 0.4 * ((i * 0.37).sin() * 0.5 + 0.5);
                let y = 0.1 + 0.8 * (i / 32.0);
                Landmark::new(name, x * scale + offset, y * scale + offset, 0.1 * i * scale, 0.9)
            })
            .collect()
    }

    #[test]
    fn test_hip_center_moves_hips_to_origin() {
        let body = full_body(0.0, 1.0);
        let normalized = normalize(&body, CenteringStrategy::HipCenter);

        let left = normalized.get(LandmarkName::LeftHip).unwrap();
        let right = normalized.get(LandmarkName::RightHip).unwrap();
        assert!(((left.x + right.x) / 2.0).abs() < 1e-12);
        assert!(((left.y + right.y) / 2.0).abs() < 1e-12);

        let ls = normalized.get(LandmarkName::LeftShoulder).unwrap();
        let rs = normalized.get(LandmarkName::RightShoulder).unwrap();
        assert!((ls.planar_distance(rs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hip_center_scales_depth() {
        let body = full_body(0.0, 1.0);
        let ls = body.get(LandmarkName::LeftShoulder).unwrap();
        let rs = body.get(LandmarkName::RightShoulder).unwrap();
        let width = ls.planar_distance(rs);

        let normalized = normalize(&body, CenteringStrategy::HipCenter);
        let before = body.get(LandmarkName::RightFootIndex).unwrap();
        let after = normalized.get(LandmarkName::RightFootIndex).unwrap();
        assert!((after.z - before.z / width).abs() < 1e-9);
    }

    #[test]
    fn test_hip_center_incomplete_set_unchanged() {
        let partial: LandmarkSet = full_body(0.0, 1.0)
            .iter()
            .filter(|lm| lm.name != LandmarkName::LeftHeel)
            .copied()
            .collect();
        let normalized = normalize(&partial, CenteringStrategy::HipCenter);
        assert_eq!(normalized, partial);
    }

    #[test]
    fn test_hip_center_coincident_shoulders_use_fallback_scale() {
        let mut body = full_body(0.0, 1.0);
        let ls = *body.get(LandmarkName::LeftShoulder).unwrap();
        body.insert(Landmark::new(LandmarkName::RightShoulder, ls.x, ls.y, ls.z, ls.visibility));

        let normalized = normalize(&body, CenteringStrategy::HipCenter);
        for lm in normalized.iter() {
            assert!(lm.x.is_finite() && lm.y.is_finite() && lm.z.is_finite());
        }
        let hip = body.get(LandmarkName::LeftHip).unwrap();
        let other = body.get(LandmarkName::RightHip).unwrap();
        let nose = body.get(LandmarkName::Nose).unwrap();
        let expected = (nose.x - (hip.x + other.x) / 2.0) / FALLBACK_SHOULDER_SCALE;
        assert!((normalized.get(LandmarkName::Nose).unwrap().x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_unit_extent() {
        let normalized = normalize(&full_body(2.0, 3.0), BOX);
        let xs: Vec<f64> = normalized.iter().map(|lm| lm.x).collect();
        let ys: Vec<f64> = normalized.iter().map(|lm| lm.y).collect();
        let width = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max) - xs.iter().copied().fold(f64::INFINITY, f64::min);
        let height = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max) - ys.iter().copied().fold(f64::INFINITY, f64::min);
        assert!((width.max(height) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_ignores_low_visibility_extent() {
        let mut body = full_body(0.0, 1.0);
        body.insert(Landmark::new(LandmarkName::LeftHeel, 50.0, 50.0, 0.0, 0.3));
        let with_outlier = normalize(&body, BOX);

        let mut clean = body.clone();
        clean.insert(Landmark::new(LandmarkName::LeftHeel, 0.5, 0.5, 0.0, 0.3));
        let without_outlier = normalize(&clean, BOX);

        let a = with_outlier.get(LandmarkName::Nose).unwrap();
        let b = without_outlier.get(LandmarkName::Nose).unwrap();
        assert!((a.x - b.x).abs() < 1e-12);
        assert!((a.y - b.y).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box_single_point_uses_unit_scale() {
        let set: LandmarkSet = vec![Landmark::new(LandmarkName::Nose, 0.4, 0.6, 0.0, 0.9)].into();
        let normalized = normalize(&set, BOX);
        let nose = normalized.get(LandmarkName::Nose).unwrap();
        assert_eq!(nose.x, 0.0);
        assert_eq!(nose.y, 0.0);
    }

    #[test]
    fn test_bounding_box_nothing_visible_unchanged() {
        let set: LandmarkSet = vec![
            Landmark::new(LandmarkName::Nose, 0.4, 0.6, 0.0, 0.1),
            Landmark::new(LandmarkName::LeftHip, 0.7, 0.2, 0.0, 0.3),
        ]
        .into();
        assert_eq!(normalize(&set, BOX), set);
    }

    #[test]
    fn test_visibility_passes_through() {
        let body = full_body(0.0, 1.0);
        for strategy in [CenteringStrategy::HipCenter, BOX] {
            let normalized = normalize(&body, strategy);
            for (before, after) in body.iter().zip(normalized.iter()) {
                assert_eq!(before.visibility, after.visibility);
                assert_eq!(before.name, after.name);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_normalization_is_idempotent(offset in -5.0f64..5.0, scale in 0.5f64..10.0) {
            let body = full_body(offset, scale);
            for strategy in [CenteringStrategy::HipCenter, BOX] {
                let once = normalize(&body, strategy);
                let twice = normalize(&once, strategy);
                for (a, b) in once.iter().zip(twice.iter()) {
                    prop_assert!((a.x - b.x).abs() < 1e-9);
                    prop_assert!((a.y - b.y).abs() < 1e-9);
                    prop_assert!((a.z - b.z).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn prop_bounding_box_removes_translation_and_scale(offset in -5.0f64..5.0, scale in 0.1f64..10.0) {
            let base = normalize(&full_body(0.0, 1.0), BOX);
            let moved = normalize(&full_body(offset, scale), BOX);
            for (a, b) in base.iter().zip(moved.iter()) {
                prop_assert!((a.x - b.x).abs() < 1e-9);
                prop_assert!((a.y - b.y).abs() < 1e-9);
            }
        }
    }
}
