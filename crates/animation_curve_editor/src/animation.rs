// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animations and their keyframe collections.
//!
//! An [`Animation`] owns a keyframe sequence that stays sorted by frame after
//! every committed edit. The first keyframe is pinned to frame 0.

use crate::error::{EditorError, Result};
use crate::keyframe::{DataType, Keyframe, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub Uuid);

impl AnimationId {
    /// Create a new random animation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

/// An animation driving one property of an animatable
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "AnimationData")]
pub struct Animation {
    /// Unique animation ID
    pub id: AnimationId,
    /// Animation name, shown as the chart row label
    pub name: String,
    /// Type of every keyframe value
    pub data_type: DataType,
    /// Path of the driven property on the animatable
    pub target_property: String,
    /// Keyframes in frame order
    keyframes: Vec<Keyframe>,
}

impl Animation {
    /// Create a new animation with no keyframes
    pub fn new(
        name: impl Into<String>,
        target_property: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        Self {
            id: AnimationId::new(),
            name: name.into(),
            data_type,
            target_property: target_property.into(),
            keyframes: Vec::new(),
        }
    }

    /// Builder-style keyframe insertion, used when assembling fixtures and imports
    pub fn with_keyframe(mut self, frame: f32, value: Value) -> Result<Self> {
        self.set_keyframe_at(frame, value)?;
        Ok(self)
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Get a keyframe by index
    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    /// Frames of every keyframe, in order
    pub fn frames(&self) -> impl Iterator<Item = f32> + '_ {
        self.keyframes.iter().map(|k| k.frame)
    }

    /// Smallest and largest keyframe frame
    pub fn frame_range(&self) -> Option<(f32, f32)> {
        frame_range(self.frames())
    }

    /// Move a keyframe without re-sorting.
    ///
    /// Index 0 is pinned to frame 0, so moving it is silently ignored. Used by
    /// intermediate drag steps, where sorting would shift indices under the
    /// cursor. Returns the frame actually stored, or `None` for a stale index.
    pub fn set_frame(&mut self, index: usize, frame: f32) -> Option<f32> {
        let keyframe = self.keyframes.get_mut(index)?;
        keyframe.frame = if index == 0 { 0.0 } else { frame.max(0.0) };
        Some(keyframe.frame)
    }

    /// Sort keyframes by frame, keeping insertion order for ties
    pub fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.frame.total_cmp(&b.frame));
    }

    /// Insert or overwrite the keyframe at `frame`, then re-sort.
    ///
    /// The first key of an empty animation becomes the pinned key at frame 0.
    pub fn set_keyframe_at(&mut self, frame: f32, value: Value) -> Result<()> {
        if value.data_type() != self.data_type {
            return Err(EditorError::TypeMismatch {
                expected: self.data_type,
                found: value.data_type(),
            });
        }

        if self.keyframes.is_empty() {
            self.keyframes.push(Keyframe::new(0.0, value));
            return Ok(());
        }

        if let Some(existing) = self.keyframes.iter_mut().find(|k| k.is_at(frame)) {
            existing.value = value;
        } else {
            self.keyframes.push(Keyframe::new(frame, value));
            self.sort_keyframes();
        }
        Ok(())
    }

    /// Remove a keyframe. The pinned first keyframe cannot be removed.
    pub fn remove_keyframe(&mut self, index: usize) -> Option<Keyframe> {
        if index == 0 || index >= self.keyframes.len() {
            return None;
        }
        Some(self.keyframes.remove(index))
    }
}

/// Stored form of an [`Animation`], normalized on load
#[derive(Deserialize)]
struct AnimationData {
    id: AnimationId,
    name: String,
    data_type: DataType,
    target_property: String,
    keyframes: Vec<Keyframe>,
}

impl TryFrom<AnimationData> for Animation {
    type Error = EditorError;

    /// Rejects mistyped keys, then sorts and pins the first key to frame 0
    fn try_from(data: AnimationData) -> std::result::Result<Self, Self::Error> {
        let mut keyframes = Vec::with_capacity(data.keyframes.len());
        for keyframe in data.keyframes {
            if keyframe.value.data_type() != data.data_type {
                return Err(EditorError::TypeMismatch {
                    expected: data.data_type,
                    found: keyframe.value.data_type(),
                });
            }
            keyframes.push(Keyframe::new(keyframe.frame, keyframe.value));
        }

        let mut animation = Self {
            id: data.id,
            name: data.name,
            data_type: data.data_type,
            target_property: data.target_property,
            keyframes,
        };
        animation.sort_keyframes();
        if let Some(first) = animation.keyframes.first_mut() {
            first.frame = 0.0;
        }
        Ok(animation)
    }
}

/// Smallest and largest of a set of frames
pub(crate) fn frame_range(frames: impl Iterator<Item = f32>) -> Option<(f32, f32)> {
    frames.fold(None, |range, frame| match range {
        None => Some((frame, frame)),
        Some((min, max)) => Some((min.min(frame), max.max(frame))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_animation(keys: &[(f32, f32)]) -> Animation {
        let mut animation = Animation::new("alpha", "material.alpha", DataType::Scalar);
        for &(frame, value) in keys {
            animation.set_keyframe_at(frame, Value::Scalar(value)).unwrap();
        }
        animation
    }

    #[test]
    fn test_keys_stay_sorted_on_insert() {
        let animation = scalar_animation(&[(0.0, 1.0), (30.0, 2.0), (10.0, 3.0)]);
        let frames: Vec<f32> = animation.frames().collect();
        assert_eq!(frames, vec![0.0, 10.0, 30.0]);
    }

    #[test]
    fn test_overwrite_existing_frame() {
        let mut animation = scalar_animation(&[(0.0, 5.0), (10.0, 8.0)]);
        animation.set_keyframe_at(10.0, Value::Scalar(8.0)).unwrap();
        assert_eq!(animation.keyframe_count(), 2);
        assert_eq!(animation.keyframe(1).unwrap().value, Value::Scalar(8.0));
    }

    #[test]
    fn test_first_key_is_pinned() {
        let mut animation = scalar_animation(&[(0.0, 1.0), (10.0, 2.0)]);
        assert_eq!(animation.set_frame(0, 25.0).unwrap(), 0.0);
        assert_eq!(animation.keyframe(0).unwrap().frame, 0.0);
        assert!(animation.remove_keyframe(0).is_none());
    }

    #[test]
    fn test_first_insert_lands_on_frame_zero() {
        let animation = scalar_animation(&[(12.0, 4.0)]);
        assert_eq!(animation.keyframe(0).unwrap().frame, 0.0);
    }

    #[test]
    fn test_set_frame_does_not_sort() {
        let mut animation = scalar_animation(&[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]);
        animation.set_frame(2, 5.0).unwrap();
        let frames: Vec<f32> = animation.frames().collect();
        assert_eq!(frames, vec![0.0, 10.0, 5.0]);

        animation.sort_keyframes();
        let frames: Vec<f32> = animation.frames().collect();
        assert_eq!(frames, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut animation = scalar_animation(&[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]);
        animation.set_frame(2, 10.0).unwrap();
        animation.sort_keyframes();
        assert_eq!(animation.keyframe(1).unwrap().value, Value::Scalar(2.0));
        assert_eq!(animation.keyframe(2).unwrap().value, Value::Scalar(3.0));
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut animation = scalar_animation(&[(0.0, 1.0)]);
        let err = animation
            .set_keyframe_at(5.0, Value::Vector3([0.0, 1.0, 2.0]))
            .unwrap_err();
        assert!(matches!(err, EditorError::TypeMismatch { .. }));
        assert_eq!(animation.keyframe_count(), 1);
    }

    #[test]
    fn test_stale_index() {
        let mut animation = scalar_animation(&[(0.0, 1.0)]);
        assert_eq!(animation.set_frame(3, 1.0), None);
    }

    fn stored(keyframes: Vec<Keyframe>) -> AnimationData {
        AnimationData {
            id: AnimationId::new(),
            name: "alpha".to_string(),
            data_type: DataType::Scalar,
            target_property: "material.alpha".to_string(),
            keyframes,
        }
    }

    #[test]
    fn test_loading_sorts_and_pins() {
        let animation = Animation::try_from(stored(vec![
            Keyframe::new(30.0, Value::Scalar(2.0)),
            Keyframe::new(5.0, Value::Scalar(1.0)),
            Keyframe::new(12.0, Value::Scalar(3.0)),
        ]))
        .unwrap();

        let frames: Vec<f32> = animation.frames().collect();
        assert_eq!(frames, vec![0.0, 12.0, 30.0]);
        assert_eq!(animation.keyframe(0).unwrap().value, Value::Scalar(1.0));
    }

    #[test]
    fn test_loading_rejects_mistyped_keys() {
        let err = Animation::try_from(stored(vec![
            Keyframe::new(0.0, Value::Scalar(1.0)),
            Keyframe::new(8.0, Value::Vector2([0.0, 1.0])),
        ]))
        .unwrap_err();
        assert!(matches!(err, EditorError::TypeMismatch { .. }));
    }

    #[test]
    fn test_ron_round_trip_keeps_keys() {
        let animation = scalar_animation(&[(0.0, 1.0), (25.0, 2.0), (10.0, 3.0)]);
        let text = ron::to_string(&animation).unwrap();
        let loaded: Animation = ron::from_str(&text).unwrap();

        assert_eq!(loaded.id, animation.id);
        assert_eq!(loaded.keyframes(), animation.keyframes());
    }

    #[test]
    fn test_frame_range() {
        let animation = scalar_animation(&[(0.0, 1.0), (40.0, 2.0), (15.0, 3.0)]);
        assert_eq!(animation.frame_range(), Some((0.0, 40.0)));
        assert_eq!(Animation::new("x", "x", DataType::Scalar).frame_range(), None);
    }
}
