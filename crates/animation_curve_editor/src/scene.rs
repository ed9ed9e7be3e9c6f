// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatables and the scene that owns them.

use crate::animation::{frame_range, Animation, AnimationId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of an animatable, compared by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimatableId(pub Uuid);

impl AnimatableId {
    /// Create a new random animatable ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AnimatableId {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity whose properties are driven by animations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animatable {
    /// Unique animatable ID
    pub id: AnimatableId,
    /// Display name
    pub name: String,
    /// Animations in display order; the index is the chart row
    animations: IndexMap<AnimationId, Animation>,
}

impl Animatable {
    /// Create a new animatable
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AnimatableId::new(),
            name: name.into(),
            animations: IndexMap::new(),
        }
    }

    /// Add an animation
    pub fn add_animation(&mut self, animation: Animation) -> AnimationId {
        let id = animation.id;
        self.animations.insert(id, animation);
        id
    }

    /// Remove an animation, keeping the order of the others
    pub fn remove_animation(&mut self, id: AnimationId) -> Option<Animation> {
        self.animations.shift_remove(&id)
    }

    /// Get an animation
    pub fn animation(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(&id)
    }

    /// Get a mutable animation
    pub fn animation_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.get_mut(&id)
    }

    /// Get an animation by row index
    pub fn animation_at(&self, index: usize) -> Option<&Animation> {
        self.animations.get_index(index).map(|(_, a)| a)
    }

    /// Get a mutable animation by row index
    pub fn animation_at_mut(&mut self, index: usize) -> Option<&mut Animation> {
        self.animations.get_index_mut(index).map(|(_, a)| a)
    }

    /// Row index of an animation
    pub fn animation_index(&self, id: AnimationId) -> Option<usize> {
        self.animations.get_index_of(&id)
    }

    /// Get all animations
    pub fn animations(&self) -> impl Iterator<Item = &Animation> {
        self.animations.values()
    }

    /// Get all animations mutably
    pub fn animations_mut(&mut self) -> impl Iterator<Item = &mut Animation> {
        self.animations.values_mut()
    }

    /// Get animation count
    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    /// First animation in display order
    pub fn first_animation(&self) -> Option<&Animation> {
        self.animation_at(0)
    }

    /// Frame range covering every keyframe of every animation
    pub fn frame_range(&self) -> Option<(f32, f32)> {
        frame_range(self.animations.values().flat_map(Animation::frames))
    }
}

/// Host-owned store of animatables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    animatables: IndexMap<AnimatableId, Animatable>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animatable
    pub fn add(&mut self, animatable: Animatable) -> AnimatableId {
        let id = animatable.id;
        self.animatables.insert(id, animatable);
        id
    }

    /// Remove an animatable
    pub fn remove(&mut self, id: AnimatableId) -> Option<Animatable> {
        self.animatables.shift_remove(&id)
    }

    /// Get an animatable
    pub fn get(&self, id: AnimatableId) -> Option<&Animatable> {
        self.animatables.get(&id)
    }

    /// Get a mutable animatable
    pub fn get_mut(&mut self, id: AnimatableId) -> Option<&mut Animatable> {
        self.animatables.get_mut(&id)
    }

    /// Get all animatables
    pub fn animatables(&self) -> impl Iterator<Item = &Animatable> {
        self.animatables.values()
    }

    /// IDs of every animatable that has at least one animation
    pub fn animated_ids(&self) -> Vec<AnimatableId> {
        self.animatables
            .values()
            .filter(|a| a.animation_count() > 0)
            .map(|a| a.id)
            .collect()
    }

    /// Frame range covering every keyframe in the scene
    pub fn frame_range(&self) -> Option<(f32, f32)> {
        frame_range(
            self.animatables
                .values()
                .flat_map(|a| a.animations().flat_map(Animation::frames)),
        )
    }
}
