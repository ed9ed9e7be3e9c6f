// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live property access for animatables.

use crate::error::{EditorError, Result};
use crate::keyframe::Value;
use crate::scene::{Animatable, AnimatableId};
use std::collections::HashMap;

/// Reads the live value of a property on an animatable.
///
/// Used to seed new keyframes. The host implements this against its own
/// reflection or component system.
pub trait PropertyAccessor {
    /// Read the current value at `path` (for example `"material.alpha"`)
    fn read_property(&self, target: &Animatable, path: &str) -> Result<Value>;
}

/// Property accessor backed by a plain value table
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    values: HashMap<(AnimatableId, String), Value>,
}

impl PropertyTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the live value of a property
    pub fn set(&mut self, target: AnimatableId, path: impl Into<String>, value: Value) {
        self.values.insert((target, path.into()), value);
    }

    /// Forget a property, so reads of it fail
    pub fn remove(&mut self, target: AnimatableId, path: &str) {
        self.values.remove(&(target, path.to_string()));
    }
}

impl PropertyAccessor for PropertyTable {
    fn read_property(&self, target: &Animatable, path: &str) -> Result<Value> {
        self.values
            .get(&(target.id, path.to_string()))
            .copied()
            .ok_or_else(|| EditorError::InvalidPropertyPath {
                path: path.to_string(),
            })
    }
}
