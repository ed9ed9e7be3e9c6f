// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the curve editor.

use serde::{Deserialize, Serialize};

/// Tolerance used when matching keyframes by frame
pub const FRAME_EPSILON: f32 = 0.001;

/// Data type tag carried by every animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Single float
    Scalar,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// RGB color
    Color3,
    /// RGBA color
    Color4,
}

impl DataType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scalar => "Scalar",
            Self::Vector2 => "Vector2",
            Self::Vector3 => "Vector3",
            Self::Color3 => "Color3",
            Self::Color4 => "Color4",
        }
    }

    /// Number of float channels in a value of this type
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector2 => 2,
            Self::Vector3 | Self::Color3 => 3,
            Self::Color4 => 4,
        }
    }
}

/// Value stored in a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Float value
    Scalar(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// Color (RGB)
    Color3([f32; 3]),
    /// Color (RGBA)
    Color4([f32; 4]),
}

impl Value {
    /// The data type tag of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Scalar(_) => DataType::Scalar,
            Value::Vector2(_) => DataType::Vector2,
            Value::Vector3(_) => DataType::Vector3,
            Value::Color3(_) => DataType::Color3,
            Value::Color4(_) => DataType::Color4,
        }
    }

    /// Read all channels as a flat slice
    pub fn channels(&self) -> &[f32] {
        match self {
            Value::Scalar(v) => std::slice::from_ref(v),
            Value::Vector2(v) => v,
            Value::Vector3(v) | Value::Color3(v) => v,
            Value::Color4(v) => v,
        }
    }

    /// Get as float if possible
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as Vector3 if possible
    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match self {
            Value::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as RGBA color if possible; RGB colors get an opaque alpha
    pub fn as_color4(&self) -> Option<[f32; 4]> {
        match self {
            Value::Color3([r, g, b]) => Some([*r, *g, *b, 1.0]),
            Value::Color4(v) => Some(*v),
            _ => None,
        }
    }
}

/// A keyframe in an animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Frame number, never negative
    pub frame: f32,
    /// Value at this keyframe
    pub value: Value,
}

impl Keyframe {
    /// Create a new keyframe; negative frames clamp to 0
    pub fn new(frame: f32, value: Value) -> Self {
        Self {
            frame: frame.max(0.0),
            value,
        }
    }

    /// Check whether this keyframe sits at `frame`
    pub fn is_at(&self, frame: f32) -> bool {
        (self.frame - frame).abs() < FRAME_EPSILON
    }
}
