// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the curve editor core.
//!
//! None of these reach the user as a modal error. Command entry points on
//! [`crate::AnimationEditor`] turn them into no-ops or log entries.

use crate::keyframe::DataType;
use thiserror::Error;

/// Curve editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// The operation needs a selected animatable or animation
    #[error("No animatable or animation selected")]
    MissingSelection,

    /// The playback scope contains no keyframes
    #[error("Nothing to play in the selected scope")]
    NothingToPlay,

    /// A target property path does not resolve on the animatable
    #[error("Property path '{path}' does not resolve")]
    InvalidPropertyPath {
        /// The unresolved path
        path: String,
    },

    /// A value does not match the animation's data type
    #[error("Expected a {expected:?} value, found {found:?}")]
    TypeMismatch {
        /// Data type of the animation
        expected: DataType,
        /// Data type of the offered value
        found: DataType,
    },

    /// A chart dataset or point index no longer maps to a keyframe
    #[error("Dataset {dataset} point {point} is out of range")]
    StaleIndex {
        /// Dataset (animation) index
        dataset: usize,
        /// Point (keyframe) index
        point: usize,
    },

    /// The chart surface failed to tear down
    #[error("Chart teardown failed: {0}")]
    TeardownFailure(String),

    /// Settings file could not be read or written
    #[error("Settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),

    /// Settings file was written by a newer editor
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedSettingsVersion {
        /// Version found in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Settings could not be serialized
    #[error("Settings serialization error: {0}")]
    SettingsSerialize(#[from] ron::Error),
}

/// Result type for curve editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
