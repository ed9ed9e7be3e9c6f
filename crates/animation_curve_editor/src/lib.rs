// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline and curve editor core.
//!
//! This crate provides the interactive core of an animation curve editor:
//! - Typed keyframe collections per animated property
//! - A chart adapter mapping pixels to `(frame, value)` coordinates
//! - A drag gesture state machine (point drag, tracker scrub, pan)
//! - View synchronization across timeline, graph and property panels
//! - A playback bridge to an external animation engine
//!
//! ## Architecture
//!
//! [`AnimationEditor`] is the session root. The host owns the [`Scene`],
//! forwards selection events and engine callbacks, and mounts a
//! [`ChartSurface`] (the egui one lives in [`ui`]). Everything runs on the
//! UI thread; callbacks are delivered serially.

pub mod animation;
pub mod chart;
pub mod editor;
pub mod error;
pub mod gesture;
pub mod keyframe;
pub mod playback;
pub mod property;
pub mod scene;
pub mod settings;
pub mod sync;
pub mod tracker;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use animation::{Animation, AnimationId};
pub use chart::{
    Annotation, ChartAdapter, ChartDataset, ChartSurface, DomainPoint, PointRef, RedrawMode,
    TimeTrackerStyle,
};
pub use editor::AnimationEditor;
pub use error::{EditorError, Result};
pub use gesture::{DragGestureController, GestureContext, GestureKind, GestureState, PanMode};
pub use keyframe::{DataType, Keyframe, Value, FRAME_EPSILON};
pub use playback::{
    AnimationEngine, PlaybackBridge, PlaybackHandle, PlaybackRequest, PlaybackScope,
    PlaybackState, SyncType,
};
pub use property::{PropertyAccessor, PropertyTable};
pub use scene::{Animatable, AnimatableId, Scene};
pub use settings::{EditorSettings, SETTINGS_FILE_NAME, SETTINGS_FORMAT_VERSION};
pub use sync::{EditorView, Selection, SelectionSource, SubscriptionId, SyncCoordinator};
pub use tracker::TimeTrackerState;
pub use ui::{EguiChartSurface, TimelineChart};
