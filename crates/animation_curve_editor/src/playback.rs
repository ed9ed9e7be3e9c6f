// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback bridge to the external animation engine.
//!
//! The editor never steps time itself. It asks the engine to play a frame
//! window, then receives progress and completion callbacks through the host.
//! While playing, progress owns the time tracker; otherwise scrubbing does.

use crate::animation::AnimationId;
use crate::error::{EditorError, Result};
use crate::keyframe::FRAME_EPSILON;
use crate::scene::{AnimatableId, Scene};
use crate::settings::EditorSettings;
use crate::sync::Selection;
use crate::tracker::TimeTrackerState;
use serde::{Deserialize, Serialize};

/// Playback scope selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SyncType {
    /// Only the selected animation
    #[default]
    Animation,
    /// Every animation of the selected animatable
    Object,
    /// Every animatable in the scene
    Scene,
}

impl SyncType {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Animation => "Animation",
            Self::Object => "Object",
            Self::Scene => "Scene",
        }
    }

    /// Get all sync types
    pub fn all() -> &'static [SyncType] {
        &[SyncType::Animation, SyncType::Object, SyncType::Scene]
    }
}

/// What part of an animatable the engine should play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackScope {
    /// All animations of the target
    Whole,
    /// Only these animations
    Animations(Vec<AnimationId>),
}

/// A request to start playback on one animatable
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    /// Animatable to play
    pub target: AnimatableId,
    /// Which of its animations to play
    pub scope: PlaybackScope,
    /// First frame
    pub from_frame: f32,
    /// Last frame
    pub to_frame: f32,
    /// Loop at `to_frame`
    pub looping: bool,
    /// Speed multiplier
    pub speed_ratio: f32,
}

/// Handle to a running engine playback
pub trait PlaybackHandle {
    /// Stop this playback
    fn stop(&mut self);
}

/// The external animation engine
pub trait AnimationEngine {
    /// Start playback. Completion is reported back through the host.
    fn begin_animation(&mut self, request: &PlaybackRequest) -> Box<dyn PlaybackHandle>;

    /// Stop every running animation on `target`
    fn stop_animation(&mut self, target: AnimatableId);
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing playing; the tracker belongs to the user
    #[default]
    Idle,
    /// Engine playing; the tracker follows progress
    Playing,
}

struct ActivePlayback {
    target: AnimatableId,
    handle: Box<dyn PlaybackHandle>,
}

/// Starts and stops engine playback for the editor
#[derive(Default)]
pub struct PlaybackBridge {
    state: PlaybackState,
    active: Vec<ActivePlayback>,
    window: Option<(f32, f32)>,
}

impl PlaybackBridge {
    /// Create an idle bridge
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Is the engine playing for us
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Frame window of the running playback
    pub fn window(&self) -> Option<(f32, f32)> {
        self.window
    }

    /// Animatables with running playback
    pub fn targets(&self) -> impl Iterator<Item = AnimatableId> + '_ {
        self.active.iter().map(|a| a.target)
    }

    /// Start playback for the selection in the given scope.
    ///
    /// Returns the start frame, which the caller writes into the tracker.
    /// Playing again while already playing restarts.
    pub fn play(
        &mut self,
        engine: &mut dyn AnimationEngine,
        scene: &Scene,
        selection: &Selection,
        sync_type: SyncType,
        current_frame: f32,
        fallback_frame: f32,
        settings: &EditorSettings,
    ) -> Result<f32> {
        let (Some(animatable_id), Some(animation_id)) = (selection.animatable, selection.animation)
        else {
            return Err(EditorError::MissingSelection);
        };
        let animatable = scene.get(animatable_id).ok_or(EditorError::MissingSelection)?;
        let animation = animatable
            .animation(animation_id)
            .ok_or(EditorError::MissingSelection)?;

        let (window, targets) = match sync_type {
            SyncType::Animation => (
                animation.frame_range(),
                vec![(animatable_id, PlaybackScope::Animations(vec![animation_id]))],
            ),
            SyncType::Object => (
                animatable.frame_range(),
                vec![(animatable_id, PlaybackScope::Whole)],
            ),
            SyncType::Scene => (
                scene.frame_range(),
                scene
                    .animated_ids()
                    .into_iter()
                    .map(|id| (id, PlaybackScope::Whole))
                    .collect(),
            ),
        };
        let window = window.ok_or(EditorError::NothingToPlay)?;

        if self.is_playing() {
            self.stop(engine, Some(animatable_id));
        }

        let from_frame = start_frame(current_frame, fallback_frame, window);
        for (target, scope) in targets {
            let request = PlaybackRequest {
                target,
                scope,
                from_frame,
                to_frame: window.1,
                looping: settings.looping,
                speed_ratio: settings.speed_ratio,
            };
            let handle = engine.begin_animation(&request);
            self.active.push(ActivePlayback { target, handle });
        }

        self.state = PlaybackState::Playing;
        self.window = Some(window);
        tracing::info!(
            "Playback started ({}) frames {}..={} from {}",
            sync_type.name(),
            window.0,
            window.1,
            from_frame
        );
        Ok(from_frame)
    }

    /// Stop playback.
    ///
    /// Safe to call when idle. The engine is always asked to stop `fallback`
    /// as well, so an engine-side playback the bridge lost track of cannot
    /// keep running.
    pub fn stop(&mut self, engine: &mut dyn AnimationEngine, fallback: Option<AnimatableId>) {
        let was_playing = self.is_playing();
        let mut stopped = Vec::with_capacity(self.active.len());

        for mut active in self.active.drain(..) {
            active.handle.stop();
            if !stopped.contains(&active.target) {
                engine.stop_animation(active.target);
                stopped.push(active.target);
            }
        }

        if let Some(target) = fallback {
            if !stopped.contains(&target) {
                engine.stop_animation(target);
            }
        }

        self.state = PlaybackState::Idle;
        self.window = None;
        if was_playing {
            tracing::info!("Playback stopped");
        }
    }

    /// Engine reports that playback on `target` finished.
    ///
    /// Returns true when this ended the bridge's playback.
    pub fn on_complete(&mut self, engine: &mut dyn AnimationEngine, target: AnimatableId) -> bool {
        if !self.is_playing() || !self.active.iter().any(|a| a.target == target) {
            tracing::debug!("Ignoring completion for {:?}", target);
            return false;
        }
        self.stop(engine, None);
        true
    }

    /// Engine reports progress. Only applied while playing.
    pub fn on_progress(&self, frame: f32, tracker: &mut TimeTrackerState) -> bool {
        if !self.is_playing() {
            return false;
        }
        tracker.set_value(frame);
        true
    }
}

/// Frame playback starts from.
///
/// The current frame, unless it sits on the window end (wrap to the start)
/// or is not a usable frame inside the window, in which case `fallback` is
/// used if it lies inside the window and the window start otherwise.
pub fn start_frame(current: f32, fallback: f32, window: (f32, f32)) -> f32 {
    let (min, max) = window;
    let usable = |frame: f32| frame.is_finite() && frame >= min && frame <= max;

    if (current - max).abs() < FRAME_EPSILON {
        min
    } else if usable(current) {
        current
    } else if usable(fallback) {
        fallback
    } else {
        min
    }
}
