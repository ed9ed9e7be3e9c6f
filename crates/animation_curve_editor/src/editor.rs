// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve editor session.
//!
//! [`AnimationEditor`] owns the chart adapter, time tracker, gesture
//! controller, playback bridge and sync coordinator for one mounted chart,
//! and exposes the command surface the host and the egui widget call into.
//! Commands never fail loudly: missing selections are debug-logged no-ops and
//! failed keyframe writes are logged as warnings.

use crate::animation::AnimationId;
use crate::chart::{ChartAdapter, ChartSurface, PointRef, RedrawMode};
use crate::error::{EditorError, Result};
use crate::gesture::{DragGestureController, GestureContext, GestureKind, GestureState, PanMode};
use crate::playback::{AnimationEngine, PlaybackBridge, PlaybackState, SyncType};
use crate::property::PropertyAccessor;
use crate::scene::{Animatable, AnimatableId, Scene};
use crate::settings::EditorSettings;
use crate::sync::{EditorView, Selection, SelectionSource, SubscriptionId, SyncCoordinator};
use crate::tracker::TimeTrackerState;
use egui::{Pos2, Rect};

/// One curve editor session
pub struct AnimationEditor {
    settings: EditorSettings,
    chart: ChartAdapter,
    tracker: TimeTrackerState,
    gesture: DragGestureController,
    playback: PlaybackBridge,
    sync: SyncCoordinator,
    sync_type: SyncType,
    engine: Box<dyn AnimationEngine>,
    properties: Box<dyn PropertyAccessor>,
    subscription: Option<SubscriptionId>,
}

impl AnimationEditor {
    /// Create an unmounted editor
    pub fn new(
        settings: EditorSettings,
        engine: Box<dyn AnimationEngine>,
        properties: Box<dyn PropertyAccessor>,
    ) -> Self {
        Self {
            chart: ChartAdapter::new(&settings),
            tracker: TimeTrackerState::new(),
            gesture: DragGestureController::new(),
            playback: PlaybackBridge::new(),
            sync: SyncCoordinator::new(),
            sync_type: settings.default_sync_type,
            settings,
            engine,
            properties,
            subscription: None,
        }
    }

    // ========== Accessors ==========

    /// Editor settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Chart adapter
    pub fn chart(&self) -> &ChartAdapter {
        &self.chart
    }

    /// Chart adapter, for layout updates from the host
    pub fn chart_mut(&mut self) -> &mut ChartAdapter {
        &mut self.chart
    }

    /// Time tracker
    pub fn tracker(&self) -> &TimeTrackerState {
        &self.tracker
    }

    /// Current frame
    pub fn current_frame(&self) -> f32 {
        self.tracker.value
    }

    /// Gesture state
    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    /// Playback state
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.state()
    }

    /// Is playback running
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Current selection
    pub fn selection(&self) -> Selection {
        self.sync.selection()
    }

    /// Session playback scope
    pub fn sync_type(&self) -> SyncType {
        self.sync_type
    }

    /// Whether the chart surface is mounted
    pub fn is_mounted(&self) -> bool {
        self.chart.is_mounted()
    }

    // ========== Lifecycle ==========

    /// Attach a synchronized view
    pub fn attach_view(&mut self, view: Box<dyn EditorView>) {
        self.sync.attach(view);
    }

    /// Mount the chart surface and subscribe to selection events
    pub fn mount(
        &mut self,
        surface: Box<dyn ChartSurface>,
        plot_rect: Rect,
        source: &mut dyn SelectionSource,
    ) {
        self.chart.mount(surface, plot_rect);
        if self.subscription.is_none() {
            self.subscription = Some(source.subscribe());
        }
        tracing::debug!("Curve editor mounted");
    }

    /// Stop playback, unsubscribe and release the chart.
    ///
    /// A point drag still in progress is committed first. Always completes,
    /// even when the surface fails to tear down.
    pub fn teardown(&mut self, scene: &mut Scene, source: &mut dyn SelectionSource) {
        self.playback
            .stop(self.engine.as_mut(), self.sync.selection().animatable);
        if let Some(id) = self.subscription.take() {
            source.unsubscribe(id);
        }
        self.tracker.reset();
        self.cancel_gesture(scene);
        self.chart.teardown();
        tracing::debug!("Curve editor torn down");
    }

    // ========== Selection ==========

    /// Host callback: a node was selected (or the selection cleared)
    pub fn select_animatable(&mut self, scene: &mut Scene, id: Option<AnimatableId>) {
        self.cancel_gesture(scene);
        self.sync.select_animatable(
            scene,
            id,
            &mut self.chart,
            &mut self.playback,
            self.engine.as_mut(),
        );
    }

    /// Drop the running gesture; an interrupted point drag is sorted and announced
    fn cancel_gesture(&mut self, scene: &mut Scene) {
        let Some((owner, index)) = self.gesture.cancel(&mut self.tracker, scene) else {
            return;
        };
        if let Some(animatable) = scene.get(owner) {
            self.sync.key_changed(animatable, index, &mut self.chart);
        }
    }

    /// Select another animation of the current animatable
    pub fn select_animation(&mut self, scene: &Scene, id: Option<AnimationId>) {
        if let Err(e) = self.sync.select_animation(scene, id, &mut self.chart) {
            tracing::debug!("Animation selection ignored: {e}");
        }
    }

    // ========== Commands ==========

    /// Play button
    pub fn play(&mut self, scene: &Scene) {
        if self.gesture.state() == GestureState::ScrubbingTracker {
            self.gesture.reset(&mut self.tracker);
        }

        let result = self.playback.play(
            self.engine.as_mut(),
            scene,
            &self.sync.selection(),
            self.sync_type,
            self.tracker.value,
            self.sync.default_start_frame(),
            &self.settings,
        );
        match result {
            Ok(frame) => {
                self.tracker.set_value(frame);
                self.chart.redraw(RedrawMode::Immediate);
            }
            Err(e) => tracing::debug!("Play ignored: {e}"),
        }
    }

    /// Stop button. Safe to press while idle.
    pub fn stop(&mut self) {
        self.playback
            .stop(self.engine.as_mut(), self.sync.selection().animatable);
    }

    /// Edit button
    pub fn edit_current_animation(&mut self, scene: &Scene) {
        if let Err(e) = self.sync.edit_requested(scene) {
            tracing::debug!("Edit ignored: {e}");
        }
    }

    /// Change the playback scope
    pub fn set_sync_type(&mut self, sync_type: SyncType) {
        if self.sync_type != sync_type {
            tracing::debug!("Sync type {} -> {}", self.sync_type.name(), sync_type.name());
            self.sync_type = sync_type;
        }
    }

    /// Move the tracker directly. Ignored while playback owns it.
    pub fn seek(&mut self, frame: f32) {
        if self.playback.is_playing() {
            tracing::debug!("Seek ignored while playing");
            return;
        }
        self.tracker.set_value(frame);
        self.chart.redraw(RedrawMode::Immediate);
    }

    /// Add-Key button.
    ///
    /// Writes a key at the current frame with each target property's live
    /// value. On the first failure the remaining animations are skipped;
    /// keys already written stay and are announced. Returns the number of
    /// animations that received a key.
    pub fn add_key(&mut self, scene: &mut Scene) -> usize {
        let selection = self.sync.selection();
        let Some(animatable) = selection.animatable.and_then(|id| scene.get_mut(id)) else {
            tracing::debug!("Add key ignored: {}", EditorError::MissingSelection);
            return 0;
        };

        let targets: Vec<usize> = match self.sync_type {
            SyncType::Animation => selection
                .animation
                .and_then(|id| animatable.animation_index(id))
                .into_iter()
                .collect(),
            SyncType::Object | SyncType::Scene => (0..animatable.animation_count()).collect(),
        };
        if targets.is_empty() {
            tracing::debug!("Add key ignored: {}", EditorError::MissingSelection);
            return 0;
        }

        let frame = self.tracker.value;
        let mut written = Vec::with_capacity(targets.len());
        let mut failure = None;
        for index in targets {
            match write_live_key(animatable, index, frame, self.properties.as_ref()) {
                Ok(()) => written.push(index),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        for &index in &written {
            self.sync.key_changed(animatable, index, &mut self.chart);
        }
        if let Some(e) = failure {
            tracing::warn!(
                "Add key at frame {frame} stopped after {} animation(s): {e}",
                written.len()
            );
        }
        written.len()
    }

    /// Delete a keyframe. The pinned first key cannot be deleted.
    pub fn delete_key(&mut self, scene: &mut Scene, point: PointRef) -> bool {
        if matches!(self.gesture.state(), GestureState::DraggingPoint { .. }) {
            tracing::debug!("Delete ignored during a point drag");
            return false;
        }
        let selected = self.sync.selection().animatable;
        let Some(animatable) = selected.and_then(|id| scene.get_mut(id)) else {
            tracing::debug!("Delete ignored: {}", EditorError::MissingSelection);
            return false;
        };
        let removed = animatable
            .animation_at_mut(point.dataset)
            .and_then(|a| a.remove_keyframe(point.point));
        if removed.is_none() {
            tracing::debug!("Delete ignored for {:?}", point);
            return false;
        }

        self.sync.key_changed(animatable, point.dataset, &mut self.chart);
        true
    }

    // ========== Pointer input ==========

    /// Pointer entered the tracker's grab region
    pub fn pointer_enter_tracker(&mut self) {
        self.gesture.pointer_enter_tracker(&mut self.tracker);
    }

    /// Pointer left the tracker's grab region
    pub fn pointer_leave_tracker(&mut self) {
        self.gesture.pointer_leave_tracker(&mut self.tracker);
    }

    /// Pointer pressed on the chart
    pub fn pointer_down(&mut self, scene: &mut Scene, pos: Pos2) -> GestureKind {
        let selected = self.sync.selection().animatable;
        let ctx = GestureContext {
            chart: &mut self.chart,
            tracker: &mut self.tracker,
            animatable: selected.and_then(|id| scene.get_mut(id)),
            settings: &self.settings,
            playing: self.playback.is_playing(),
        };
        let kind = self.gesture.pointer_down(pos, ctx);
        tracing::debug!("Pointer down at {:?}: {:?}", pos, kind);
        kind
    }

    /// Pointer moved while pressed
    pub fn pointer_move(&mut self, scene: &mut Scene, pos: Pos2) {
        let selected = self.sync.selection().animatable;
        let ctx = GestureContext {
            chart: &mut self.chart,
            tracker: &mut self.tracker,
            animatable: selected.and_then(|id| scene.get_mut(id)),
            settings: &self.settings,
            playing: self.playback.is_playing(),
        };
        let changed = self.gesture.pointer_move(pos, ctx);
        self.announce_key_change(scene, selected, changed);
    }

    /// Pointer released
    pub fn pointer_up(&mut self, scene: &mut Scene, pos: Pos2) {
        let selected = self.sync.selection().animatable;
        let ctx = GestureContext {
            chart: &mut self.chart,
            tracker: &mut self.tracker,
            animatable: selected.and_then(|id| scene.get_mut(id)),
            settings: &self.settings,
            playing: self.playback.is_playing(),
        };
        let changed = self.gesture.pointer_up(pos, ctx);
        self.announce_key_change(scene, selected, changed);
    }

    fn announce_key_change(
        &mut self,
        scene: &Scene,
        selected: Option<AnimatableId>,
        changed: Option<usize>,
    ) {
        let Some(index) = changed else {
            return;
        };
        if let Some(animatable) = selected.and_then(|id| scene.get(id)) {
            self.sync.key_changed(animatable, index, &mut self.chart);
        }
    }

    /// Pan/zoom mode the chart may use right now
    pub fn pan_mode(&self) -> PanMode {
        self.gesture.pan_mode()
    }

    /// Zoom the frame axis about a pixel x position, when panning is allowed
    pub fn zoom(&mut self, anchor_x: f32, factor: f32) {
        if self.gesture.pan_mode() == PanMode::Frames {
            self.chart.zoom_about(anchor_x, factor);
        }
    }

    // ========== Engine callbacks ==========

    /// Engine progress callback
    pub fn on_playback_progress(&mut self, frame: f32) {
        if self.playback.on_progress(frame, &mut self.tracker) {
            self.chart.redraw(RedrawMode::Immediate);
        } else {
            tracing::debug!("Progress {frame} ignored while idle");
        }
    }

    /// Engine completion callback
    pub fn on_playback_complete(&mut self, target: AnimatableId) {
        if self.playback.on_complete(self.engine.as_mut(), target) {
            self.chart.redraw(RedrawMode::Immediate);
        }
    }
}

fn write_live_key(
    animatable: &mut Animatable,
    index: usize,
    frame: f32,
    properties: &dyn PropertyAccessor,
) -> Result<()> {
    let stale = || EditorError::StaleIndex {
        dataset: index,
        point: 0,
    };
    let animation = animatable.animation_at(index).ok_or_else(stale)?;
    let value = properties.read_property(animatable, &animation.target_property)?;

    animatable
        .animation_at_mut(index)
        .ok_or_else(stale)?
        .set_keyframe_at(frame, value)
}
