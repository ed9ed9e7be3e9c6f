// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection state and view synchronization.
//!
//! Every attached view (animation list, graph, properties panel) learns about
//! selection changes and keyframe edits from the [`SyncCoordinator`] instead
//! of polling. Key edits are announced only after the keyframes have been
//! written, so a view never sees a half-applied edit.

use crate::animation::{Animation, AnimationId};
use crate::chart::ChartAdapter;
use crate::error::{EditorError, Result};
use crate::playback::{AnimationEngine, PlaybackBridge};
use crate::scene::{Animatable, AnimatableId, Scene};

/// Current editor selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Selected animatable
    pub animatable: Option<AnimatableId>,
    /// Selected animation, always one of the animatable's
    pub animation: Option<AnimationId>,
}

/// Subscription token handed out by a [`SelectionSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// External source of "node selected" events.
///
/// The editor subscribes when mounted and unsubscribes on teardown. The host
/// delivers events by calling [`crate::AnimationEditor::select_animatable`].
pub trait SelectionSource {
    /// Start delivering selection events
    fn subscribe(&mut self) -> SubscriptionId;

    /// Stop delivering selection events
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// A view kept in sync with the editor
#[allow(unused_variables)]
pub trait EditorView {
    /// View name, for logs
    fn name(&self) -> &str;

    /// A new animatable (or none) was selected
    fn on_animatable_selected(&mut self, animatable: Option<&Animatable>) {}

    /// A new animation (or none) was selected
    fn on_animation_selected(
        &mut self,
        animatable: Option<&Animatable>,
        animation: Option<&Animation>,
    ) {
    }

    /// Keyframes of the animation at `animation_index` changed
    fn on_key_changed(&mut self, animatable: &Animatable, animation_index: usize) {}

    /// The user asked to edit an animation in full
    fn on_edit_requested(&mut self, animation: &Animation) {}
}

/// Fans selection changes and key edits out to every view
#[derive(Default)]
pub struct SyncCoordinator {
    selection: Selection,
    views: Vec<Box<dyn EditorView>>,
    default_start_frame: f32,
}

impl SyncCoordinator {
    /// Create a coordinator with no views
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a view
    pub fn attach(&mut self, view: Box<dyn EditorView>) {
        tracing::debug!("Attached view '{}'", view.name());
        self.views.push(view);
    }

    /// Number of attached views
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Frame playback falls back to for the selected animation
    pub fn default_start_frame(&self) -> f32 {
        self.default_start_frame
    }

    /// Select an animatable, or clear the selection.
    ///
    /// Stops playback first, rebuilds the chart, tells every view, then
    /// selects the animatable's first animation.
    pub fn select_animatable(
        &mut self,
        scene: &Scene,
        id: Option<AnimatableId>,
        chart: &mut ChartAdapter,
        playback: &mut PlaybackBridge,
        engine: &mut dyn AnimationEngine,
    ) {
        playback.stop(engine, self.selection.animatable);

        let animatable = id.and_then(|id| scene.get(id));
        if id.is_some() && animatable.is_none() {
            tracing::debug!("Selected animatable {:?} is not in the scene", id);
        }

        self.selection = Selection {
            animatable: animatable.map(|a| a.id),
            animation: None,
        };
        chart.rebuild(animatable);
        for view in &mut self.views {
            view.on_animatable_selected(animatable);
        }

        let first = animatable.and_then(Animatable::first_animation).map(|a| a.id);
        // The first animation always belongs to the animatable
        let _ = self.select_animation(scene, first, chart);
    }

    /// Select an animation of the current animatable, or none.
    ///
    /// Fails with [`EditorError::MissingSelection`] when `id` is not an
    /// animation of the selected animatable; the selection is left unchanged.
    pub fn select_animation(
        &mut self,
        scene: &Scene,
        id: Option<AnimationId>,
        chart: &mut ChartAdapter,
    ) -> Result<()> {
        let animatable = self.selection.animatable.and_then(|id| scene.get(id));
        let animation = match id {
            Some(id) => Some(
                animatable
                    .and_then(|a| a.animation(id))
                    .ok_or(EditorError::MissingSelection)?,
            ),
            None => None,
        };

        self.selection.animation = animation.map(|a| a.id);
        self.default_start_frame = animation
            .and_then(Animation::frame_range)
            .map_or(0.0, |(min, _)| min);

        let row = animatable.zip(animation).and_then(|(a, anim)| a.animation_index(anim.id));
        chart.set_highlight(row);

        for view in &mut self.views {
            view.on_animation_selected(animatable, animation);
        }
        Ok(())
    }

    /// Announce a committed keyframe edit.
    ///
    /// Refreshes only the affected dataset, never the whole chart.
    pub fn key_changed(
        &mut self,
        animatable: &Animatable,
        animation_index: usize,
        chart: &mut ChartAdapter,
    ) {
        if !chart.refresh_dataset(animatable, animation_index) {
            tracing::debug!("No dataset for animation {animation_index}");
        }
        for view in &mut self.views {
            view.on_key_changed(animatable, animation_index);
        }
    }

    /// Forward an edit request for the selected animation
    pub fn edit_requested(&mut self, scene: &Scene) -> Result<()> {
        let animation = self
            .selection
            .animatable
            .and_then(|id| scene.get(id))
            .zip(self.selection.animation)
            .and_then(|(a, id)| a.animation(id))
            .ok_or(EditorError::MissingSelection)?;

        for view in &mut self.views {
            view.on_edit_requested(animation);
        }
        Ok(())
    }
}
