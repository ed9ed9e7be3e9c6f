// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drag gesture controller.
//!
//! Pointer events on the chart drive exactly one of three gestures:
//! - scrubbing the time tracker
//! - dragging a keyframe point horizontally (retiming it)
//! - panning the chart background
//!
//! The gesture is chosen on pointer-down and lasts until pointer-up.

use crate::animation::AnimationId;
use crate::chart::{ChartAdapter, DomainPoint, PointRef, RedrawMode};
use crate::scene::{Animatable, AnimatableId, Scene};
use crate::settings::EditorSettings;
use crate::tracker::TimeTrackerState;
use egui::Pos2;

/// Pan/zoom permission handed to the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanMode {
    /// Pan and zoom disabled
    None,
    /// Pan and zoom along the frame axis
    Frames,
}

/// Gesture state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No gesture
    Idle,
    /// Pointer over the time tracker's grab region
    HoveringTracker,
    /// Time tracker being dragged
    ScrubbingTracker,
    /// Keyframe point being dragged
    DraggingPoint {
        /// Grabbed point
        point: PointRef,
        /// Lane coordinate recorded on grab, restored every step
        row_value: f32,
        /// Animatable owning the point when grabbed
        animatable: AnimatableId,
        /// Animation owning the point when grabbed
        animation: AnimationId,
    },
    /// Chart background being panned
    Panning {
        /// Last pointer position
        last: Pos2,
    },
}

/// Which gesture a pointer-down started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Time tracker scrub
    Scrub,
    /// Keyframe point drag
    PointDrag,
    /// Background pan
    Pan,
    /// Scrub refused because playback owns the tracker
    Rejected,
    /// A gesture is already running
    Ignored,
}

/// Everything a gesture may touch
pub struct GestureContext<'a> {
    /// Chart adapter
    pub chart: &'a mut ChartAdapter,
    /// Time tracker
    pub tracker: &'a mut TimeTrackerState,
    /// Selected animatable, if any
    pub animatable: Option<&'a mut Animatable>,
    /// Editor settings
    pub settings: &'a EditorSettings,
    /// Playback is running
    pub playing: bool,
}

/// Drag gesture state machine
#[derive(Debug)]
pub struct DragGestureController {
    state: GestureState,
}

impl DragGestureController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
        }
    }

    /// Current state
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Pan/zoom mode the chart may use right now
    pub fn pan_mode(&self) -> PanMode {
        match self.state {
            GestureState::HoveringTracker
            | GestureState::ScrubbingTracker
            | GestureState::DraggingPoint { .. } => PanMode::None,
            GestureState::Idle | GestureState::Panning { .. } => PanMode::Frames,
        }
    }

    /// Pointer entered the time tracker's grab region
    pub fn pointer_enter_tracker(&mut self, tracker: &mut TimeTrackerState) {
        tracker.is_hovered = true;
        if self.state == GestureState::Idle {
            self.state = GestureState::HoveringTracker;
        }
    }

    /// Pointer left the time tracker's grab region
    pub fn pointer_leave_tracker(&mut self, tracker: &mut TimeTrackerState) {
        tracker.is_hovered = false;
        if self.state == GestureState::HoveringTracker {
            self.state = GestureState::Idle;
        }
    }

    /// Abandon any gesture
    pub fn reset(&mut self, tracker: &mut TimeTrackerState) {
        tracker.is_dragging = false;
        self.state = if tracker.is_hovered {
            GestureState::HoveringTracker
        } else {
            GestureState::Idle
        };
    }

    /// Abandon any gesture, committing an interrupted point drag.
    ///
    /// Drag steps leave the grabbed animation unsorted, so a point drag cut
    /// short by a selection change or teardown is sorted here. Returns the
    /// animatable and row index of the sorted animation.
    pub fn cancel(
        &mut self,
        tracker: &mut TimeTrackerState,
        scene: &mut Scene,
    ) -> Option<(AnimatableId, usize)> {
        let sorted = match self.state {
            GestureState::DraggingPoint {
                animatable,
                animation,
                ..
            } => scene.get_mut(animatable).and_then(|owner| {
                let index = owner.animation_index(animation)?;
                owner.animation_mut(animation)?.sort_keyframes();
                Some((animatable, index))
            }),
            _ => None,
        };
        if let Some((_, index)) = sorted {
            tracing::debug!("Committed interrupted drag on animation {index}");
        }
        self.reset(tracker);
        sorted
    }

    /// Classify and start a gesture
    pub fn pointer_down(&mut self, pos: Pos2, ctx: GestureContext<'_>) -> GestureKind {
        match self.state {
            GestureState::HoveringTracker => {
                if ctx.playing {
                    tracing::debug!("Scrub refused while playing");
                    return GestureKind::Rejected;
                }
                self.state = GestureState::ScrubbingTracker;
                ctx.tracker.is_dragging = true;
                scrub_to(pos, ctx.chart, ctx.tracker);
                GestureKind::Scrub
            }
            GestureState::Idle => {
                let grabbed = ctx.chart.hit_test(pos).and_then(|point| {
                    let animatable = ctx.animatable.as_deref()?;
                    let animation = animatable.animation_at(point.dataset)?;
                    let row_value = ctx.chart.point(point)?.value;
                    Some(GestureState::DraggingPoint {
                        point,
                        row_value,
                        animatable: animatable.id,
                        animation: animation.id,
                    })
                });

                match grabbed {
                    Some(state) => {
                        self.state = state;
                        GestureKind::PointDrag
                    }
                    None => {
                        self.state = GestureState::Panning { last: pos };
                        GestureKind::Pan
                    }
                }
            }
            _ => GestureKind::Ignored,
        }
    }

    /// Continue the running gesture.
    ///
    /// Returns the animation index whose keyframes changed, if any.
    pub fn pointer_move(&mut self, pos: Pos2, ctx: GestureContext<'_>) -> Option<usize> {
        match self.state {
            GestureState::ScrubbingTracker => {
                scrub_to(pos, ctx.chart, ctx.tracker);
                None
            }
            GestureState::DraggingPoint { .. } => self.drag_step(pos, ctx, false),
            GestureState::Panning { last } => {
                ctx.chart.pan_by_pixels(pos.x - last.x);
                self.state = GestureState::Panning { last: pos };
                None
            }
            GestureState::Idle | GestureState::HoveringTracker => None,
        }
    }

    /// Finish the running gesture.
    ///
    /// Returns the animation index whose keyframes changed, if any.
    pub fn pointer_up(&mut self, pos: Pos2, ctx: GestureContext<'_>) -> Option<usize> {
        match self.state {
            GestureState::ScrubbingTracker => {
                scrub_to(pos, ctx.chart, ctx.tracker);
                self.reset(ctx.tracker);
                None
            }
            GestureState::DraggingPoint { .. } => {
                let tracker_hovered = ctx.tracker.is_hovered;
                let changed = self.drag_step(pos, ctx, true);
                self.state = if tracker_hovered {
                    GestureState::HoveringTracker
                } else {
                    GestureState::Idle
                };
                changed
            }
            GestureState::Panning { .. } => {
                self.reset(ctx.tracker);
                None
            }
            GestureState::Idle | GestureState::HoveringTracker => None,
        }
    }

    /// One point-drag step. On `commit` the animation is also re-sorted.
    fn drag_step(&self, pos: Pos2, ctx: GestureContext<'_>, commit: bool) -> Option<usize> {
        let GestureState::DraggingPoint {
            point,
            row_value,
            animatable,
            animation,
        } = self.state
        else {
            return None;
        };

        // Only the frame axis is editable; the lane position is cosmetic
        if point.point == 0 {
            ctx.chart.set_point(point, DomainPoint::new(0.0, row_value));
            return None;
        }

        let target = ctx
            .animatable
            .filter(|a| a.id == animatable)
            .and_then(|a| a.animation_at_mut(point.dataset))
            .filter(|a| a.id == animation);
        let Some(target) = target else {
            tracing::debug!("Dropping drag step for stale point {:?}", point);
            return None;
        };

        // Without a mapping the last step's frame stands, but release still sorts
        let stored = ctx.chart.pixel_to_domain(pos).and_then(|domain| {
            let frame = ctx.settings.snap_frame(domain.frame).max(0.0);
            target.set_frame(point.point, frame)
        });
        if commit {
            target.sort_keyframes();
        }

        match stored {
            Some(stored) => {
                ctx.chart.set_point(point, DomainPoint::new(stored, row_value));
                Some(point.dataset)
            }
            None if commit => Some(point.dataset),
            None => {
                tracing::debug!("Dropping drag step for unmapped point {:?}", point);
                None
            }
        }
    }
}

impl Default for DragGestureController {
    fn default() -> Self {
        Self::new()
    }
}

fn scrub_to(pos: Pos2, chart: &mut ChartAdapter, tracker: &mut TimeTrackerState) {
    if let Some(domain) = chart.pixel_to_domain(pos) {
        tracker.set_value(domain.frame);
        chart.redraw(RedrawMode::Immediate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::keyframe::{DataType, Value};
    use crate::test_support::RecordingSurface;
    use egui::{Rect, Vec2};

    struct Fixture {
        chart: ChartAdapter,
        tracker: TimeTrackerState,
        node: Animatable,
        settings: EditorSettings,
        gesture: DragGestureController,
    }

    impl Fixture {
        fn new() -> Self {
            let settings = EditorSettings::default();
            let mut chart = ChartAdapter::new(&settings);
            let (surface, _) = RecordingSurface::new();
            // 10px per frame, one 100px lane
            chart.mount(
                Box::new(surface),
                Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 100.0)),
            );
            let mut node = Animatable::new("box");
            node.add_animation(
                Animation::new("alpha", "alpha", DataType::Scalar)
                    .with_keyframe(0.0, Value::Scalar(5.0))
                    .and_then(|a| a.with_keyframe(10.0, Value::Scalar(8.0)))
                    .and_then(|a| a.with_keyframe(20.0, Value::Scalar(9.0)))
                    .unwrap(),
            );
            chart.rebuild(Some(&node));
            Self {
                chart,
                tracker: TimeTrackerState::new(),
                node,
                settings,
                gesture: DragGestureController::new(),
            }
        }

        fn ctx(&mut self, playing: bool) -> (&mut DragGestureController, GestureContext<'_>) {
            let ctx = GestureContext {
                chart: &mut self.chart,
                tracker: &mut self.tracker,
                animatable: Some(&mut self.node),
                settings: &self.settings,
                playing,
            };
            (&mut self.gesture, ctx)
        }

        fn down(&mut self, x: f32, y: f32) -> GestureKind {
            let (gesture, ctx) = self.ctx(false);
            gesture.pointer_down(Pos2::new(x, y), ctx)
        }

        fn move_to(&mut self, x: f32, y: f32) -> Option<usize> {
            let (gesture, ctx) = self.ctx(false);
            gesture.pointer_move(Pos2::new(x, y), ctx)
        }

        fn up(&mut self, x: f32, y: f32) -> Option<usize> {
            let (gesture, ctx) = self.ctx(false);
            gesture.pointer_up(Pos2::new(x, y), ctx)
        }

        fn frames(&self) -> Vec<f32> {
            self.node.animation_at(0).unwrap().frames().collect()
        }
    }

    #[test]
    fn test_point_drag_retimes_and_sorts_on_release() {
        let mut f = Fixture::new();
        assert_eq!(f.down(100.0, 50.0), GestureKind::PointDrag);
        assert_eq!(f.gesture.pan_mode(), PanMode::None);

        // Drag key 1 past key 2; no sorting mid-gesture
        assert_eq!(f.move_to(250.0, 80.0), Some(0));
        assert_eq!(f.frames(), vec![0.0, 25.0, 20.0]);

        assert_eq!(f.up(250.0, 10.0), Some(0));
        assert_eq!(f.frames(), vec![0.0, 20.0, 25.0]);
        assert_eq!(f.gesture.state(), GestureState::Idle);
        assert_eq!(f.gesture.pan_mode(), PanMode::Frames);
    }

    #[test]
    fn test_vertical_drag_keeps_lane_and_value() {
        let mut f = Fixture::new();
        f.down(100.0, 50.0);
        f.move_to(100.0, 95.0);

        let point = f.chart.point(PointRef { dataset: 0, point: 1 }).unwrap();
        assert_eq!(point, DomainPoint::new(10.0, 0.5));
        let key = f.node.animation_at(0).unwrap().keyframe(1).copied().unwrap();
        assert_eq!(key.frame, 10.0);
        assert_eq!(key.value, Value::Scalar(8.0));
    }

    #[test]
    fn test_pinned_first_key_never_moves() {
        let mut f = Fixture::new();
        assert_eq!(f.down(0.0, 50.0), GestureKind::PointDrag);
        assert_eq!(f.move_to(400.0, 50.0), None);
        assert_eq!(f.up(400.0, 50.0), None);

        assert_eq!(f.frames(), vec![0.0, 10.0, 20.0]);
        assert_eq!(
            f.chart.point(PointRef { dataset: 0, point: 0 }).unwrap().frame,
            0.0
        );
    }

    #[test]
    fn test_drag_clamps_before_frame_zero() {
        let mut f = Fixture::new();
        f.down(200.0, 50.0);
        f.up(-80.0, 50.0);
        assert_eq!(f.frames(), vec![0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_release_without_mapping_still_sorts() {
        let mut f = Fixture::new();
        f.down(100.0, 50.0);
        f.move_to(250.0, 50.0);

        // Surface gone before release: no frame for the pointer
        f.chart.teardown();
        assert_eq!(f.up(900.0, 50.0), Some(0));
        assert_eq!(f.frames(), vec![0.0, 20.0, 25.0]);
        assert_eq!(f.gesture.state(), GestureState::Idle);
    }

    #[test]
    fn test_stale_point_is_ignored() {
        let mut f = Fixture::new();
        f.down(200.0, 50.0);

        // Selection changed mid-drag: a different animatable is current
        let mut other = Animatable::new("other");
        other.add_animation(
            Animation::new("beta", "beta", DataType::Scalar)
                .with_keyframe(0.0, Value::Scalar(1.0))
                .and_then(|a| a.with_keyframe(20.0, Value::Scalar(2.0)))
                .unwrap(),
        );
        let ctx = GestureContext {
            chart: &mut f.chart,
            tracker: &mut f.tracker,
            animatable: Some(&mut other),
            settings: &f.settings,
            playing: false,
        };
        assert_eq!(f.gesture.pointer_up(Pos2::new(500.0, 50.0), ctx), None);
        assert_eq!(other.animation_at(0).unwrap().frames().collect::<Vec<_>>(), vec![0.0, 20.0]);
        assert_eq!(f.gesture.state(), GestureState::Idle);
    }

    #[test]
    fn test_scrub_moves_tracker_and_blocks_pan() {
        let mut f = Fixture::new();
        f.gesture.pointer_enter_tracker(&mut f.tracker);
        assert_eq!(f.gesture.pan_mode(), PanMode::None);

        assert_eq!(f.down(0.0, 50.0), GestureKind::Scrub);
        assert!(f.tracker.is_dragging);

        // Leaving the grab region mid-scrub keeps scrubbing
        f.gesture.pointer_leave_tracker(&mut f.tracker);
        f.move_to(500.0, 50.0);
        assert_eq!(f.tracker.value, 50.0);
        assert_eq!(f.gesture.pan_mode(), PanMode::None);

        f.up(-30.0, 50.0);
        assert_eq!(f.tracker.value, 0.0);
        assert!(!f.tracker.is_dragging);
        assert_eq!(f.gesture.state(), GestureState::Idle);
        assert_eq!(f.gesture.pan_mode(), PanMode::Frames);
        // Keys untouched by scrubbing
        assert_eq!(f.frames(), vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_scrub_rejected_while_playing() {
        let mut f = Fixture::new();
        f.tracker.value = 7.0;
        f.gesture.pointer_enter_tracker(&mut f.tracker);

        let (gesture, ctx) = f.ctx(true);
        assert_eq!(gesture.pointer_down(Pos2::new(500.0, 50.0), ctx), GestureKind::Rejected);
        let (gesture, ctx) = f.ctx(true);
        gesture.pointer_move(Pos2::new(600.0, 50.0), ctx);

        assert_eq!(f.tracker.value, 7.0);
        assert!(!f.tracker.is_dragging);
        assert_eq!(f.gesture.state(), GestureState::HoveringTracker);
    }

    #[test]
    fn test_background_pan() {
        let mut f = Fixture::new();
        assert_eq!(f.down(700.0, 50.0), GestureKind::Pan);
        f.move_to(600.0, 50.0);
        assert_eq!(f.chart.frame_window(), (10.0, 110.0));

        f.up(600.0, 50.0);
        assert_eq!(f.gesture.state(), GestureState::Idle);
        assert_eq!(f.frames(), vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut f = Fixture::new();
        f.down(700.0, 50.0);
        assert_eq!(f.down(100.0, 50.0), GestureKind::Ignored);
    }
}
