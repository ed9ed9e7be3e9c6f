// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording doubles for the editor's collaborators.

use crate::animation::{Animation, AnimationId};
use crate::chart::{ChartSurface, RedrawMode};
use crate::error::{EditorError, Result};
use crate::playback::{AnimationEngine, PlaybackHandle, PlaybackRequest};
use crate::scene::{Animatable, AnimatableId};
use crate::sync::{EditorView, SelectionSource, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

/// Install a test-writer subscriber so `tracing` output shows on failure
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

#[derive(Debug, Default)]
struct SurfaceRecord {
    redraws: Vec<RedrawMode>,
    destroy_calls: usize,
}

/// Shared view of what a [`RecordingSurface`] saw
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog(Rc<RefCell<SurfaceRecord>>);

impl SurfaceLog {
    pub fn redraws(&self) -> Vec<RedrawMode> {
        self.0.borrow().redraws.clone()
    }

    pub fn destroy_calls(&self) -> usize {
        self.0.borrow().destroy_calls
    }
}

pub struct RecordingSurface {
    log: SurfaceLog,
    fail_destroy: bool,
}

impl RecordingSurface {
    pub fn new() -> (Self, SurfaceLog) {
        let log = SurfaceLog::default();
        (
            Self {
                log: log.clone(),
                fail_destroy: false,
            },
            log,
        )
    }

    /// A surface whose teardown fails
    pub fn failing() -> (Self, SurfaceLog) {
        let (mut surface, log) = Self::new();
        surface.fail_destroy = true;
        (surface, log)
    }
}

impl ChartSurface for RecordingSurface {
    fn redraw(&mut self, mode: RedrawMode) {
        self.log.0.borrow_mut().redraws.push(mode);
    }

    fn destroy(&mut self) -> Result<()> {
        self.log.0.borrow_mut().destroy_calls += 1;
        if self.fail_destroy {
            return Err(EditorError::TeardownFailure("surface already gone".to_string()));
        }
        Ok(())
    }
}

/// Engine call, in order of arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    BeginAnimation(AnimatableId),
    StopAnimation(AnimatableId),
}

#[derive(Debug, Default)]
struct EngineRecord {
    calls: Vec<EngineCall>,
    requests: Vec<PlaybackRequest>,
    handle_stops: usize,
}

/// Shared view of what a [`RecordingEngine`] saw
#[derive(Debug, Clone, Default)]
pub struct EngineLog(Rc<RefCell<EngineRecord>>);

impl EngineLog {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.0.borrow().calls.clone()
    }

    pub fn requests(&self) -> Vec<PlaybackRequest> {
        self.0.borrow().requests.clone()
    }

    pub fn handle_stops(&self) -> usize {
        self.0.borrow().handle_stops
    }
}

pub struct RecordingEngine {
    log: EngineLog,
}

impl RecordingEngine {
    pub fn new() -> (Self, EngineLog) {
        let log = EngineLog::default();
        (Self { log: log.clone() }, log)
    }
}

struct RecordingHandle {
    log: EngineLog,
}

impl PlaybackHandle for RecordingHandle {
    fn stop(&mut self) {
        self.log.0.borrow_mut().handle_stops += 1;
    }
}

impl AnimationEngine for RecordingEngine {
    fn begin_animation(&mut self, request: &PlaybackRequest) -> Box<dyn PlaybackHandle> {
        let mut record = self.log.0.borrow_mut();
        record.calls.push(EngineCall::BeginAnimation(request.target));
        record.requests.push(request.clone());
        Box::new(RecordingHandle {
            log: self.log.clone(),
        })
    }

    fn stop_animation(&mut self, target: AnimatableId) {
        self.log.0.borrow_mut().calls.push(EngineCall::StopAnimation(target));
    }
}

/// View notification, with the data the view saw at the time
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    AnimatableSelected(Option<AnimatableId>),
    AnimationSelected(Option<AnimationId>),
    KeyChanged(usize, Vec<f32>),
    EditRequested(String),
}

/// Shared event queue of a [`RecordingView`]
#[derive(Debug, Clone, Default)]
pub struct ViewEvents(Rc<RefCell<Vec<ViewEvent>>>);

impl ViewEvents {
    /// Drain the recorded events
    pub fn take(&self) -> Vec<ViewEvent> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

pub struct RecordingView {
    name: String,
    events: ViewEvents,
}

impl RecordingView {
    pub fn new(name: &str) -> (Self, ViewEvents) {
        let events = ViewEvents::default();
        (
            Self {
                name: name.to_string(),
                events: events.clone(),
            },
            events,
        )
    }

    fn push(&self, event: ViewEvent) {
        self.events.0.borrow_mut().push(event);
    }
}

impl EditorView for RecordingView {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_animatable_selected(&mut self, animatable: Option<&Animatable>) {
        self.push(ViewEvent::AnimatableSelected(animatable.map(|a| a.id)));
    }

    fn on_animation_selected(
        &mut self,
        _animatable: Option<&Animatable>,
        animation: Option<&Animation>,
    ) {
        self.push(ViewEvent::AnimationSelected(animation.map(|a| a.id)));
    }

    fn on_key_changed(&mut self, animatable: &Animatable, animation_index: usize) {
        let frames = animatable
            .animation_at(animation_index)
            .map(|a| a.frames().collect())
            .unwrap_or_default();
        self.push(ViewEvent::KeyChanged(animation_index, frames));
    }

    fn on_edit_requested(&mut self, animation: &Animation) {
        self.push(ViewEvent::EditRequested(animation.name.clone()));
    }
}

/// Selection source that tracks live subscriptions
#[derive(Debug, Default)]
pub struct RecordingSource {
    next: u64,
    pub live: Vec<SubscriptionId>,
}

impl SelectionSource for RecordingSource {
    fn subscribe(&mut self) -> SubscriptionId {
        self.next += 1;
        let id = SubscriptionId(self.next);
        self.live.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.live.retain(|live| *live != id);
    }
}
