// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time tracker: the "current frame" marker shared by every view.

/// Time tracker state
///
/// Written by manual scrubbing and by playback progress. The playback
/// bridge's Idle/Playing state decides which of the two may write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeTrackerState {
    /// Current frame
    pub value: f32,
    /// Pointer is inside the tracker's grab region
    pub is_hovered: bool,
    /// Tracker is being scrubbed
    pub is_dragging: bool,
}

impl TimeTrackerState {
    /// Create a tracker at frame 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the tracker, clamping to frame 0
    pub fn set_value(&mut self, frame: f32) {
        self.value = frame.max(0.0);
    }

    /// Back to frame 0 with no hover or drag
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_clamps() {
        let mut tracker = TimeTrackerState::new();
        tracker.set_value(-3.0);
        assert_eq!(tracker.value, 0.0);
        tracker.set_value(42.0);
        assert_eq!(tracker.value, 42.0);
    }

    #[test]
    fn test_reset() {
        let mut tracker = TimeTrackerState {
            value: 12.0,
            is_hovered: true,
            is_dragging: true,
        };
        tracker.reset();
        assert_eq!(tracker, TimeTrackerState::default());
    }
}
