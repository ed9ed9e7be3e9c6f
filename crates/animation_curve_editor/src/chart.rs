// SPDX-License-Identifier: MIT OR Apache-2.0
//! Chart adapter.
//!
//! Owns the plotted datasets (one lane per animation) and the mapping between
//! pixels on the plot surface and `(frame, value)` domain coordinates. The
//! surface that actually paints is a [`ChartSurface`]; nothing outside this
//! module touches its internals.
//!
//! Axis policy:
//! - the frame axis spans the configured editing window, left to right
//! - the value axis is reversed (row 0 at the top) and spans one unit per lane

use crate::error::Result;
use crate::scene::Animatable;
use crate::settings::EditorSettings;
use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Smallest visible frame span when zooming in
const MIN_FRAME_SPAN: f32 = 2.0;

/// How a redraw should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedrawMode {
    /// Regular redraw, transitions allowed
    Animated,
    /// Zero-duration redraw, used while scrubbing
    Immediate,
}

/// The painting side of the chart
pub trait ChartSurface {
    /// Request a repaint
    fn redraw(&mut self, mode: RedrawMode);

    /// Release the surface. Errors are logged by the adapter, never propagated.
    fn destroy(&mut self) -> Result<()>;
}

/// Style of the time tracker annotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeTrackerStyle {
    /// Line color (RGBA)
    pub color: [u8; 4],
    /// Line width in pixels
    pub width: f32,
}

impl Default for TimeTrackerStyle {
    fn default() -> Self {
        Self {
            color: [255, 100, 100, 255],
            width: 2.0,
        }
    }
}

/// A point in chart domain coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainPoint {
    /// Frame axis coordinate
    pub frame: f32,
    /// Value axis coordinate (lane position)
    pub value: f32,
}

impl DomainPoint {
    /// Create a domain point
    pub fn new(frame: f32, value: f32) -> Self {
        Self { frame, value }
    }
}

/// Address of a plotted point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointRef {
    /// Dataset index (animation row)
    pub dataset: usize,
    /// Point index (keyframe index)
    pub point: usize,
}

/// Display-only projection of one animation's keyframes
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    /// Animation name
    pub label: String,
    /// Lane index
    pub row: usize,
    /// Points in keyframe order
    pub points: Vec<DomainPoint>,
}

/// Chart annotations
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Annotation {
    /// The persistent current-frame marker
    TimeTracker(TimeTrackerStyle),
    /// Highlighted lane of the selected animation
    Highlight {
        /// Highlighted row
        row: usize,
    },
}

/// Adapter between the chart surface and the animation data
pub struct ChartAdapter {
    datasets: Vec<ChartDataset>,
    /// Index 0 is always the time tracker
    annotations: Vec<Annotation>,
    row_labels: Vec<String>,
    frame_min: f32,
    frame_max: f32,
    row_offset: f32,
    hit_radius: f32,
    plot_rect: Rect,
    surface: Option<Box<dyn ChartSurface>>,
}

impl ChartAdapter {
    /// Create an unmounted adapter
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            datasets: Vec::new(),
            annotations: vec![Annotation::TimeTracker(settings.tracker_style)],
            row_labels: Vec::new(),
            frame_min: settings.frame_min,
            frame_max: settings.frame_max.max(settings.frame_min + MIN_FRAME_SPAN),
            row_offset: settings.row_offset,
            hit_radius: settings.hit_radius,
            plot_rect: Rect::NOTHING,
            surface: None,
        }
    }

    /// Attach a painting surface covering `plot_rect`
    pub fn mount(&mut self, surface: Box<dyn ChartSurface>, plot_rect: Rect) {
        self.surface = Some(surface);
        self.plot_rect = plot_rect;
    }

    /// Whether a surface is attached
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// Update the plot area after a layout change
    pub fn set_plot_rect(&mut self, plot_rect: Rect) {
        self.plot_rect = plot_rect;
    }

    /// Current plot area in pixels
    pub fn plot_rect(&self) -> Rect {
        self.plot_rect
    }

    /// Destroy the surface and drop all plotted data.
    ///
    /// Always completes; a failing surface only produces a warning.
    pub fn teardown(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            if let Err(e) = surface.destroy() {
                tracing::warn!("Chart teardown failed: {e}");
            }
        }
        self.datasets.clear();
        self.row_labels.clear();
        self.annotations.truncate(1);
    }

    /// Request a repaint from the surface
    pub fn redraw(&mut self, mode: RedrawMode) {
        if let Some(surface) = self.surface.as_mut() {
            surface.redraw(mode);
        }
    }

    /// Rebuild every dataset from an animatable
    pub fn rebuild(&mut self, animatable: Option<&Animatable>) {
        self.datasets.clear();
        self.annotations.truncate(1);

        let Some(animatable) = animatable else {
            self.update_row_labels();
            self.redraw(RedrawMode::Immediate);
            return;
        };

        for (row, animation) in animatable.animations().enumerate() {
            let row_value = self.row_value(row);
            self.datasets.push(ChartDataset {
                label: animation.name.clone(),
                row,
                points: animation
                    .frames()
                    .map(|frame| DomainPoint::new(frame, row_value))
                    .collect(),
            });
        }
        self.update_row_labels();

        if self.datasets.is_empty() {
            self.redraw(RedrawMode::Immediate);
        } else {
            self.redraw(RedrawMode::Animated);
        }
    }

    /// Rebuild only the dataset of one animation.
    ///
    /// Returns false when `index` no longer maps to both a dataset and an
    /// animation.
    pub fn refresh_dataset(&mut self, animatable: &Animatable, index: usize) -> bool {
        let row_value = self.row_value(index);
        let (Some(dataset), Some(animation)) =
            (self.datasets.get_mut(index), animatable.animation_at(index))
        else {
            return false;
        };

        dataset.label.clone_from(&animation.name);
        dataset.points = animation
            .frames()
            .map(|frame| DomainPoint::new(frame, row_value))
            .collect();

        self.update_row_labels();
        self.redraw(RedrawMode::Immediate);
        true
    }

    /// Plotted datasets
    pub fn datasets(&self) -> &[ChartDataset] {
        &self.datasets
    }

    /// Frames plotted by a dataset
    pub fn dataset_frames(&self, index: usize) -> Option<Vec<f32>> {
        self.datasets
            .get(index)
            .map(|d| d.points.iter().map(|p| p.frame).collect())
    }

    /// Get a plotted point
    pub fn point(&self, point: PointRef) -> Option<DomainPoint> {
        self.datasets.get(point.dataset)?.points.get(point.point).copied()
    }

    /// Move a plotted point. Returns false for a stale reference.
    pub fn set_point(&mut self, point: PointRef, position: DomainPoint) -> bool {
        match self
            .datasets
            .get_mut(point.dataset)
            .and_then(|d| d.points.get_mut(point.point))
        {
            Some(p) => {
                *p = position;
                true
            }
            None => false,
        }
    }

    /// Value-axis coordinate of a lane
    pub fn row_value(&self, row: usize) -> f32 {
        self.row_offset + row as f32
    }

    /// Value-axis tick label of a lane
    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.row_labels.get(row).map(String::as_str)
    }

    fn update_row_labels(&mut self) {
        self.row_labels = self.datasets.iter().map(|d| d.label.clone()).collect();
    }

    /// All annotations, time tracker first
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Style of the time tracker annotation
    pub fn time_tracker_style(&self) -> TimeTrackerStyle {
        match self.annotations.first() {
            Some(Annotation::TimeTracker(style)) => *style,
            _ => TimeTrackerStyle::default(),
        }
    }

    /// Restyle the time tracker annotation
    pub fn set_time_tracker_style(&mut self, style: TimeTrackerStyle) {
        self.annotations[0] = Annotation::TimeTracker(style);
        self.redraw(RedrawMode::Immediate);
    }

    /// Highlight one lane, or none
    pub fn set_highlight(&mut self, row: Option<usize>) {
        self.annotations
            .retain(|a| !matches!(a, Annotation::Highlight { .. }));
        if let Some(row) = row {
            self.annotations.push(Annotation::Highlight { row });
        }
        self.redraw(RedrawMode::Animated);
    }

    /// Currently highlighted lane
    pub fn highlighted_row(&self) -> Option<usize> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Highlight { row } => Some(*row),
            Annotation::TimeTracker(_) => None,
        })
    }

    /// Visible frame window
    pub fn frame_window(&self) -> (f32, f32) {
        (self.frame_min, self.frame_max)
    }

    /// Visible value range; the top of the plot is the first value
    pub fn value_range(&self) -> (f32, f32) {
        (0.0, self.datasets.len().max(1) as f32)
    }

    /// Convert a pixel position to domain coordinates.
    ///
    /// Returns `None` when no surface is mounted.
    pub fn pixel_to_domain(&self, pos: Pos2) -> Option<DomainPoint> {
        if !self.is_mounted() || self.plot_rect.width() <= 0.0 || self.plot_rect.height() <= 0.0 {
            return None;
        }
        let (value_top, value_bottom) = self.value_range();
        let tx = (pos.x - self.plot_rect.min.x) / self.plot_rect.width();
        let ty = (pos.y - self.plot_rect.min.y) / self.plot_rect.height();
        Some(DomainPoint::new(
            self.frame_min + tx * (self.frame_max - self.frame_min),
            value_top + ty * (value_bottom - value_top),
        ))
    }

    /// Convert domain coordinates to a pixel position
    pub fn domain_to_pixel(&self, point: DomainPoint) -> Option<Pos2> {
        if !self.is_mounted() {
            return None;
        }
        Some(Pos2::new(self.frame_to_x(point.frame), self.value_to_y(point.value)))
    }

    /// Pixel x of a frame
    pub fn frame_to_x(&self, frame: f32) -> f32 {
        let t = (frame - self.frame_min) / (self.frame_max - self.frame_min);
        self.plot_rect.min.x + t * self.plot_rect.width()
    }

    /// Pixel y of a value-axis coordinate
    pub fn value_to_y(&self, value: f32) -> f32 {
        let (value_top, value_bottom) = self.value_range();
        let t = (value - value_top) / (value_bottom - value_top);
        self.plot_rect.min.y + t * self.plot_rect.height()
    }

    /// Nearest point within the hit radius of `pos`
    pub fn hit_test(&self, pos: Pos2) -> Option<PointRef> {
        if !self.is_mounted() {
            return None;
        }
        let mut best: Option<(PointRef, f32)> = None;
        for (dataset_idx, dataset) in self.datasets.iter().enumerate() {
            for (point_idx, point) in dataset.points.iter().enumerate() {
                let pixel = Pos2::new(self.frame_to_x(point.frame), self.value_to_y(point.value));
                let distance = pixel.distance(pos);
                if distance > self.hit_radius {
                    continue;
                }
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((
                        PointRef {
                            dataset: dataset_idx,
                            point: point_idx,
                        },
                        distance,
                    ));
                }
            }
        }
        best.map(|(point, _)| point)
    }

    /// Pan the frame axis by a pixel delta
    pub fn pan_by_pixels(&mut self, delta_x: f32) {
        if self.plot_rect.width() <= 0.0 {
            return;
        }
        let frames_per_pixel = (self.frame_max - self.frame_min) / self.plot_rect.width();
        let shift = (-delta_x * frames_per_pixel).max(-self.frame_min);
        self.frame_min += shift;
        self.frame_max += shift;
        self.redraw(RedrawMode::Immediate);
    }

    /// Zoom the frame axis about a pixel x position. Factors above 1 zoom in.
    pub fn zoom_about(&mut self, anchor_x: f32, factor: f32) {
        if factor <= 0.0 || self.plot_rect.width() <= 0.0 {
            return;
        }
        let span = self.frame_max - self.frame_min;
        let t = ((anchor_x - self.plot_rect.min.x) / self.plot_rect.width()).clamp(0.0, 1.0);
        let anchor_frame = self.frame_min + t * span;
        let new_span = (span / factor).max(MIN_FRAME_SPAN);

        self.frame_min = (anchor_frame - t * new_span).max(0.0);
        self.frame_max = self.frame_min + new_span;
        self.redraw(RedrawMode::Immediate);
    }
}
