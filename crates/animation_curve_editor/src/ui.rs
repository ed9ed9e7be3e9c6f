// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline chart UI rendering.
//!
//! Features:
//! - Frame ruler with the time tracker handle
//! - One lane per animation, labelled with the animation name
//! - Keyframe points, dragged horizontally to retime
//! - Tracker scrubbing, background pan, Ctrl+scroll zoom
//! - Playback and keying toolbar

use crate::chart::{ChartSurface, PointRef, RedrawMode};
use crate::editor::AnimationEditor;
use crate::error::{EditorError, Result};
use crate::gesture::GestureState;
use crate::playback::SyncType;
use crate::scene::Scene;
use egui::{Color32, Pos2, Rect, Sense, Stroke};
use std::time::Duration;

const LANE_LABEL_WIDTH: f32 = 140.0;
const RULER_HEIGHT: f32 = 24.0;
const KEYFRAME_SIZE: f32 = 10.0;
const ZOOM_SPEED: f32 = 0.01;
const ANIMATED_REPAINT: Duration = Duration::from_millis(16);

/// Chart surface painted by egui
pub struct EguiChartSurface {
    ctx: egui::Context,
    destroyed: bool,
}

impl EguiChartSurface {
    /// Create a surface repainting through `ctx`
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            destroyed: false,
        }
    }
}

impl ChartSurface for EguiChartSurface {
    fn redraw(&mut self, mode: RedrawMode) {
        if self.destroyed {
            return;
        }
        match mode {
            RedrawMode::Immediate => self.ctx.request_repaint(),
            RedrawMode::Animated => self.ctx.request_repaint_after(ANIMATED_REPAINT),
        }
    }

    fn destroy(&mut self) -> Result<()> {
        if self.destroyed {
            return Err(EditorError::TeardownFailure(
                "egui surface already destroyed".to_string(),
            ));
        }
        self.destroyed = true;
        Ok(())
    }
}

/// The timeline chart widget.
///
/// Stateless apart from layout; all editing state lives in the
/// [`AnimationEditor`]. The host mounts an [`EguiChartSurface`] on the editor
/// before the first frame.
#[derive(Debug, Clone, Default)]
pub struct TimelineChart {
    /// Hide the toolbar row
    pub hide_toolbar: bool,
}

impl TimelineChart {
    /// Create the widget
    pub fn new() -> Self {
        Self::default()
    }

    /// Plot area inside the widget's rect
    pub fn plot_rect(rect: Rect) -> Rect {
        Rect::from_min_max(
            Pos2::new(rect.min.x + LANE_LABEL_WIDTH, rect.min.y + RULER_HEIGHT),
            rect.max,
        )
    }

    /// Render the toolbar and chart
    pub fn ui(&mut self, ui: &mut egui::Ui, editor: &mut AnimationEditor, scene: &mut Scene) {
        if !self.hide_toolbar {
            self.render_toolbar(ui, editor, scene);
            ui.separator();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let plot_rect = Self::plot_rect(rect);
        editor.chart_mut().set_plot_rect(plot_rect);

        self.handle_input(ui, &response, plot_rect, editor, scene);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));
        self.render_lanes(&painter, rect, plot_rect, editor);
        self.render_ruler(&painter, rect, plot_rect, editor);
        self.render_keyframes(&painter, plot_rect, editor);
        self.render_tracker(&painter, rect, plot_rect, editor);
    }

    /// Render toolbar with playback and keying controls
    fn render_toolbar(&self, ui: &mut egui::Ui, editor: &mut AnimationEditor, scene: &mut Scene) {
        ui.horizontal(|ui| {
            if editor.is_playing() {
                if ui.button("⏹").on_hover_text("Stop").clicked() {
                    editor.stop();
                }
            } else if ui.button("▶").on_hover_text("Play (Space)").clicked() {
                editor.play(scene);
            }

            if ui
                .button("Add Key")
                .on_hover_text("Key the live value at the current frame")
                .clicked()
            {
                editor.add_key(scene);
            }

            if ui.button("Edit").clicked() {
                editor.edit_current_animation(scene);
            }

            ui.separator();

            let mut sync_type = editor.sync_type();
            for option in SyncType::all() {
                ui.selectable_value(&mut sync_type, *option, option.name());
            }
            editor.set_sync_type(sync_type);

            ui.separator();
            ui.monospace(format!("Frame {:.1}", editor.current_frame()));
        });
    }

    /// Translate egui input into editor pointer events
    fn handle_input(
        &self,
        ui: &egui::Ui,
        response: &egui::Response,
        plot_rect: Rect,
        editor: &mut AnimationEditor,
        scene: &mut Scene,
    ) {
        let hover = response.hover_pos();

        // Tracker grab region
        let tracker_x = editor.chart().frame_to_x(editor.current_frame());
        let grab_width = editor.settings().tracker_grab_width;
        let over_tracker = hover.is_some_and(|pos| {
            pos.y >= plot_rect.min.y - RULER_HEIGHT
                && pos.y <= plot_rect.max.y
                && (pos.x - tracker_x).abs() <= grab_width
        });
        if over_tracker != editor.tracker().is_hovered {
            if over_tracker {
                editor.pointer_enter_tracker();
            } else {
                editor.pointer_leave_tracker();
            }
        }

        let pointer = response
            .interact_pointer_pos()
            .or_else(|| ui.input(|i| i.pointer.latest_pos()));

        if let Some(pos) = pointer {
            if response.drag_started_by(egui::PointerButton::Primary) {
                editor.pointer_down(scene, pos);
            } else if response.dragged_by(egui::PointerButton::Primary) {
                editor.pointer_move(scene, pos);
            }
            if response.drag_stopped_by(egui::PointerButton::Primary) {
                editor.pointer_up(scene, pos);
            }

            // Right click deletes a key
            if response.secondary_clicked() {
                if let Some(point) = editor.chart().hit_test(pos) {
                    editor.delete_key(scene, point);
                }
            }
        }

        // Ctrl+scroll zoom about the pointer
        if let Some(pos) = hover {
            let (scroll, ctrl) = ui.input(|i| (i.smooth_scroll_delta.y, i.modifiers.ctrl));
            if ctrl && scroll != 0.0 {
                editor.zoom(pos.x, 1.0 + scroll * ZOOM_SPEED);
            }
        }

        if response.hovered() {
            let (space, home, end) = ui.input(|i| {
                (
                    i.key_pressed(egui::Key::Space),
                    i.key_pressed(egui::Key::Home),
                    i.key_pressed(egui::Key::End),
                )
            });

            if space {
                if editor.is_playing() {
                    editor.stop();
                } else {
                    editor.play(scene);
                }
            }

            if home {
                editor.seek(editor.chart().frame_window().0);
            }

            if end {
                let last = editor
                    .chart()
                    .datasets()
                    .iter()
                    .flat_map(|d| d.points.iter().map(|p| p.frame))
                    .reduce(f32::max);
                editor.seek(last.unwrap_or(editor.chart().frame_window().1));
            }
        }
    }

    /// Render lane backgrounds and labels
    fn render_lanes(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        plot_rect: Rect,
        editor: &AnimationEditor,
    ) {
        let chart = editor.chart();
        let highlighted = chart.highlighted_row();

        for dataset in chart.datasets() {
            let top = chart.value_to_y(dataset.row as f32);
            let bottom = chart.value_to_y(dataset.row as f32 + 1.0);
            let lane_rect = Rect::from_min_max(
                Pos2::new(rect.min.x, top),
                Pos2::new(rect.max.x, bottom),
            );

            let bg_color = if highlighted == Some(dataset.row) {
                Color32::from_rgb(50, 60, 80)
            } else if dataset.row % 2 == 0 {
                Color32::from_gray(35)
            } else {
                Color32::from_gray(40)
            };
            painter.rect_filled(lane_rect, 0.0, bg_color);

            painter.text(
                Pos2::new(rect.min.x + 8.0, lane_rect.center().y),
                egui::Align2::LEFT_CENTER,
                chart.row_label(dataset.row).unwrap_or_default(),
                egui::FontId::proportional(12.0),
                Color32::from_gray(200),
            );

            painter.line_segment(
                [Pos2::new(rect.min.x, bottom), Pos2::new(rect.max.x, bottom)],
                Stroke::new(1.0, Color32::from_gray(25)),
            );
        }

        painter.line_segment(
            [
                Pos2::new(plot_rect.min.x, rect.min.y),
                Pos2::new(plot_rect.min.x, rect.max.y),
            ],
            Stroke::new(1.0, Color32::from_gray(60)),
        );
    }

    /// Render frame ruler
    fn render_ruler(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        plot_rect: Rect,
        editor: &AnimationEditor,
    ) {
        let chart = editor.chart();
        let ruler_rect = Rect::from_min_max(
            Pos2::new(plot_rect.min.x, rect.min.y),
            Pos2::new(rect.max.x, plot_rect.min.y),
        );
        painter.rect_filled(ruler_rect, 0.0, Color32::from_gray(40));

        let (visible_start, visible_end) = chart.frame_window();
        let pixels_per_frame = plot_rect.width() / (visible_end - visible_start);

        // Calculate tick interval based on zoom
        let tick_interval = if pixels_per_frame > 20.0 {
            1.0
        } else if pixels_per_frame > 4.0 {
            5.0
        } else if pixels_per_frame > 1.0 {
            10.0
        } else {
            50.0
        };
        let major_interval = tick_interval * 5.0;

        let mut frame = (visible_start / tick_interval).floor() * tick_interval;
        while frame <= visible_end {
            let x = chart.frame_to_x(frame);
            if x >= plot_rect.min.x && x <= rect.max.x {
                let is_major = (frame / major_interval).fract().abs() < 0.001;
                let tick_height = if is_major { 10.0 } else { 5.0 };
                let tick_color = if is_major {
                    Color32::from_gray(180)
                } else {
                    Color32::from_gray(100)
                };

                painter.line_segment(
                    [
                        Pos2::new(x, ruler_rect.max.y - tick_height),
                        Pos2::new(x, ruler_rect.max.y),
                    ],
                    Stroke::new(1.0, tick_color),
                );

                if is_major {
                    painter.text(
                        Pos2::new(x + 2.0, ruler_rect.min.y + 3.0),
                        egui::Align2::LEFT_TOP,
                        format!("{frame:.0}"),
                        egui::FontId::monospace(10.0),
                        Color32::from_gray(180),
                    );
                }
            }
            frame += tick_interval;
        }
    }

    /// Render keyframe points as diamonds
    fn render_keyframes(&self, painter: &egui::Painter, plot_rect: Rect, editor: &AnimationEditor) {
        let chart = editor.chart();
        let dragged = match editor.gesture_state() {
            GestureState::DraggingPoint { point, .. } => Some(point),
            _ => None,
        };

        for (dataset_idx, dataset) in chart.datasets().iter().enumerate() {
            for (point_idx, point) in dataset.points.iter().enumerate() {
                let Some(pos) = chart.domain_to_pixel(*point) else {
                    continue;
                };
                if pos.x < plot_rect.min.x - KEYFRAME_SIZE
                    || pos.x > plot_rect.max.x + KEYFRAME_SIZE
                {
                    continue;
                }

                let this = PointRef {
                    dataset: dataset_idx,
                    point: point_idx,
                };
                let half_size = KEYFRAME_SIZE / 2.0;
                let diamond = vec![
                    Pos2::new(pos.x, pos.y - half_size),
                    Pos2::new(pos.x + half_size, pos.y),
                    Pos2::new(pos.x, pos.y + half_size),
                    Pos2::new(pos.x - half_size, pos.y),
                ];

                // The first key is pinned to frame 0
                let fill_color = if dragged == Some(this) {
                    Color32::from_rgb(255, 200, 100)
                } else if point_idx == 0 {
                    Color32::from_gray(150)
                } else {
                    Color32::from_rgb(120, 180, 255)
                };
                let stroke = if dragged == Some(this) {
                    Stroke::new(2.0, Color32::WHITE)
                } else {
                    Stroke::new(1.0, Color32::from_gray(80))
                };

                painter.add(egui::Shape::convex_polygon(diamond, fill_color, stroke));
            }
        }
    }

    /// Render the time tracker line and handle
    fn render_tracker(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        plot_rect: Rect,
        editor: &AnimationEditor,
    ) {
        let chart = editor.chart();
        let tracker = editor.tracker();
        let x = chart.frame_to_x(tracker.value);
        if x < plot_rect.min.x || x > rect.max.x {
            return;
        }

        let style = chart.time_tracker_style();
        let color = Color32::from_rgba_unmultiplied(
            style.color[0],
            style.color[1],
            style.color[2],
            style.color[3],
        );
        let width = if tracker.is_hovered || tracker.is_dragging {
            style.width * 1.5
        } else {
            style.width
        };

        painter.line_segment(
            [Pos2::new(x, plot_rect.min.y), Pos2::new(x, rect.max.y)],
            Stroke::new(width, color),
        );

        let handle = vec![
            Pos2::new(x, plot_rect.min.y),
            Pos2::new(x - 6.0, plot_rect.min.y - 8.0),
            Pos2::new(x + 6.0, plot_rect.min.y - 8.0),
        ];
        painter.add(egui::Shape::convex_polygon(handle, color, Stroke::NONE));
    }
}
