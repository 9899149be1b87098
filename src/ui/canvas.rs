// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Calibration canvas.
//!
//! Shows the camera frame at the current zoom with the zones on top, and
//! turns pointer input into canvas-space clicks for the editor.

use crate::editor::ZoneEditor;
use crate::models::shape::Point;
use crate::render::{self, DrawCommand};
use crate::util::geometry::screen_to_canvas;

/// Canvas size used when no frame is loaded.
const EMPTY_CANVAS_SIZE: egui::Vec2 = egui::vec2(1280.0, 720.0);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Click(Point),
    ZoomBy(f32),
}

/// Display the canvas and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    editor: &ZoneEditor,
    image_texture: &Option<egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let zoom = editor.zoom();
    let canvas_size = match image_size {
        Some((w, h)) => egui::vec2(w as f32 * zoom, h as f32 * zoom),
        None => EMPTY_CANVAS_SIZE * zoom,
    };

    egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
        egui::Frame::canvas(ui.style()).show(ui, |ui| {
            let (rect, response) = ui.allocate_exact_size(canvas_size, egui::Sense::click());
            let to_canvas = |pos: egui::Pos2| {
                screen_to_canvas((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64, zoom as f64)
            };

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    action = CanvasAction::Click(to_canvas(pos));
                }
            }

            if response.hovered() {
                let factor = ui.input(|i| i.zoom_delta());
                if (factor - 1.0).abs() > f32::EPSILON {
                    action = CanvasAction::ZoomBy(factor);
                }
            }

            let hover = response.hover_pos().map(to_canvas);
            let painter = ui.painter_at(rect);

            if image_texture.is_none() && editor.shapes().is_empty() && !editor.is_drawing() {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Open a camera frame to begin calibrating (File → Open Frame...)",
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_gray(150),
                );
            }

            for command in render::build_scene(editor, image_size, hover) {
                paint(&painter, rect.min, image_texture, command);
            }
        });
    });

    action
}

fn color(rgb: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Paint one draw command offset by the canvas origin.
fn paint(
    painter: &egui::Painter,
    origin: egui::Pos2,
    texture: &Option<egui::TextureHandle>,
    command: DrawCommand,
) {
    let at = |p: [f32; 2]| origin + egui::vec2(p[0], p[1]);

    match command {
        DrawCommand::Background { width, height } => {
            if let Some(texture) = texture {
                painter.image(
                    texture.id(),
                    egui::Rect::from_min_size(origin, egui::vec2(width, height)),
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
        }
        DrawCommand::Outline {
            points,
            closed,
            color: rgb,
            width,
            dashed,
        } => {
            let mut screen: Vec<egui::Pos2> = points.into_iter().map(at).collect();
            let stroke = egui::Stroke::new(width, color(rgb));
            if dashed {
                if closed {
                    if let Some(first) = screen.first().copied() {
                        screen.push(first);
                    }
                }
                painter.extend(egui::Shape::dashed_line(&screen, stroke, 8.0, 4.0));
            } else if closed {
                painter.add(egui::Shape::closed_line(screen, stroke));
            } else {
                painter.add(egui::Shape::line(screen, stroke));
            }
        }
        DrawCommand::Vertex { at: p, color: rgb } => {
            painter.circle_filled(at(p), 4.0, color(rgb));
            painter.circle_stroke(at(p), 4.0, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }
        DrawCommand::Label { at: p, text, color: rgb } => {
            painter.text(
                at(p) + egui::vec2(2.0, -2.0),
                egui::Align2::LEFT_BOTTOM,
                text,
                egui::FontId::proportional(12.0),
                color(rgb),
            );
        }
    }
}
