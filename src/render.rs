// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene construction for the calibration canvas.
//!
//! [`build_scene`] turns the editor state into a flat list of draw commands
//! in zoomed canvas space (relative to the canvas origin). The canvas widget
//! only translates and paints them, so the filtering and styling rules are
//! testable without a GUI context.

use crate::editor::{Tool, ZoneEditor};
use crate::models::shape::Point;
use crate::util::geometry::{canvas_to_screen, Bounds};

pub const STROKE_WIDTH: f32 = 2.0;
pub const SELECTED_STROKE_WIDTH: f32 = 3.5;
pub const PREVIEW_COLOR: [u8; 3] = [173, 216, 230];
const VERTEX_COLOR: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Background frame scaled by zoom.
    Background { width: f32, height: f32 },
    Outline {
        points: Vec<[f32; 2]>,
        closed: bool,
        color: [u8; 3],
        width: f32,
        dashed: bool,
    },
    Vertex { at: [f32; 2], color: [u8; 3] },
    Label { at: [f32; 2], text: String, color: [u8; 3] },
}

fn scale(points: &[Point], zoom: f64) -> Vec<[f32; 2]> {
    points
        .iter()
        .map(|p| {
            let (x, y) = canvas_to_screen(p, zoom);
            [x as f32, y as f32]
        })
        .collect()
}

/// Build the draw list for one frame.
///
/// `background` is the frame size in pixels, `hover` the pointer position in
/// canvas coordinates (drives the in-progress preview).
pub fn build_scene(
    editor: &ZoneEditor,
    background: Option<(u32, u32)>,
    hover: Option<Point>,
) -> Vec<DrawCommand> {
    let zoom = editor.zoom() as f64;
    let mut commands = Vec::new();

    if let Some((width, height)) = background {
        commands.push(DrawCommand::Background {
            width: width as f32 * zoom as f32,
            height: height as f32 * zoom as f32,
        });
    }

    for shape in editor.shapes().iter().filter(|s| editor.is_visible(s)) {
        let selected = editor.selected() == Some(shape.id);
        let points = scale(&shape.outline(), zoom);
        let label_at = points.first().copied();

        commands.push(DrawCommand::Outline {
            points,
            closed: true,
            color: shape.color,
            width: if selected { SELECTED_STROKE_WIDTH } else { STROKE_WIDTH },
            dashed: selected,
        });
        if let Some(at) = label_at {
            commands.push(DrawCommand::Label {
                at,
                text: shape.name.clone(),
                color: shape.color,
            });
        }
    }

    match editor.tool() {
        Tool::Rectangle => {
            if let (Some(start), Some(end)) = (editor.pending_rectangle(), hover) {
                if let Some(bounds) = Bounds::enclosing(&[start, end]) {
                    commands.push(DrawCommand::Outline {
                        points: scale(&bounds.corners(), zoom),
                        closed: true,
                        color: PREVIEW_COLOR,
                        width: STROKE_WIDTH,
                        dashed: true,
                    });
                }
            }
            if let Some(start) = editor.pending_rectangle() {
                commands.push(DrawCommand::Vertex {
                    at: scale(&[start], zoom)[0],
                    color: VERTEX_COLOR,
                });
            }
        }
        Tool::Polygon if !editor.polygon_points().is_empty() => {
            let mut preview = editor.polygon_points().to_vec();
            preview.extend(hover);
            commands.push(DrawCommand::Outline {
                points: scale(&preview, zoom),
                closed: false,
                color: PREVIEW_COLOR,
                width: STROKE_WIDTH,
                dashed: false,
            });
            for at in scale(editor.polygon_points(), zoom) {
                commands.push(DrawCommand::Vertex {
                    at,
                    color: VERTEX_COLOR,
                });
            }
        }
        _ => {}
    }

    commands
}
