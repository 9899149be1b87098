// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone drawing and selection state machine.
//!
//! The editor owns the zone list for the open intersection along with the
//! active tool, the pending rectangle corner, the in-progress polygon and
//! the current selection. Canvas clicks arrive here already divided by the
//! zoom factor, so everything stored is in unscaled canvas pixels.

mod history;

use crate::config::AppConfig;
use crate::models::shape::{Layer, Point, Shape, ShapeTag};
use history::History;
use thiserror::Error;

/// Zone colors, picked by direction or violation type index.
const ZONE_PALETTE: &[[u8; 3]] = &[
    [255, 200, 100], // Orange
    [100, 150, 255], // Blue
    [100, 255, 150], // Green
    [255, 100, 200], // Pink
    [200, 100, 255], // Purple
    [255, 255, 100], // Yellow
    [100, 255, 255], // Cyan
    [255, 150, 100], // Coral
];

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Rectangle,
    Polygon,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Select, Tool::Rectangle, Tool::Polygon];

    pub fn label(self) -> &'static str {
        match self {
            Tool::Select => "⬆ Select",
            Tool::Rectangle => "▭ Rectangle",
            Tool::Polygon => "▱ Polygon",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Tool::Select => "Click a zone to select it, click empty space to deselect",
            Tool::Rectangle => "Click one corner, then the opposite corner",
            Tool::Polygon => "Click to add vertices, then press Finish (or Enter)",
        }
    }
}

/// Per-layer visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub direction: bool,
    pub violation: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            direction: true,
            violation: true,
        }
    }
}

impl LayerVisibility {
    pub fn is_visible(&self, layer: Layer) -> bool {
        match layer {
            Layer::Direction => self.direction,
            Layer::Violation => self.violation,
        }
    }
}

/// What a canvas click did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    Selected(u64),
    Deselected,
    RectangleStarted(Point),
    ShapeCreated(u64),
    VertexAdded(usize),
    Rejected(EditorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("a polygon needs at least 3 points, only {0} placed")]
    TooFewPoints(usize),
    #[error("zone {0} does not exist")]
    UnknownShape(u64),
    #[error("no zone ids left; export and reload the calibration")]
    IdsExhausted,
}

/// Interactive zone editor.
#[derive(Debug)]
pub struct ZoneEditor {
    tool: Tool,
    shapes: Vec<Shape>,
    selected: Option<u64>,
    rect_start: Option<Point>,
    polygon_points: Vec<Point>,
    next_id: u64,
    zoom: f32,
    history: History,

    /// Direction applied to new zones and used as the display filter
    pub direction: Option<String>,
    /// Layer applied to new zones
    pub layer: Layer,
    /// Violation type applied to new violation-layer zones
    pub violation_type: Option<String>,
    pub visibility: LayerVisibility,

    directions: Vec<String>,
    violation_types: Vec<String>,
}

impl ZoneEditor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            tool: Tool::Select,
            shapes: Vec::new(),
            selected: None,
            rect_start: None,
            polygon_points: Vec::new(),
            next_id: 1,
            zoom: config.canvas.default_zoom,
            history: History::new(),
            direction: config.directions.first().cloned(),
            layer: Layer::Direction,
            violation_type: config.violation_types.first().cloned(),
            visibility: LayerVisibility::default(),
            directions: config.directions.clone(),
            violation_types: config.violation_types.clone(),
        }
    }

    /// Replace the zone list wholesale (project load). Drops history and drawing state.
    pub fn load_shapes(&mut self, shapes: Vec<Shape>, next_id: u64) {
        let max_id = shapes.iter().map(|s| s.id).max().unwrap_or(0);
        self.next_id = next_id.max(max_id.saturating_add(1));
        self.shapes = shapes;
        self.selected = None;
        self.cancel_drawing();
        self.history.clear();
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools, discarding any half-drawn zone.
    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.cancel_drawing();
            self.tool = tool;
            log::debug!("Tool changed to {:?}", tool);
        }
    }

    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.shape(id))
    }

    pub fn shape(&self, id: u64) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Select a zone. Missing or hidden zones clear the selection.
    pub fn select(&mut self, id: Option<u64>) {
        self.selected = id.filter(|id| self.shape(*id).is_some_and(|s| self.is_visible(s)));
    }

    /// Drop the selection once the direction filter or a layer toggle hides it.
    pub fn drop_hidden_selection(&mut self) {
        if self.selected_shape().is_some_and(|s| !self.is_visible(s)) {
            log::debug!("Selected zone hidden, clearing selection");
            self.selected = None;
        }
    }

    pub fn pending_rectangle(&self) -> Option<Point> {
        self.rect_start
    }

    pub fn polygon_points(&self) -> &[Point] {
        &self.polygon_points
    }

    pub fn is_drawing(&self) -> bool {
        self.rect_start.is_some() || !self.polygon_points.is_empty()
    }

    pub fn cancel_drawing(&mut self) {
        self.rect_start = None;
        self.polygon_points.clear();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32, min: f32, max: f32) {
        self.zoom = zoom.clamp(min, max);
    }

    /// Is the shape shown under the current direction filter and layer toggles?
    pub fn is_visible(&self, shape: &Shape) -> bool {
        shape.matches_direction(self.direction.as_deref()) && self.visibility.is_visible(shape.layer)
    }

    /// Handle a canvas click at `point` (canvas coordinates).
    pub fn click(&mut self, point: Point) -> ClickOutcome {
        match self.tool {
            Tool::Select => {
                let hit = self
                    .shapes
                    .iter()
                    .find(|s| self.is_visible(s) && s.contains(point))
                    .map(|s| s.id);
                self.selected = hit;
                match hit {
                    Some(id) => ClickOutcome::Selected(id),
                    None => ClickOutcome::Deselected,
                }
            }
            Tool::Rectangle => match self.rect_start {
                Some(start) => {
                    let id = match self.allocate_id() {
                        Ok(id) => id,
                        Err(e) => return ClickOutcome::Rejected(e),
                    };
                    self.rect_start = None;
                    let shape = Shape::rectangle(id, start, point, self.current_tag(id));
                    self.append(shape);
                    ClickOutcome::ShapeCreated(id)
                }
                None => {
                    self.rect_start = Some(point);
                    ClickOutcome::RectangleStarted(point)
                }
            },
            Tool::Polygon => {
                self.polygon_points.push(point);
                ClickOutcome::VertexAdded(self.polygon_points.len())
            }
        }
    }

    /// Close the in-progress polygon. Fewer than 3 points leaves everything untouched.
    pub fn finish_polygon(&mut self) -> Result<u64, EditorError> {
        let count = self.polygon_points.len();
        if count < 3 {
            return Err(EditorError::TooFewPoints(count));
        }
        let id = self.allocate_id()?;
        let points = std::mem::take(&mut self.polygon_points);
        let shape = Shape::polygon(id, points, self.current_tag(id))
            .map_err(|_| EditorError::TooFewPoints(count))?;
        self.append(shape);
        Ok(id)
    }

    /// Replace an existing zone with an edited copy.
    pub fn replace_shape(&mut self, shape: Shape) -> Result<(), EditorError> {
        let index = self
            .shapes
            .iter()
            .position(|s| s.id == shape.id)
            .ok_or(EditorError::UnknownShape(shape.id))?;
        self.history.push(self.shapes.clone());
        self.shapes[index] = shape;
        Ok(())
    }

    pub fn delete_shape(&mut self, id: u64) -> Result<Shape, EditorError> {
        let index = self
            .shapes
            .iter()
            .position(|s| s.id == id)
            .ok_or(EditorError::UnknownShape(id))?;
        self.history.push(self.shapes.clone());
        let removed = self.shapes.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::info!("Deleted zone {}, total: {}", id, self.shapes.len());
        Ok(removed)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.shapes.clone()) {
            Some(previous) => {
                self.shapes = previous;
                self.selected = None;
                log::info!("Undo, total zones: {}", self.shapes.len());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.shapes.clone()) {
            Some(next) => {
                self.shapes = next;
                self.selected = None;
                log::info!("Redo, total zones: {}", self.shapes.len());
                true
            }
            None => false,
        }
    }

    /// Confirm the calibration. Nothing is written; returns the zone count.
    pub fn save_calibration(&self) -> usize {
        log::info!("Calibration saved with {} zones", self.shapes.len());
        self.shapes.len()
    }

    fn allocate_id(&mut self) -> Result<u64, EditorError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(EditorError::IdsExhausted)?;
        Ok(id)
    }

    fn append(&mut self, shape: Shape) {
        self.history.push(self.shapes.clone());
        log::info!("Created {:?} zone {} ({})", shape.kind, shape.id, shape.name);
        self.shapes.push(shape);
    }

    /// Tag for a new zone from the current direction/layer/violation selection.
    fn current_tag(&self, id: u64) -> ShapeTag {
        let direction = self.direction.clone();
        let (label, color_index) = match self.layer {
            Layer::Direction => (
                "zone".to_string(),
                index_of(&self.directions, direction.as_deref()),
            ),
            Layer::Violation => (
                self.violation_type.clone().unwrap_or_else(|| "violation".to_string()),
                index_of(&self.violation_types, self.violation_type.as_deref()),
            ),
        };
        let name = match &direction {
            Some(dir) => format!("{} {} {}", dir, label, id),
            None => format!("{} {}", label, id),
        };

        ShapeTag {
            name,
            color: ZONE_PALETTE[color_index % ZONE_PALETTE.len()],
            direction,
            layer: self.layer,
            violation_type: self.violation_type.clone(),
        }
    }
}

fn index_of(items: &[String], value: Option<&str>) -> usize {
    value
        .and_then(|v| items.iter().position(|item| item == v))
        .unwrap_or(0)
}
