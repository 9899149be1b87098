// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone (mask) data structures.
//!
//! A zone is a rectangle or polygon drawn over the camera frame and tagged
//! with a compass direction and a layer. Zones are never edited in place;
//! a change produces a new `Shape` that replaces the old one.

use crate::util::geometry::{self, Bounds};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A 2D point in canvas pixel space (unscaled by zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometry of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Polygon,
}

/// Classification of a zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    #[default]
    /// Coarse zone covering a whole approach direction.
    Direction,
    /// Fine-grained zone used for a single violation type.
    Violation,
}

impl Layer {
    pub fn label(self) -> &'static str {
        match self {
            Layer::Direction => "Direction",
            Layer::Violation => "Violation",
        }
    }
}

/// Errors raised when a shape's geometry breaks its point-count invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("a rectangle needs exactly 2 corner points, got {0}")]
    RectanglePoints(usize),
    #[error("a polygon needs at least 3 points, got {0}")]
    TooFewPolygonPoints(usize),
}

/// Tag applied to every shape created while it is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeTag {
    pub name: String,
    pub color: [u8; 3],
    pub direction: Option<String>,
    pub layer: Layer,
    pub violation_type: Option<String>,
}

/// A finalized zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub points: Vec<Point>,
    pub color: [u8; 3],
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation_type: Option<String>,
    pub layer: Layer,
}

impl Shape {
    /// Build a rectangle spanning two opposite corners.
    pub fn rectangle(id: u64, start: Point, end: Point, tag: ShapeTag) -> Self {
        Self::from_tag(id, ShapeKind::Rectangle, vec![start, end], tag)
    }

    /// Build a polygon from its vertices.
    pub fn polygon(id: u64, points: Vec<Point>, tag: ShapeTag) -> Result<Self, ShapeError> {
        if points.len() < 3 {
            return Err(ShapeError::TooFewPolygonPoints(points.len()));
        }
        Ok(Self::from_tag(id, ShapeKind::Polygon, points, tag))
    }

    fn from_tag(id: u64, kind: ShapeKind, points: Vec<Point>, tag: ShapeTag) -> Self {
        // Only violation-layer zones carry a violation type.
        let violation_type = match tag.layer {
            Layer::Violation => tag.violation_type,
            Layer::Direction => None,
        };
        Self {
            id,
            kind,
            points,
            color: tag.color,
            name: tag.name,
            direction: tag.direction,
            violation_type,
            layer: tag.layer,
        }
    }

    /// Check the point-count invariant (used for shapes read from disk).
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self.kind {
            ShapeKind::Rectangle if self.points.len() != 2 => {
                Err(ShapeError::RectanglePoints(self.points.len()))
            }
            ShapeKind::Polygon if self.points.len() < 3 => {
                Err(ShapeError::TooFewPolygonPoints(self.points.len()))
            }
            _ => Ok(()),
        }
    }

    /// Return a copy with a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Axis-aligned bounds of the shape.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(&self.points)
    }

    /// Hit test in canvas space.
    pub fn contains(&self, point: Point) -> bool {
        match self.kind {
            ShapeKind::Rectangle => self.bounds().is_some_and(|b| b.contains(point)),
            ShapeKind::Polygon => geometry::point_in_polygon(point, &self.points),
        }
    }

    /// Outline vertices in drawing order. Rectangles expand to 4 corners.
    pub fn outline(&self) -> Vec<Point> {
        match self.kind {
            ShapeKind::Rectangle => self
                .bounds()
                .map(|b| b.corners().to_vec())
                .unwrap_or_default(),
            ShapeKind::Polygon => self.points.clone(),
        }
    }

    /// Does this shape belong to the given direction filter?
    ///
    /// Untagged shapes and an empty filter match everything.
    pub fn matches_direction(&self, direction: Option<&str>) -> bool {
        match (direction, self.direction.as_deref()) {
            (Some(wanted), Some(own)) => wanted == own,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(layer: Layer) -> ShapeTag {
        ShapeTag {
            name: "north zone 1".to_string(),
            color: [255, 0, 0],
            direction: Some("north".to_string()),
            layer,
            violation_type: Some("red_light".to_string()),
        }
    }

    #[test]
    fn test_rectangle_keeps_both_corners() {
        let shape = Shape::rectangle(1, Point::new(10.0, 10.0), Point::new(50.0, 80.0), tag(Layer::Direction));
        assert_eq!(shape.kind, ShapeKind::Rectangle);
        assert_eq!(shape.points, vec![Point::new(10.0, 10.0), Point::new(50.0, 80.0)]);
        assert!(shape.validate().is_ok());
    }

    #[test]
    fn test_direction_layer_drops_violation_type() {
        let shape = Shape::rectangle(1, Point::new(0.0, 0.0), Point::new(5.0, 5.0), tag(Layer::Direction));
        assert_eq!(shape.violation_type, None);

        let shape = Shape::rectangle(2, Point::new(0.0, 0.0), Point::new(5.0, 5.0), tag(Layer::Violation));
        assert_eq!(shape.violation_type.as_deref(), Some("red_light"));
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let points = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        assert_eq!(
            Shape::polygon(1, points, tag(Layer::Direction)),
            Err(ShapeError::TooFewPolygonPoints(2))
        );
    }

    #[test]
    fn test_rectangle_hit_test_with_reversed_corners() {
        let shape = Shape::rectangle(1, Point::new(50.0, 80.0), Point::new(10.0, 10.0), tag(Layer::Direction));
        assert!(shape.contains(Point::new(30.0, 40.0)));
        assert!(shape.contains(Point::new(10.0, 10.0)));
        assert!(!shape.contains(Point::new(60.0, 40.0)));
    }

    #[test]
    fn test_polygon_hit_test() {
        let points = vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(0.0, 100.0)];
        let shape = Shape::polygon(1, points, tag(Layer::Violation)).unwrap();
        assert!(shape.contains(Point::new(10.0, 10.0)));
        // Inside the bounds but outside the triangle.
        assert!(!shape.contains(Point::new(90.0, 90.0)));
    }

    #[test]
    fn test_validate_rejects_bad_rectangle() {
        let mut shape = Shape::rectangle(1, Point::new(0.0, 0.0), Point::new(1.0, 1.0), tag(Layer::Direction));
        shape.points.push(Point::new(2.0, 2.0));
        assert_eq!(shape.validate(), Err(ShapeError::RectanglePoints(3)));
    }

    #[test]
    fn test_direction_filter() {
        let mut shape = Shape::rectangle(1, Point::new(0.0, 0.0), Point::new(1.0, 1.0), tag(Layer::Direction));
        assert!(shape.matches_direction(Some("north")));
        assert!(!shape.matches_direction(Some("south")));
        assert!(shape.matches_direction(None));

        shape.direction = None;
        assert!(shape.matches_direction(Some("south")));
    }

    #[test]
    fn test_serialized_type_field() {
        let shape = Shape::rectangle(7, Point::new(0.0, 0.0), Point::new(1.0, 1.0), tag(Layer::Direction));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["layer"], "direction");
        assert!(json.get("violation_type").is_none());
    }
}
