// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides hit-testing helpers and the coordinate transforms
//! between screen positions and zoom-independent canvas coordinates.

use crate::models::shape::Point;

/// Axis-aligned bounding box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box enclosing every point, or `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Corners clockwise from the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

/// Even-odd ray-cast point-in-polygon test.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Convert a position relative to the canvas origin into canvas coordinates.
pub fn screen_to_canvas(rel_x: f64, rel_y: f64, zoom: f64) -> Point {
    Point {
        x: rel_x / zoom,
        y: rel_y / zoom,
    }
}

/// Convert canvas coordinates into a position relative to the canvas origin.
pub fn canvas_to_screen(point: &Point, zoom: f64) -> (f64, f64) {
    (point.x * zoom, point.y * zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_canvas_roundtrip() {
        let zoom = 1.5;
        let canvas = screen_to_canvas(150.0, 300.0, zoom);
        assert!((canvas.x - 100.0).abs() < 0.0001);
        assert!((canvas.y - 200.0).abs() < 0.0001);

        let (sx, sy) = canvas_to_screen(&canvas, zoom);
        assert!((sx - 150.0).abs() < 0.0001);
        assert!((sy - 300.0).abs() < 0.0001);
    }

    #[test]
    fn test_bounds_enclosing() {
        assert!(Bounds::enclosing(&[]).is_none());

        let bounds = Bounds::enclosing(&[
            Point::new(50.0, 10.0),
            Point::new(10.0, 80.0),
            Point::new(30.0, 5.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Point::new(10.0, 5.0));
        assert_eq!(bounds.max, Point::new(50.0, 80.0));
        assert!(bounds.contains(Point::new(50.0, 80.0)));
        assert!(!bounds.contains(Point::new(50.1, 80.0)));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upward
        let u = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 40.0),
            Point::new(0.0, 40.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(point_in_polygon(Point::new(15.0, 35.0), &u));
        assert!(!point_in_polygon(Point::new(15.0, 10.0), &u));
        assert!(!point_in_polygon(Point::new(50.0, 10.0), &u));
    }

    #[test]
    fn test_degenerate_polygon_never_contains() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &line));
    }
}
