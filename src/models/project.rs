// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Calibration project state.
//!
//! Everything that gets exported for an intersection: the background frame
//! reference, the drawn zones and the preset store.

use super::preset::{PresetError, PresetStore};
use super::shape::{Shape, ShapeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a loaded project is refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error("zone id {0} leaves no room for new zone ids")]
    IdOverflow(u64),
}

/// Complete calibration data for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProject {
    pub intersection_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default)]
    pub frame_width: u32,
    #[serde(default)]
    pub frame_height: u32,
    #[serde(default)]
    pub next_shape_id: u64,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub presets: PresetStore,
}

impl CalibrationProject {
    /// Create an empty project for an intersection.
    pub fn new(intersection_id: impl Into<String>) -> Self {
        Self {
            intersection_id: intersection_id.into(),
            background_image: None,
            frame_width: 0,
            frame_height: 0,
            next_shape_id: 1,
            shapes: Vec::new(),
            presets: PresetStore::new(),
        }
    }

    /// Check every shape and the preset store, then repair the id counter so
    /// new ids never collide.
    pub fn validate(&mut self) -> Result<(), ProjectError> {
        for shape in &self.shapes {
            shape.validate()?;
        }
        self.presets.validate()?;

        let max_id = self.shapes.iter().map(|s| s.id).max().unwrap_or(0);
        let after_max = max_id
            .checked_add(1)
            .ok_or(ProjectError::IdOverflow(max_id))?;
        self.next_shape_id = self.next_shape_id.max(after_max);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::shape::{Layer, Point, ShapeTag};

    #[test]
    fn test_validate_bumps_next_id() {
        let mut project = CalibrationProject::new("INT-001");
        project.next_shape_id = 0;
        project.shapes.push(Shape::rectangle(
            41,
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            ShapeTag::default(),
        ));
        project.validate().unwrap();
        assert_eq!(project.next_shape_id, 42);
    }

    #[test]
    fn test_validate_rejects_broken_polygon() {
        let mut project = CalibrationProject::new("INT-001");
        let mut shape = Shape::polygon(
            1,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
            ShapeTag {
                layer: Layer::Violation,
                ..ShapeTag::default()
            },
        )
        .unwrap();
        shape.points.truncate(2);
        project.shapes.push(shape);
        assert_eq!(
            project.validate(),
            Err(ProjectError::Shape(ShapeError::TooFewPolygonPoints(2)))
        );
    }

    #[test]
    fn test_validate_rejects_max_shape_id() {
        let mut project = CalibrationProject::new("INT-001");
        project.shapes.push(Shape::rectangle(
            u64::MAX,
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            ShapeTag::default(),
        ));
        assert_eq!(project.validate(), Err(ProjectError::IdOverflow(u64::MAX)));
    }

    #[test]
    fn test_validate_rejects_duplicate_preset_ids() {
        let json = r#"{
            "intersection_id": "I",
            "presets": {
                "presets": {
                    "I": [
                        {"id": "preset-1", "name": "A", "pan": 0.0, "tilt": 0.0, "zoom": 1.0, "focus": 0.0},
                        {"id": "preset-1", "name": "B", "pan": 5.0, "tilt": 0.0, "zoom": 1.0, "focus": 0.0}
                    ]
                }
            }
        }"#;
        let mut project: CalibrationProject = serde_json::from_str(json).unwrap();
        assert!(matches!(
            project.validate(),
            Err(ProjectError::Preset(PresetError::DuplicateId { .. }))
        ));
    }
}
