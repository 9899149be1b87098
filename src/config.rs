// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Loaded from a YAML file; every section falls back to built-in defaults so
//! a partial file is enough.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "calibrator.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub intersections: Vec<IntersectionConfig>,
    pub directions: Vec<String>,
    pub violation_types: Vec<String>,
    pub canvas: CanvasConfig,
    pub presets: PresetLimits,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionConfig {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub default_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub zoom_step: f32,
}

/// Allowed ranges for preset values, plus the "test preset" flag duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetLimits {
    pub pan: [f64; 2],
    pub tilt: [f64; 2],
    pub zoom: [f64; 2],
    pub focus: [f64; 2],
    pub test_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            intersections: vec![
                IntersectionConfig {
                    id: "INT-001".to_string(),
                    name: "Main St & 1st Ave".to_string(),
                },
                IntersectionConfig {
                    id: "INT-002".to_string(),
                    name: "Harbor Rd & Station Blvd".to_string(),
                },
            ],
            directions: ["north", "south", "east", "west"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            violation_types: ["red_light", "speeding", "wrong_way", "illegal_turn", "no_stopping"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            canvas: CanvasConfig::default(),
            presets: PresetLimits::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 0.25,
        }
    }
}

impl Default for PresetLimits {
    fn default() -> Self {
        Self {
            pan: [-180.0, 180.0],
            tilt: [-90.0, 90.0],
            zoom: [1.0, 30.0],
            focus: [0.0, 100.0],
            test_duration_ms: 2000,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 3000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, else the default file if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.intersections.is_empty() {
            bail!("at least one intersection must be configured");
        }
        if self.directions.is_empty() {
            bail!("at least one direction must be configured");
        }

        let c = &self.canvas;
        if !(c.min_zoom > 0.0 && c.min_zoom <= c.max_zoom) {
            bail!("canvas zoom bounds must satisfy 0 < min_zoom <= max_zoom");
        }
        if !(c.min_zoom..=c.max_zoom).contains(&c.default_zoom) {
            bail!("canvas default_zoom must lie within [min_zoom, max_zoom]");
        }
        if c.zoom_step <= 0.0 {
            bail!("canvas zoom_step must be positive");
        }

        let p = &self.presets;
        for (field, [min, max]) in [("pan", p.pan), ("tilt", p.tilt), ("zoom", p.zoom), ("focus", p.focus)] {
            if min > max {
                bail!("preset {} range is inverted: [{}, {}]", field, min, max);
            }
        }
        Ok(())
    }

    pub fn intersection_name(&self, id: &str) -> Option<&str> {
        self.intersections
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
directions: [northbound, southbound]
canvas:
  max_zoom: 8.0
logging:
  level: debug
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.directions, vec!["northbound", "southbound"]);
        assert_eq!(config.canvas.max_zoom, 8.0);
        assert_eq!(config.canvas.min_zoom, 0.25);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.intersections.len(), 2);
        assert_eq!(config.intersection_name("INT-001"), Some("Main St & 1st Ave"));
    }

    #[test]
    fn test_rejects_bad_zoom_bounds() {
        let yaml = "canvas:\n  min_zoom: 2.0\n  max_zoom: 1.0\n";
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_empty_directions() {
        assert!(AppConfig::from_yaml("directions: []\n").is_err());
    }

    #[test]
    fn test_rejects_inverted_preset_range() {
        assert!(AppConfig::from_yaml("presets:\n  tilt: [90.0, -90.0]\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibrator.yaml");
        std::fs::write(&path, "intersections:\n  - id: X1\n    name: Test Junction\n").unwrap();

        let config = AppConfig::resolve(Some(path.as_path())).unwrap();
        assert_eq!(config.intersections.len(), 1);
        assert_eq!(config.intersections[0].id, "X1");
    }
}
