// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Calibration project serialization and deserialization.
//!
//! Projects are exported and imported as YAML or JSON, chosen by file
//! extension. Imported zones are checked against their point-count
//! invariants before use.

use crate::models::project::CalibrationProject;
use anyhow::{bail, Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            other => bail!("Unsupported file extension: {:?}", other),
        }
    }
}

/// Export a project, picking the format from the extension.
pub fn export_project(data: &CalibrationProject, path: &Path) -> Result<()> {
    let text = match Format::from_path(path)? {
        Format::Yaml => serde_yaml::to_string(data)?,
        Format::Json => serde_json::to_string_pretty(data)?,
    };
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Import a project, picking the format from the extension.
pub fn import_project(path: &Path) -> Result<CalibrationProject> {
    let format = Format::from_path(path)?;
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut data: CalibrationProject = match format {
        Format::Yaml => serde_yaml::from_str(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    };
    data.validate()
        .with_context(|| format!("invalid calibration in {}", path.display()))?;
    Ok(data)
}
