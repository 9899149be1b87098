// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PTZ preset storage.
//!
//! Presets are kept per intersection, and sub-presets per intersection and
//! mask. Every change goes through [`PresetStore::dispatch`] so edits are
//! applied strictly in the order they were issued.

use crate::config::PresetLimits;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A named pan/tilt/zoom/focus position for a PTZ camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub pan: f64,
    pub tilt: f64,
    pub zoom: f64,
    pub focus: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl Preset {
    /// A blank preset at the home position.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            pan: 0.0,
            tilt: 0.0,
            zoom: 1.0,
            focus: 0.0,
            direction: None,
        }
    }
}

/// Reasons a preset form is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    #[error("preset name is required")]
    EmptyName,
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("a preset named '{0}' already exists")]
    DuplicateName(String),
    #[error("preset id '{id}' appears more than once in {bucket}")]
    DuplicateId { bucket: String, id: String },
}

/// Check a draft preset against the limits and the bucket it is going into.
///
/// A preset may keep its own name when it is updated in place.
pub fn validate_preset(
    preset: &Preset,
    bucket: &[Preset],
    limits: &PresetLimits,
) -> Result<(), PresetError> {
    let name = preset.name.trim();
    if name.is_empty() {
        return Err(PresetError::EmptyName);
    }

    let fields = [
        ("pan", preset.pan, limits.pan),
        ("tilt", preset.tilt, limits.tilt),
        ("zoom", preset.zoom, limits.zoom),
        ("focus", preset.focus, limits.focus),
    ];
    for (field, value, [min, max]) in fields {
        if !(min..=max).contains(&value) {
            return Err(PresetError::OutOfRange { field, value, min, max });
        }
    }

    if bucket
        .iter()
        .any(|p| p.id != preset.id && p.name.trim().eq_ignore_ascii_case(name))
    {
        return Err(PresetError::DuplicateName(name.to_string()));
    }

    Ok(())
}

/// A single change to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetAction {
    Upsert {
        intersection: String,
        preset: Preset,
    },
    Remove {
        intersection: String,
        preset_id: String,
    },
    UpsertSub {
        intersection: String,
        mask: String,
        preset: Preset,
    },
    RemoveSub {
        intersection: String,
        mask: String,
        preset_id: String,
    },
}

/// Presets keyed by intersection, and sub-presets keyed by intersection and mask.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetStore {
    #[serde(default)]
    presets: BTreeMap<String, Vec<Preset>>,
    #[serde(default)]
    sub_presets: BTreeMap<String, BTreeMap<String, Vec<Preset>>>,
}

/// First id that occurs twice in a bucket.
fn duplicate_id(bucket: &[Preset]) -> Option<&str> {
    let mut seen = HashSet::new();
    bucket
        .iter()
        .map(|p| p.id.as_str())
        .find(|id| !seen.insert(*id))
}

/// Replace the entry with the same id, or append.
fn upsert(bucket: &mut Vec<Preset>, preset: Preset) {
    match bucket.iter_mut().find(|p| p.id == preset.id) {
        Some(existing) => *existing = preset,
        None => bucket.push(preset),
    }
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: PresetAction) {
        match action {
            PresetAction::Upsert { intersection, preset } => {
                self.add_or_update_preset(&intersection, preset)
            }
            PresetAction::Remove {
                intersection,
                preset_id,
            } => self.remove_preset(&intersection, &preset_id),
            PresetAction::UpsertSub {
                intersection,
                mask,
                preset,
            } => self.add_or_update_sub_preset(&intersection, &mask, preset),
            PresetAction::RemoveSub {
                intersection,
                mask,
                preset_id,
            } => self.remove_sub_preset(&intersection, &mask, &preset_id),
        }
    }

    pub fn add_or_update_preset(&mut self, intersection: &str, preset: Preset) {
        log::info!("Upserting preset {} for intersection {}", preset.id, intersection);
        upsert(self.presets.entry(intersection.to_string()).or_default(), preset);
    }

    /// Remove a preset. Absent ids are ignored.
    pub fn remove_preset(&mut self, intersection: &str, preset_id: &str) {
        if let Some(bucket) = self.presets.get_mut(intersection) {
            bucket.retain(|p| p.id != preset_id);
        }
    }

    pub fn add_or_update_sub_preset(&mut self, intersection: &str, mask: &str, preset: Preset) {
        log::info!(
            "Upserting sub-preset {} for intersection {} mask {}",
            preset.id,
            intersection,
            mask
        );
        let masks = self.sub_presets.entry(intersection.to_string()).or_default();
        upsert(masks.entry(mask.to_string()).or_default(), preset);
    }

    /// Remove a sub-preset. Absent ids are ignored.
    pub fn remove_sub_preset(&mut self, intersection: &str, mask: &str, preset_id: &str) {
        if let Some(bucket) = self
            .sub_presets
            .get_mut(intersection)
            .and_then(|masks| masks.get_mut(mask))
        {
            bucket.retain(|p| p.id != preset_id);
        }
    }

    /// Presets for an intersection, in insertion order.
    pub fn presets(&self, intersection: &str) -> &[Preset] {
        self.presets.get(intersection).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sub-presets for an intersection and mask, in insertion order.
    pub fn sub_presets(&self, intersection: &str, mask: &str) -> &[Preset] {
        self.sub_presets
            .get(intersection)
            .and_then(|masks| masks.get(mask))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Copy of the store keeping only sub-presets whose mask passes `keep`.
    pub fn retain_masks(&self, keep: impl Fn(&str) -> bool) -> Self {
        let sub_presets = self
            .sub_presets
            .iter()
            .map(|(intersection, masks)| {
                let masks = masks
                    .iter()
                    .filter(|(mask, _)| keep(mask))
                    .map(|(mask, bucket)| (mask.clone(), bucket.clone()))
                    .collect();
                (intersection.clone(), masks)
            })
            .collect();
        Self {
            presets: self.presets.clone(),
            sub_presets,
        }
    }

    /// Reject stores where an id repeats inside one bucket (hand-edited or merged files).
    pub fn validate(&self) -> Result<(), PresetError> {
        for (intersection, bucket) in &self.presets {
            if let Some(id) = duplicate_id(bucket) {
                return Err(PresetError::DuplicateId {
                    bucket: format!("intersection {}", intersection),
                    id: id.to_string(),
                });
            }
        }
        for (intersection, masks) in &self.sub_presets {
            for (mask, bucket) in masks {
                if let Some(id) = duplicate_id(bucket) {
                    return Err(PresetError::DuplicateId {
                        bucket: format!("intersection {} mask {}", intersection, mask),
                        id: id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Next unused `preset-N` id within a bucket.
    pub fn fresh_id(bucket: &[Preset]) -> String {
        let next = bucket
            .iter()
            .filter_map(|p| p.id.strip_prefix("preset-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);
        format!("preset-{}", next)
    }
}
