// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PTZ preset panel.
//!
//! Lists presets for the current intersection (or sub-presets for the
//! selected zone), edits one preset at a time in a form, and flags a preset
//! briefly while it is being "tested".

use crate::config::AppConfig;
use crate::models::preset::{Preset, PresetAction, PresetStore};
use crate::models::shape::Shape;
use std::time::{Duration, Instant};

/// Edit requested from the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PresetCommand {
    Save { mask: Option<String>, preset: Preset },
    Delete { mask: Option<String>, preset_id: String },
}

impl PresetCommand {
    /// Turn the request into a store action for an intersection.
    pub fn into_action(self, intersection: &str) -> PresetAction {
        let intersection = intersection.to_string();
        match self {
            PresetCommand::Save { mask: None, preset } => PresetAction::Upsert {
                intersection,
                preset,
            },
            PresetCommand::Save {
                mask: Some(mask),
                preset,
            } => PresetAction::UpsertSub {
                intersection,
                mask,
                preset,
            },
            PresetCommand::Delete {
                mask: None,
                preset_id,
            } => PresetAction::Remove {
                intersection,
                preset_id,
            },
            PresetCommand::Delete {
                mask: Some(mask),
                preset_id,
            } => PresetAction::RemoveSub {
                intersection,
                mask,
                preset_id,
            },
        }
    }

    pub fn mask(&self) -> Option<&str> {
        match self {
            PresetCommand::Save { mask, .. } | PresetCommand::Delete { mask, .. } => mask.as_deref(),
        }
    }
}

/// Visual "testing" flag that clears itself after a fixed time.
#[derive(Debug)]
pub struct TestFlag {
    active: Option<(String, Instant)>,
    duration: Duration,
}

impl TestFlag {
    pub fn new(duration: Duration) -> Self {
        Self {
            active: None,
            duration,
        }
    }

    pub fn start(&mut self, preset_id: &str, now: Instant) {
        self.active = Some((preset_id.to_string(), now + self.duration));
    }

    /// Id of the preset being tested, if the flag has not expired.
    pub fn current(&mut self, now: Instant) -> Option<&str> {
        if matches!(&self.active, Some((_, until)) if *until <= now) {
            self.active = None;
        }
        self.active.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|(_, until)| until.saturating_duration_since(now))
    }
}

pub struct PresetPanel {
    /// Preset being edited, with the mask it belongs to
    draft: Option<(Option<String>, Preset)>,
    /// Edit sub-presets of the selected zone instead of intersection presets
    zone_scope: bool,
    testing: TestFlag,
}

impl PresetPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            draft: None,
            zone_scope: false,
            testing: TestFlag::new(Duration::from_millis(config.presets.test_duration_ms)),
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        store: &PresetStore,
        intersection: &str,
        selected_zone: Option<&Shape>,
        config: &AppConfig,
    ) -> Option<PresetCommand> {
        let mut command = None;
        let now = Instant::now();

        ui.heading("PTZ presets");
        ui.separator();

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.zone_scope, false, "Intersection");
            ui.add_enabled_ui(selected_zone.is_some(), |ui| {
                ui.selectable_value(&mut self.zone_scope, true, "Selected zone");
            });
        });

        let mask = match (self.zone_scope, selected_zone) {
            (true, Some(zone)) => Some(zone.id.to_string()),
            _ => None,
        };
        let bucket = match &mask {
            Some(mask) => store.sub_presets(intersection, mask),
            None => store.presets(intersection),
        };

        if let Some(zone) = selected_zone.filter(|_| mask.is_some()) {
            ui.label(egui::RichText::new(format!("Sub-presets for {}", zone.name)).weak());
        }

        let testing = self.testing.current(now).map(str::to_string);
        if bucket.is_empty() {
            ui.label(egui::RichText::new("No presets").weak());
        }
        for preset in bucket {
            ui.horizontal(|ui| {
                let mut label = egui::RichText::new(&preset.name);
                if testing.as_deref() == Some(preset.id.as_str()) {
                    label = label.strong().color(egui::Color32::from_rgb(90, 200, 120));
                }
                ui.label(label).on_hover_text(format!(
                    "pan {:.1}°, tilt {:.1}°, zoom {:.1}x, focus {:.0}",
                    preset.pan, preset.tilt, preset.zoom, preset.focus
                ));
                if ui.small_button("Edit").clicked() {
                    self.draft = Some((mask.clone(), preset.clone()));
                }
                if ui.small_button("Test").clicked() {
                    log::info!("Moving camera to preset {} ({})", preset.id, preset.name);
                    self.testing.start(&preset.id, now);
                }
                if ui.small_button("🗑").clicked() {
                    command = Some(PresetCommand::Delete {
                        mask: mask.clone(),
                        preset_id: preset.id.clone(),
                    });
                }
            });
        }

        if let Some(remaining) = self.testing.remaining(now) {
            ui.label(egui::RichText::new("Testing preset...").italics());
            ui.ctx().request_repaint_after(remaining);
        }

        if ui.button("➕ New preset").clicked() {
            self.draft = Some((mask.clone(), Preset::new(PresetStore::fresh_id(bucket))));
        }

        // A draft for another scope is stale once the scope changes.
        if matches!(&self.draft, Some((draft_mask, _)) if *draft_mask != mask) {
            self.draft = None;
        }

        if let Some(cmd) = self.show_form(ui, config) {
            command = Some(cmd);
        }

        command
    }

    fn show_form(&mut self, ui: &mut egui::Ui, config: &AppConfig) -> Option<PresetCommand> {
        let (mask, draft) = self.draft.as_mut()?;
        let limits = &config.presets;
        let mut command = None;
        let mut close = false;

        ui.separator();
        egui::Grid::new("preset_form").num_columns(2).show(ui, |ui| {
            ui.label("Id");
            ui.monospace(draft.id.as_str());
            ui.end_row();

            ui.label("Name");
            ui.text_edit_singleline(&mut draft.name);
            ui.end_row();

            let fields = [
                ("Pan", &mut draft.pan, limits.pan, "°"),
                ("Tilt", &mut draft.tilt, limits.tilt, "°"),
                ("Zoom", &mut draft.zoom, limits.zoom, "x"),
                ("Focus", &mut draft.focus, limits.focus, ""),
            ];
            for (label, value, [min, max], suffix) in fields {
                ui.label(label);
                ui.add(egui::DragValue::new(value).clamp_range(min..=max).speed(0.5).suffix(suffix));
                ui.end_row();
            }

            ui.label("Direction");
            egui::ComboBox::from_id_source("preset_direction")
                .selected_text(draft.direction.as_deref().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut draft.direction, None, "-");
                    for direction in &config.directions {
                        ui.selectable_value(&mut draft.direction, Some(direction.clone()), direction.as_str());
                    }
                });
            ui.end_row();
        });

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                command = Some(PresetCommand::Save {
                    mask: mask.clone(),
                    preset: draft.clone(),
                });
            }
            if ui.button("Cancel").clicked() {
                close = true;
            }
        });

        if close {
            self.draft = None;
        }
        command
    }

    /// Close the form after the app accepted a save.
    pub fn close_form(&mut self) {
        self.draft = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_routes_to_sub_preset_when_masked() {
        let preset = Preset::new("preset-1");
        let action = PresetCommand::Save {
            mask: Some("12".to_string()),
            preset: preset.clone(),
        }
        .into_action("INT-001");
        assert_eq!(
            action,
            PresetAction::UpsertSub {
                intersection: "INT-001".to_string(),
                mask: "12".to_string(),
                preset,
            }
        );

        let action = PresetCommand::Delete {
            mask: None,
            preset_id: "preset-1".to_string(),
        }
        .into_action("INT-001");
        assert_eq!(
            action,
            PresetAction::Remove {
                intersection: "INT-001".to_string(),
                preset_id: "preset-1".to_string(),
            }
        );
    }

    #[test]
    fn test_flag_clears_after_duration() {
        let mut flag = TestFlag::new(Duration::from_millis(500));
        let start = Instant::now();
        assert_eq!(flag.current(start), None);

        flag.start("preset-2", start);
        assert_eq!(flag.current(start + Duration::from_millis(499)), Some("preset-2"));
        assert_eq!(flag.current(start + Duration::from_millis(500)), None);
        assert!(flag.remaining(start + Duration::from_millis(600)).is_none());
    }

    #[test]
    fn test_restarting_flag_moves_deadline() {
        let mut flag = TestFlag::new(Duration::from_millis(100));
        let start = Instant::now();
        flag.start("a", start);
        flag.start("b", start + Duration::from_millis(80));
        assert_eq!(flag.current(start + Duration::from_millis(150)), Some("b"));
    }
}
