// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! Tool buttons, the direction/layer/violation tag applied to new zones,
//! layer visibility toggles and zoom controls.

use crate::config::AppConfig;
use crate::editor::{Tool, ZoneEditor};
use crate::models::shape::Layer;

/// Toolbar requests the app has to act on.
pub enum ToolbarAction {
    None,
    FinishPolygon,
    SaveCalibration,
    SetZoom(f32),
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, editor: &mut ZoneEditor, config: &AppConfig) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");
        ui.separator();
        for tool in Tool::ALL {
            if ui.selectable_label(editor.tool() == tool, tool.label()).clicked() {
                editor.set_tool(tool);
            }
        }

        let can_finish = editor.tool() == Tool::Polygon && !editor.polygon_points().is_empty();
        if ui
            .add_enabled(can_finish, egui::Button::new("✔ Finish"))
            .clicked()
        {
            action = ToolbarAction::FinishPolygon;
        }

        ui.separator();

        egui::ComboBox::from_id_source("direction")
            .selected_text(editor.direction.as_deref().unwrap_or("All directions"))
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut editor.direction, None, "All directions");
                for direction in &config.directions {
                    ui.selectable_value(&mut editor.direction, Some(direction.clone()), direction.as_str());
                }
            });

        ui.selectable_value(&mut editor.layer, Layer::Direction, Layer::Direction.label());
        ui.selectable_value(&mut editor.layer, Layer::Violation, Layer::Violation.label());

        ui.add_enabled_ui(editor.layer == Layer::Violation, |ui| {
            egui::ComboBox::from_id_source("violation_type")
                .selected_text(editor.violation_type.as_deref().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    for kind in &config.violation_types {
                        ui.selectable_value(&mut editor.violation_type, Some(kind.clone()), kind.as_str());
                    }
                });
        });

        ui.separator();

        ui.label("Show:");
        ui.checkbox(&mut editor.visibility.direction, "Direction");
        ui.checkbox(&mut editor.visibility.violation, "Violation");

        ui.separator();

        let canvas = &config.canvas;
        if ui.button("➖").clicked() {
            action = ToolbarAction::SetZoom(editor.zoom() - canvas.zoom_step);
        }
        ui.label(format!("{:.0}%", editor.zoom() * 100.0));
        if ui.button("➕").clicked() {
            action = ToolbarAction::SetZoom(editor.zoom() + canvas.zoom_step);
        }
        if ui.button("Reset").clicked() {
            action = ToolbarAction::SetZoom(canvas.default_zoom);
        }

        ui.separator();

        if ui.button("💾 Save calibration").clicked() {
            action = ToolbarAction::SaveCalibration;
        }
    });

    ui.label(egui::RichText::new(editor.tool().hint()).italics().weak());

    action
}
