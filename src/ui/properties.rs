// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone properties panel.
//!
//! Lists the zones of the open intersection and shows the selected zone's
//! tag, geometry and a rename field.

use crate::editor::ZoneEditor;
use crate::models::shape::ShapeKind;

pub enum PropertiesAction {
    None,
    Select(u64),
    Delete(u64),
    Rename(u64, String),
}

/// Rename buffer, kept across frames.
#[derive(Default)]
pub struct PropertiesPanel {
    rename_target: Option<u64>,
    rename_buffer: String,
}

impl PropertiesPanel {
    pub fn show(&mut self, ui: &mut egui::Ui, editor: &ZoneEditor) -> PropertiesAction {
        let mut action = PropertiesAction::None;

        ui.heading("Zones");
        ui.separator();

        if editor.shapes().is_empty() {
            ui.label(egui::RichText::new("No zones drawn yet").weak());
        }

        egui::ScrollArea::vertical()
            .id_source("zone_list")
            .max_height(240.0)
            .show(ui, |ui| {
                for shape in editor.shapes() {
                    let selected = editor.selected() == Some(shape.id);
                    let visible = editor.is_visible(shape);
                    let mut text = egui::RichText::new(&shape.name)
                        .color(egui::Color32::from_rgb(shape.color[0], shape.color[1], shape.color[2]));
                    if !visible {
                        text = text.weak();
                    }
                    ui.horizontal(|ui| {
                        // Hidden zones can be deleted from the list but not selected.
                        if ui
                            .add_enabled(visible, egui::SelectableLabel::new(selected, text))
                            .clicked()
                        {
                            action = PropertiesAction::Select(shape.id);
                        }
                        if ui.small_button("🗑").on_hover_text("Delete zone").clicked() {
                            action = PropertiesAction::Delete(shape.id);
                        }
                    });
                }
            });

        let Some(shape) = editor.selected_shape() else {
            self.rename_target = None;
            return action;
        };

        if self.rename_target != Some(shape.id) {
            self.rename_target = Some(shape.id);
            self.rename_buffer = shape.name.clone();
        }

        ui.separator();
        egui::Grid::new("zone_details").num_columns(2).show(ui, |ui| {
            ui.label("Id");
            ui.label(shape.id.to_string());
            ui.end_row();

            ui.label("Type");
            ui.label(match shape.kind {
                ShapeKind::Rectangle => "Rectangle",
                ShapeKind::Polygon => "Polygon",
            });
            ui.end_row();

            ui.label("Layer");
            ui.label(shape.layer.label());
            ui.end_row();

            ui.label("Direction");
            ui.label(shape.direction.as_deref().unwrap_or("-"));
            ui.end_row();

            ui.label("Violation");
            ui.label(shape.violation_type.as_deref().unwrap_or("-"));
            ui.end_row();

            ui.label("Points");
            ui.label(shape.points.len().to_string());
            ui.end_row();
        });

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.rename_buffer);
            let changed = !self.rename_buffer.trim().is_empty() && self.rename_buffer != shape.name;
            if ui.add_enabled(changed, egui::Button::new("Rename")).clicked() {
                action = PropertiesAction::Rename(shape.id, self.rename_buffer.trim().to_string());
            }
        });

        ui.collapsing("Vertices", |ui| {
            for (i, p) in shape.points.iter().enumerate() {
                ui.monospace(format!("{:>2}: ({:.1}, {:.1})", i, p.x, p.y));
            }
        });

        action
    }
}
