// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It routes toolbar, canvas and panel actions to the
//! zone editor and the preset store, and turns their results into toasts.

use crate::config::AppConfig;
use crate::editor::{ClickOutcome, Tool, ZoneEditor};
use crate::io::media::{self, LoadedImage};
use crate::io::serialization;
use crate::models::preset::validate_preset;
use crate::models::project::CalibrationProject;
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::notifications::Toasts;
use crate::ui::presets::{PresetCommand, PresetPanel};
use crate::ui::properties::{PropertiesAction, PropertiesPanel};
use crate::ui::toolbar::{self, ToolbarAction};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Result of background loading.
struct LoadedFrame {
    image: Option<LoadedImage>,
    image_path: Option<String>,
    project: Option<CalibrationProject>,
}

/// Main application state.
pub struct CalibratorApp {
    config: AppConfig,

    /// Zone drawing state for the open frame
    editor: ZoneEditor,

    /// Intersection tag, background reference and presets; zones live in the editor
    project: CalibrationProject,

    properties: PropertiesPanel,
    presets: PresetPanel,
    toasts: Toasts,

    /// Loaded frame texture for display
    image_texture: Option<egui::TextureHandle>,

    /// Frame dimensions (width, height)
    image_size: Option<(u32, u32)>,

    /// Receiver for background loading
    loader: Option<Receiver<Result<LoadedFrame, String>>>,

    /// Loading state message
    loading_message: Option<String>,
}

impl CalibratorApp {
    pub fn new(config: AppConfig) -> Self {
        let intersection = config
            .intersections
            .first()
            .map(|i| i.id.clone())
            .unwrap_or_default();
        Self {
            editor: ZoneEditor::new(&config),
            project: CalibrationProject::new(intersection),
            properties: PropertiesPanel::default(),
            presets: PresetPanel::new(&config),
            toasts: Toasts::new(Duration::from_millis(config.notifications.duration_ms)),
            image_texture: None,
            image_size: None,
            loader: None,
            loading_message: None,
            config,
        }
    }

    /// Current project including the editor's zones.
    ///
    /// Sub-presets of deleted zones stay in memory so undo can bring them
    /// back, but only those of live zones are exported.
    fn snapshot(&self) -> CalibrationProject {
        let shapes = self.editor.shapes().to_vec();
        let live: HashSet<String> = shapes.iter().map(|s| s.id.to_string()).collect();
        CalibrationProject {
            presets: self.project.presets.retain_masks(|mask| live.contains(mask)),
            next_shape_id: self.editor.next_id(),
            shapes,
            ..self.project.clone()
        }
    }

    fn handle_click(&mut self, outcome: ClickOutcome) {
        match outcome {
            ClickOutcome::ShapeCreated(id) => {
                if let Some(shape) = self.editor.shape(id) {
                    self.toasts.success(format!("Zone '{}' created", shape.name));
                }
            }
            ClickOutcome::Selected(id) => log::debug!("Selected zone {}", id),
            ClickOutcome::Deselected => log::debug!("Deselected zone"),
            ClickOutcome::RectangleStarted(p) => {
                log::debug!("Rectangle started at ({:.1}, {:.1})", p.x, p.y)
            }
            ClickOutcome::VertexAdded(count) => log::debug!("Polygon vertex {} added", count),
            ClickOutcome::Rejected(e) => self.toasts.error(e.to_string()),
        }
    }

    fn finish_polygon(&mut self) {
        match self.editor.finish_polygon() {
            Ok(id) => self.handle_click(ClickOutcome::ShapeCreated(id)),
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    fn save_calibration(&mut self) {
        let count = self.editor.save_calibration();
        self.toasts
            .success(format!("Calibration saved ({} zones)", count));
    }

    /// Delete a zone. Its sub-presets are kept for undo and skipped on export.
    fn delete_zone(&mut self, id: u64) {
        if let Err(e) = self.editor.delete_shape(id) {
            self.toasts.error(e.to_string());
        }
    }

    fn rename_zone(&mut self, id: u64, name: String) {
        let Some(renamed) = self.editor.shape(id).map(|s| s.renamed(name)) else {
            return;
        };
        if let Err(e) = self.editor.replace_shape(renamed) {
            self.toasts.error(e.to_string());
        }
    }

    /// Validate and apply a preset edit. Returns true when the store changed.
    fn apply_preset_command(&mut self, command: PresetCommand) -> bool {
        let intersection = self.project.intersection_id.clone();
        if let PresetCommand::Save { mask, preset } = &command {
            let bucket = match mask {
                Some(mask) => self.project.presets.sub_presets(&intersection, mask),
                None => self.project.presets.presets(&intersection),
            };
            if let Err(e) = validate_preset(preset, bucket, &self.config.presets) {
                self.toasts.error(e.to_string());
                return false;
            }
            self.toasts.success(format!("Preset '{}' saved", preset.name.trim()));
        }

        log::debug!(
            "Preset change for intersection {} (mask {:?})",
            intersection,
            command.mask()
        );
        self.project.presets.dispatch(command.into_action(&intersection));
        true
    }

    fn set_zoom(&mut self, zoom: f32) {
        let canvas = &self.config.canvas;
        self.editor.set_zoom(zoom, canvas.min_zoom, canvas.max_zoom);
    }

    /// Export the calibration to a file.
    fn export_project(&mut self, path: PathBuf) {
        match serialization::export_project(&self.snapshot(), &path) {
            Ok(()) => {
                log::info!("Exported calibration to {}", path.display());
                self.toasts.success(format!("Exported to {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to export calibration: {:#}", e);
                self.toasts.error(format!("Export failed: {}", e));
            }
        }
    }

    /// Import a calibration file and its background frame (asynchronously).
    fn import_project(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some("Loading calibration...".to_string());

        std::thread::spawn(move || {
            let result = (|| -> Result<LoadedFrame, String> {
                let project = serialization::import_project(&path)
                    .map_err(|e| format!("Failed to import {}: {:#}", path.display(), e))?;
                log::info!("Imported {} zones from {}", project.shapes.len(), path.display());

                let image = match &project.background_image {
                    Some(frame) => match media::load_image(std::path::Path::new(frame)) {
                        Ok(img) => Some(img),
                        Err(e) => {
                            log::warn!("Background frame unavailable: {:#}", e);
                            None
                        }
                    },
                    None => None,
                };

                Ok(LoadedFrame {
                    image,
                    image_path: project.background_image.clone(),
                    project: Some(project),
                })
            })();

            if sender.send(result).is_err() {
                log::debug!("Calibration import from {} superseded, result dropped", path.display());
            }
        });
    }

    /// Load a camera frame as the canvas background (asynchronously).
    fn load_frame(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.loader = Some(receiver);
        self.loading_message = Some("Loading frame...".to_string());

        std::thread::spawn(move || {
            let result = media::load_image(&path)
                .map(|img| {
                    log::info!("Loaded frame: {} ({}x{})", path.display(), img.width, img.height);
                    LoadedFrame {
                        image: Some(img),
                        image_path: Some(path.to_string_lossy().to_string()),
                        project: None,
                    }
                })
                .map_err(|e| format!("Failed to load frame: {:#}", e));

            if sender.send(result).is_err() {
                log::debug!("Frame load from {} superseded, result dropped", path.display());
            }
        });
    }

    /// Install the result of a background load.
    fn apply_loaded(&mut self, ctx: Option<&egui::Context>, loaded: LoadedFrame) {
        if let Some(mut project) = loaded.project {
            self.editor
                .load_shapes(std::mem::take(&mut project.shapes), project.next_shape_id);
            self.project = project;
            self.image_texture = None;
            self.image_size = None;
            self.toasts.success("Calibration loaded");
        }

        if let Some(img) = loaded.image {
            if let Some(ctx) = ctx {
                let size = [img.width as usize, img.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &img.pixels);
                self.image_texture =
                    Some(ctx.load_texture("camera_frame", color_image, egui::TextureOptions::LINEAR));
            }
            self.image_size = Some((img.width, img.height));
            self.project.frame_width = img.width;
            self.project.frame_height = img.height;
            self.project.background_image = loaded.image_path;
        }
    }

    fn poll_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            ctx.request_repaint();
            return;
        };

        self.loader = None;
        self.loading_message = None;
        match result {
            Ok(loaded) => self.apply_loaded(Some(ctx), loaded),
            Err(e) => {
                log::error!("{}", e);
                self.toasts.error(e);
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.editor.cancel_drawing();
            self.editor.select(None);
        }

        if ctx.wants_keyboard_input() {
            return;
        }

        if self.editor.tool() == Tool::Polygon && ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.finish_polygon();
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(id) = self.editor.selected() {
                self.delete_zone(id);
            }
        }

        // Undo (Ctrl+Z), redo (Ctrl+Shift+Z or Ctrl+Y)
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.editor.undo();
        }
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.editor.redo();
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Frame...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", media::IMAGE_EXTENSIONS)
                        .pick_file()
                    {
                        self.load_frame(path);
                    }
                    ui.close_menu();
                }
                if ui.button("Load Calibration...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Calibration", &["yaml", "yml", "json"])
                        .pick_file()
                    {
                        self.import_project(path);
                    }
                    ui.close_menu();
                }
                ui.separator();
                ui.menu_button("Export Calibration", |ui| {
                    if ui.button("Export as YAML...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("YAML", &["yaml", "yml"])
                            .set_file_name("calibration.yaml")
                            .save_file()
                        {
                            self.export_project(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export as JSON...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("JSON", &["json"])
                            .set_file_name("calibration.json")
                            .save_file()
                        {
                            self.export_project(path);
                        }
                        ui.close_menu();
                    }
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo (Ctrl+Z)"))
                    .clicked()
                {
                    self.editor.undo();
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                    .clicked()
                {
                    self.editor.redo();
                    ui.close_menu();
                }
                ui.separator();
                let selected = self.editor.selected();
                if ui
                    .add_enabled(selected.is_some(), egui::Button::new("Delete Selected"))
                    .clicked()
                {
                    if let Some(id) = selected {
                        self.delete_zone(id);
                    }
                    ui.close_menu();
                }
            });

            ui.separator();
            ui.label("Intersection:");
            let current = self
                .config
                .intersection_name(&self.project.intersection_id)
                .unwrap_or(&self.project.intersection_id)
                .to_string();
            egui::ComboBox::from_id_source("intersection")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for intersection in &self.config.intersections {
                        ui.selectable_value(
                            &mut self.project.intersection_id,
                            intersection.id.clone(),
                            intersection.name.as_str(),
                        );
                    }
                });
        });
    }
}

impl eframe::App for CalibratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ctx, ui));

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.editor, &self.config))
            .inner;
        match toolbar_action {
            ToolbarAction::FinishPolygon => self.finish_polygon(),
            ToolbarAction::SaveCalibration => self.save_calibration(),
            ToolbarAction::SetZoom(zoom) => self.set_zoom(zoom),
            ToolbarAction::None => {}
        }
        self.editor.drop_hidden_selection();

        let (properties_action, preset_command) = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                let properties = self.properties.show(ui, &self.editor);
                ui.add_space(12.0);
                let presets = self.presets.show(
                    ui,
                    &self.project.presets,
                    &self.project.intersection_id,
                    self.editor.selected_shape(),
                    &self.config,
                );
                (properties, presets)
            })
            .inner;

        match properties_action {
            PropertiesAction::Select(id) => self.editor.select(Some(id)),
            PropertiesAction::Delete(id) => self.delete_zone(id),
            PropertiesAction::Rename(id, name) => self.rename_zone(id, name),
            PropertiesAction::None => {}
        }
        if let Some(command) = preset_command {
            let saving = matches!(command, PresetCommand::Save { .. });
            if self.apply_preset_command(command) && saving {
                self.presets.close_form();
            }
        }

        self.handle_keyboard(ctx);

        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    CanvasAction::None
                } else {
                    canvas::show(ui, &self.editor, &self.image_texture, self.image_size)
                }
            })
            .inner;

        match canvas_action {
            CanvasAction::Click(point) => {
                let outcome = self.editor.click(point);
                self.handle_click(outcome);
            }
            CanvasAction::ZoomBy(factor) => self.set_zoom(self.editor.zoom() * factor),
            CanvasAction::None => {}
        }

        self.toasts.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::preset::Preset;
    use crate::models::shape::Point;

    fn app() -> CalibratorApp {
        CalibratorApp::new(AppConfig::default())
    }

    fn draw_zone(app: &mut CalibratorApp) -> u64 {
        app.editor.set_tool(Tool::Rectangle);
        app.editor.click(Point::new(10.0, 10.0));
        match app.editor.click(Point::new(50.0, 80.0)) {
            ClickOutcome::ShapeCreated(id) => id,
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    fn named(id: &str, name: &str) -> Preset {
        Preset {
            name: name.to_string(),
            ..Preset::new(id)
        }
    }

    #[test]
    fn test_snapshot_includes_editor_zones() {
        let mut app = app();
        let id = draw_zone(&mut app);
        let snapshot = app.snapshot();
        assert_eq!(snapshot.intersection_id, "INT-001");
        assert_eq!(snapshot.shapes.len(), 1);
        assert_eq!(snapshot.next_shape_id, id + 1);
    }

    #[test]
    fn test_invalid_preset_is_rejected() {
        let mut app = app();
        assert!(!app.apply_preset_command(PresetCommand::Save {
            mask: None,
            preset: named("preset-1", ""),
        }));
        assert!(app.project.presets.presets("INT-001").is_empty());
        assert_eq!(app.toasts.active().len(), 1);
    }

    #[test]
    fn test_duplicate_preset_name_is_rejected() {
        let mut app = app();
        assert!(app.apply_preset_command(PresetCommand::Save {
            mask: None,
            preset: named("preset-1", "Stop line"),
        }));
        assert!(!app.apply_preset_command(PresetCommand::Save {
            mask: None,
            preset: named("preset-2", "Stop line"),
        }));
        assert_eq!(app.project.presets.presets("INT-001").len(), 1);
    }

    #[test]
    fn test_undo_delete_restores_zone_sub_presets() {
        let mut app = app();
        let id = draw_zone(&mut app);
        let mask = id.to_string();
        assert!(app.apply_preset_command(PresetCommand::Save {
            mask: Some(mask.clone()),
            preset: named("preset-1", "Lane 1"),
        }));

        app.delete_zone(id);
        assert!(app.editor.shapes().is_empty());
        assert!(app.snapshot().presets.sub_presets("INT-001", &mask).is_empty());

        assert!(app.editor.undo());
        assert!(app.editor.shape(id).is_some());
        assert_eq!(app.project.presets.sub_presets("INT-001", &mask).len(), 1);
        assert_eq!(app.snapshot().presets.sub_presets("INT-001", &mask).len(), 1);
    }

    #[test]
    fn test_export_skips_sub_presets_of_undone_zone() {
        let mut app = app();
        assert!(app.apply_preset_command(PresetCommand::Save {
            mask: None,
            preset: named("preset-1", "Overview"),
        }));
        let id = draw_zone(&mut app);
        assert!(app.apply_preset_command(PresetCommand::Save {
            mask: Some(id.to_string()),
            preset: named("preset-1", "Lane 1"),
        }));
        assert!(app.editor.undo());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calibration.json");
        app.export_project(path.clone());
        let exported = serialization::import_project(&path).unwrap();
        assert!(exported.shapes.is_empty());
        assert!(exported.presets.sub_presets("INT-001", &id.to_string()).is_empty());
        assert_eq!(exported.presets.presets("INT-001").len(), 1);
    }

    #[test]
    fn test_exhausted_ids_become_toast() {
        let mut app = app();
        app.editor.load_shapes(Vec::new(), u64::MAX);
        app.editor.set_tool(Tool::Rectangle);
        app.editor.click(Point::new(0.0, 0.0));
        let outcome = app.editor.click(Point::new(9.0, 9.0));
        app.handle_click(outcome);
        assert!(app.editor.shapes().is_empty());
        assert_eq!(app.toasts.active().len(), 1);
    }

    #[test]
    fn test_finish_polygon_error_becomes_toast() {
        let mut app = app();
        app.editor.set_tool(Tool::Polygon);
        app.editor.click(Point::new(1.0, 1.0));
        app.finish_polygon();
        assert!(app.editor.shapes().is_empty());
        assert_eq!(app.editor.polygon_points().len(), 1);
        assert_eq!(app.toasts.active().len(), 1);
    }

    #[test]
    fn test_apply_loaded_project_replaces_zones() {
        let mut app = app();
        draw_zone(&mut app);

        let mut project = CalibrationProject::new("INT-002");
        project.next_shape_id = 9;
        app.apply_loaded(
            None,
            LoadedFrame {
                image: Some(LoadedImage {
                    width: 2,
                    height: 2,
                    pixels: vec![0; 16],
                }),
                image_path: Some("frame.png".to_string()),
                project: Some(project),
            },
        );

        assert!(app.editor.shapes().is_empty());
        assert_eq!(app.editor.next_id(), 9);
        assert_eq!(app.project.intersection_id, "INT-002");
        assert_eq!(app.image_size, Some((2, 2)));
        assert_eq!(app.project.background_image.as_deref(), Some("frame.png"));
    }

    #[test]
    fn test_zoom_respects_config_bounds() {
        let mut app = app();
        app.set_zoom(100.0);
        assert_eq!(app.editor.zoom(), app.config.canvas.max_zoom);
    }
}
