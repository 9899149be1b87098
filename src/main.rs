// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Intersection Calibrator
//!
//! A desktop tool for calibrating traffic-violation cameras: draw direction
//! and violation zones over a camera frame and manage PTZ presets per
//! intersection and per zone.
//!
//! Usage: `intersection-calibrator [config.yaml]`

mod app;
mod config;
mod editor;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::CalibratorApp;
use config::AppConfig;
use std::path::PathBuf;

fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::resolve(config_path.as_deref())?;

    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    log::info!(
        "Starting with {} intersections, {} directions",
        config.intersections.len(),
        config.directions.len()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 860.0])
            .with_min_inner_size([960.0, 600.0])
            .with_title("Intersection Calibrator"),
        ..Default::default()
    };

    eframe::run_native(
        "Intersection Calibrator",
        options,
        Box::new(|_cc| Ok(Box::new(CalibratorApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
