// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the calibrator.

pub mod canvas;
pub mod notifications;
pub mod presets;
pub mod properties;
pub mod toolbar;
