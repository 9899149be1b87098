// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for zones, presets and calibration projects.

pub mod preset;
pub mod project;
pub mod shape;
