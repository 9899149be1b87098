// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for background frames and calibration project files.

pub mod media;
pub mod serialization;
