// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the ROISCAN application.

pub mod canvas;
pub mod result;
pub mod toolbar;
