// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: geometry, authoring session and view state.

pub mod analysis;
pub mod annotation;
pub mod session;
pub mod view;
