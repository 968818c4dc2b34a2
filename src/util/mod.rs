// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Helpers with no dependency on UI state.

pub mod geometry;
