// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: the selected video, media tools and wire formats.

pub mod media;
pub mod serialization;
pub mod source;
