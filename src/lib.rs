// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROISCAN - Region Of Interest video analytics client
//!
//! Polygons are drawn in overlay pixels, converted to the video's native
//! pixels at submission time, and sent with the video to an analytics
//! service which answers with the name of a processed video.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod net;
pub mod ui;
pub mod util;
