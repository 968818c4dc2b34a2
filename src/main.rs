// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! ROISCAN - Region Of Interest video analytics client
//!
//! A desktop client for outlining regions of interest over a video,
//! sending them to a video analytics service and viewing the processed
//! result.

use anyhow::{Context, Result};
use roiscan::app::RoiScanApp;
use roiscan::config::AppConfig;
use roiscan::net::transport::HttpTransport;
use std::sync::Arc;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load()?;
    let transport =
        HttpTransport::new(&config.service).context("Failed to create the service client")?;

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("ROISCAN - People Counting"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ROISCAN",
        options,
        Box::new(move |_cc| Ok(Box::new(RoiScanApp::new(config, Arc::new(transport))))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
