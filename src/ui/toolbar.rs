// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with the workflow controls.
//!
//! Which buttons are shown and enabled is decided by the view controller
//! together with what the app knows about the loaded video.

use crate::io::source::VideoSource;
use crate::models::view::ViewController;
use crate::util::geometry::Size;

/// Availability of each control this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub can_start_drawing: bool,
    pub shows_submit: bool,
    pub can_submit: bool,
    pub can_play: bool,
    pub submitting: bool,
}

impl Controls {
    /// Submitting additionally needs the overlay laid out, the video's
    /// dimensions known and no submission still running.
    pub fn gather(
        view: &ViewController,
        source: &VideoSource,
        overlay_size: Option<Size>,
        in_flight: bool,
    ) -> Self {
        let dimensions_ready = overlay_size.is_some() && source.dimensions().is_some();
        Self {
            can_start_drawing: view.can_start_drawing(),
            shows_submit: view.shows_submit(),
            can_submit: view.can_submit() && dimensions_ready && !in_flight,
            can_play: source.file().is_some(),
            submitting: view.is_submitting(),
        }
    }
}

pub enum ToolbarAction {
    None,
    OpenVideo,
    StartDrawing,
    Submit,
    PlayOriginal,
}

/// Display the toolbar and report the clicked control.
pub fn show(ui: &mut egui::Ui, controls: &Controls) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Open Video...").clicked() {
            action = ToolbarAction::OpenVideo;
        }

        if ui
            .add_enabled(controls.can_play, egui::Button::new("▶ Play"))
            .clicked()
        {
            action = ToolbarAction::PlayOriginal;
        }

        ui.separator();

        if controls.can_start_drawing && ui.button("▱ Start Drawing Polygons").clicked() {
            action = ToolbarAction::StartDrawing;
        }

        if controls.shows_submit
            && ui
                .add_enabled(controls.can_submit, egui::Button::new("⚙ Apply Analytic"))
                .clicked()
        {
            action = ToolbarAction::Submit;
        }

        if controls.submitting {
            ui.spinner();
            ui.label("Processing...");
        } else if controls.shows_submit {
            ui.separator();
            ui.label(
                egui::RichText::new("Press and drag to outline a region, release to close it")
                    .italics()
                    .weak(),
            );
        }
    });

    action
}
