// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Processed video panel.

use std::path::PathBuf;

/// Whether the processed video has been confirmed fetchable.
pub enum RetrievalStatus {
    Pending,
    Ready(PathBuf),
    /// Retrieval failed. Playback of the URL is still offered.
    Unconfirmed(String),
}

pub enum ResultAction {
    None,
    Play,
}

pub fn show(
    ui: &mut egui::Ui,
    url: &str,
    status: &RetrievalStatus,
    preview: Option<&egui::TextureHandle>,
) -> ResultAction {
    let mut action = ResultAction::None;

    ui.vertical_centered(|ui| {
        ui.heading("Processed Video");
        ui.add_space(8.0);

        if let Some(texture) = preview {
            let [w, h] = texture.size();
            let max_width = ui.available_width().min(w as f32);
            let size = egui::vec2(max_width, max_width * h as f32 / w.max(1) as f32);
            ui.add(egui::Image::new((texture.id(), size)));
        }

        ui.add_space(8.0);
        ui.label(egui::RichText::new(url).monospace());

        match status {
            RetrievalStatus::Pending => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Fetching processed video...");
                });
            }
            RetrievalStatus::Ready(path) => {
                ui.label(format!("Saved to {}", path.display()));
            }
            RetrievalStatus::Unconfirmed(reason) => {
                ui.label(
                    egui::RichText::new(format!("Could not fetch the processed video: {reason}"))
                        .color(egui::Color32::from_rgb(230, 160, 60)),
                );
            }
        }

        ui.add_space(8.0);
        if ui.button("▶ Play processed video").clicked() {
            action = ResultAction::Play;
        }
    });

    action
}
