// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Video preview and polygon drawing overlay.
//!
//! The overlay covers exactly the rectangle the video frame is drawn in,
//! and pointer positions are reported in pixels of that rectangle.

use crate::models::annotation::{CanvasSpace, Point, PolygonSet};
use crate::util::geometry::Size;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Press(Point<CanvasSpace>),
    Move(Point<CanvasSpace>),
    Release,
}

/// What the canvas should draw this frame.
pub struct CanvasView<'a> {
    pub texture: Option<&'a egui::TextureHandle>,
    /// Shown instead of the frame until a texture is available.
    pub placeholder: &'a str,
    /// Intrinsic video size, once known.
    pub video_size: Option<Size>,
    /// Polygons to overlay. `None` hides the overlay.
    pub polygons: Option<&'a PolygonSet<CanvasSpace>>,
    pub open_polygon: bool,
    pub interactive: bool,
}

pub struct CanvasOutput {
    pub action: CanvasAction,
    /// Rendered overlay size, present while the overlay is laid out.
    pub overlay_size: Option<Size>,
}

/// Display the video frame and, when requested, the drawing overlay.
pub fn show(ui: &mut egui::Ui, view: &CanvasView<'_>) -> CanvasOutput {
    let mut output = CanvasOutput {
        action: CanvasAction::None,
        overlay_size: None,
    };
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let Some(texture) = view.texture else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new(view.placeholder).color(egui::Color32::WHITE));
            });
            return;
        };

        let frame_size = view.video_size.unwrap_or_else(|| {
            let [w, h] = texture.size();
            Size::new(w as f64, h as f64)
        });
        let image_rect = fit_rect(ui.min_rect().min, ui.available_size(), frame_size);

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let Some(polygons) = view.polygons else {
            return;
        };

        let overlay = Size::new(image_rect.width() as f64, image_rect.height() as f64);
        if overlay.is_laid_out() {
            output.overlay_size = Some(overlay);
        }

        if view.interactive {
            output.action = pointer_action(ui, image_rect);
        }

        let count = polygons.len();
        for (index, polygon) in polygons.iter().enumerate() {
            let in_progress = view.open_polygon && index + 1 == count;
            let screen: Vec<egui::Pos2> = polygon
                .points()
                .iter()
                .map(|p| image_rect.min + egui::vec2(p.x as f32, p.y as f32))
                .collect();
            draw_polygon(ui.painter(), screen, in_progress);
        }
    });

    output
}

/// Aspect-preserving rectangle for a frame centered in the available area.
fn fit_rect(origin: egui::Pos2, available: egui::Vec2, frame: Size) -> egui::Rect {
    let frame_aspect = (frame.width / frame.height) as f32;
    let available_aspect = available.x / available.y;

    let (display_width, display_height) = if frame_aspect > available_aspect {
        (available.x, available.x / frame_aspect)
    } else {
        (available.y * frame_aspect, available.y)
    };

    let x_offset = (available.x - display_width) / 2.0;
    let y_offset = (available.y - display_height) / 2.0;

    egui::Rect::from_min_size(
        origin + egui::vec2(x_offset, y_offset),
        egui::vec2(display_width, display_height),
    )
}

/// Press starts a polygon, dragging extends it, release closes it.
fn pointer_action(ui: &mut egui::Ui, image_rect: egui::Rect) -> CanvasAction {
    let response = ui.allocate_rect(image_rect, egui::Sense::drag());

    // Positions outside the overlay are clamped onto its edge.
    let to_canvas = |pos: egui::Pos2| {
        let local = image_rect.clamp(pos) - image_rect.min;
        Point::new(local.x as f64, local.y as f64)
    };

    if response.drag_started() {
        let origin = ui.input(|i| i.pointer.press_origin());
        if let Some(pos) = origin.or_else(|| response.interact_pointer_pos()) {
            return CanvasAction::Press(to_canvas(pos));
        }
    }
    if response.drag_stopped() {
        return CanvasAction::Release;
    }
    if response.dragged() && response.drag_delta() != egui::Vec2::ZERO {
        if let Some(pos) = response.interact_pointer_pos() {
            return CanvasAction::Move(to_canvas(pos));
        }
    }
    CanvasAction::None
}

fn draw_polygon(painter: &egui::Painter, points: Vec<egui::Pos2>, in_progress: bool) {
    let (color, vertex_color) = if in_progress {
        (egui::Color32::LIGHT_BLUE, egui::Color32::WHITE)
    } else {
        (egui::Color32::YELLOW, egui::Color32::YELLOW)
    };

    if let Some(first) = points.first() {
        painter.circle_filled(*first, 3.0, vertex_color);
    }

    let stroke = egui::Stroke::new(2.0, color);
    if in_progress {
        painter.add(egui::Shape::line(points, stroke));
    } else {
        painter.add(egui::Shape::closed_line(points, stroke));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_frame() {
        let rect = fit_rect(egui::pos2(0.0, 0.0), egui::vec2(800.0, 800.0), Size::new(1920.0, 1080.0));
        assert_eq!(rect.width(), 800.0);
        assert!((rect.height() - 450.0).abs() < 0.01);
        assert!((rect.min.y - 175.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_tall_frame() {
        let rect = fit_rect(egui::pos2(10.0, 20.0), egui::vec2(800.0, 400.0), Size::new(1080.0, 1080.0));
        assert_eq!(rect.size(), egui::vec2(400.0, 400.0));
        assert_eq!(rect.min, egui::pos2(210.0, 20.0));
    }
}
