// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module wires the video source, the view state machine and the
//! submission pipeline to the egui panels. Slow work (probing media,
//! talking to the service) runs on background threads and is collected
//! through channels once per frame.

use crate::config::AppConfig;
use crate::io::media::{LoadedFrame, LoadedMedia, MediaTools, Players};
use crate::io::source::{VideoFile, VideoSource};
use crate::models::analysis::AnalysisResult;
use crate::models::view::{Panel, SubmissionTicket, ViewController};
use crate::net::pipeline::{SubmissionPipeline, SubmissionTask};
use crate::net::retrieval;
use crate::net::transport::AnalysisTransport;
use crate::ui::canvas::{self, CanvasAction, CanvasView};
use crate::ui::result::{self, ResultAction, RetrievalStatus};
use crate::ui::toolbar::{self, Controls, ToolbarAction};
use crate::util::geometry::Size;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v"];

/// Result of background media loading, tagged with the handle it was
/// started for.
struct MediaLoad {
    handle_id: u64,
    result: Result<LoadedMedia, String>,
}

/// Result of background retrieval of a processed video.
struct Retrieved {
    resource_id: String,
    result: Result<(PathBuf, Option<LoadedFrame>), String>,
}

/// What the central panel reported this frame.
enum PanelOutput {
    None,
    Canvas(canvas::CanvasOutput),
    Result(ResultAction),
}

/// Main application state.
pub struct RoiScanApp {
    config: AppConfig,
    media: MediaTools,
    source: VideoSource,
    view: ViewController,
    pipeline: SubmissionPipeline,
    players: Players,

    /// Downloads of processed videos
    storage_dir: PathBuf,

    /// Receiver for background probing of the selected video
    media_loader: Option<Receiver<MediaLoad>>,

    /// First frame of the selected video
    preview: Option<egui::TextureHandle>,

    /// Size of the drawing overlay as last rendered
    overlay_size: Option<Size>,

    /// The single in-flight submission
    submission: Option<(SubmissionTicket, SubmissionTask)>,

    retrieval: Option<Receiver<Retrieved>>,
    retrieval_status: RetrievalStatus,
    processed_preview: Option<egui::TextureHandle>,
}

impl RoiScanApp {
    pub fn new(config: AppConfig, transport: Arc<dyn AnalysisTransport>) -> Self {
        Self {
            media: MediaTools::new(&config.tools),
            config,
            source: VideoSource::new(),
            view: ViewController::new(),
            pipeline: SubmissionPipeline::new(transport),
            players: Players::new(),
            storage_dir: retrieval::storage_dir(),
            media_loader: None,
            preview: None,
            overlay_size: None,
            submission: None,
            retrieval: None,
            retrieval_status: RetrievalStatus::Pending,
            processed_preview: None,
        }
    }

    /// Select a video file, replacing whatever was loaded before.
    fn open_video(&mut self, path: PathBuf) {
        let handle = self.source.select(VideoFile::from_path(&path));
        log::debug!("Playable handle {}", handle.url());
        let handle_id = handle.id();
        self.view.video_selected();

        self.preview = None;
        self.overlay_size = None;
        self.retrieval = None;
        self.discard_processed();
        self.processed_preview = None;

        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        let media = self.media.clone();

        std::thread::spawn(move || {
            let result = media.load(&path).map_err(|e| format!("{e:#}"));
            let _ = sender.send(MediaLoad { handle_id, result });
        });
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.media_loader else {
            return;
        };
        let load = match receiver.try_recv() {
            Ok(load) => load,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                log::error!("Media loader stopped without a result");
                self.media_loader = None;
                return;
            }
        };
        self.media_loader = None;

        if !self.source.is_current(load.handle_id) {
            log::debug!("Discarding media loaded for revoked handle {}", load.handle_id);
            return;
        }

        match load.result {
            Ok(media) => {
                self.source.set_dimensions(load.handle_id, media.info.size());
                self.preview = Some(frame_texture(ctx, "video_preview", &media.frame));
            }
            Err(e) => {
                // Dimensions stay unknown, so submission stays gated.
                log::error!("Failed to read video: {}", e);
            }
        }
    }

    fn start_submission(&mut self) {
        if self.submission.is_some() {
            log::debug!("Submit ignored, a submission is already in flight");
            return;
        }

        let ticket = match self.view.begin_submit() {
            Ok(ticket) => ticket,
            Err(e) => {
                log::warn!("Submission rejected: {}", e);
                return;
            }
        };

        match self.pipeline.spawn(
            &self.source,
            self.view.polygons(),
            self.overlay_size,
            self.source.dimensions(),
        ) {
            Ok(task) => self.submission = Some((ticket, task)),
            Err(e) => {
                self.view.finish_submit(ticket, Err(e));
            }
        }
    }

    fn poll_submission(&mut self) {
        let Some((ticket, task)) = self.submission.as_mut() else {
            return;
        };
        let Some(outcome) = task.poll() else {
            return;
        };
        let ticket = *ticket;
        self.submission = None;

        let succeeded = outcome.as_ref().ok().cloned();
        if self.view.finish_submit(ticket, outcome) {
            if let Some(result) = succeeded {
                self.start_retrieval(&result);
            }
        }
    }

    fn start_retrieval(&mut self, result: &AnalysisResult) {
        let url = self.config.service.video_url(&result.resource_id);
        let resource_id = result.resource_id.clone();
        let transport = self.pipeline.transport();
        let media = self.media.clone();
        let dir = self.storage_dir.clone();

        let (sender, receiver) = channel();
        self.retrieval = Some(receiver);
        self.discard_processed();
        self.processed_preview = None;

        std::thread::spawn(move || {
            let result = retrieval::retrieve(transport.as_ref(), &url, &resource_id, &dir)
                .map(|path| {
                    let frame = media
                        .extract_preview(&path)
                        .map_err(|e| log::warn!("No preview for processed video: {e:#}"))
                        .ok();
                    (path, frame)
                })
                .map_err(|e| e.to_string());
            let _ = sender.send(Retrieved {
                resource_id,
                result,
            });
        });
    }

    fn poll_retrieval(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.retrieval else {
            return;
        };
        let retrieved = match receiver.try_recv() {
            Ok(retrieved) => retrieved,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.retrieval = None;
                self.retrieval_status =
                    RetrievalStatus::Unconfirmed("retrieval stopped without a result".to_string());
                return;
            }
        };
        self.retrieval = None;

        let current = self.view.result().map(|r| r.resource_id.as_str());
        if current != Some(retrieved.resource_id.as_str()) {
            return;
        }

        match retrieved.result {
            Ok((path, frame)) => {
                self.processed_preview =
                    frame.map(|frame| frame_texture(ctx, "processed_preview", &frame));
                self.retrieval_status = RetrievalStatus::Ready(path);
            }
            Err(e) => {
                log::warn!("Processed video not retrievable: {}", e);
                self.retrieval_status = RetrievalStatus::Unconfirmed(e);
            }
        }
    }

    /// Forget the downloaded processed video and delete its file.
    fn discard_processed(&mut self) {
        let status = std::mem::replace(&mut self.retrieval_status, RetrievalStatus::Pending);
        if let RetrievalStatus::Ready(path) = status {
            if let Err(e) = retrieval::discard(&path) {
                log::warn!("Failed to remove {}: {}", path.display(), e);
            }
        }
    }

    fn play(&mut self, target: &str) {
        match self.media.play(target) {
            Ok(child) => {
                log::info!("Playing {}", target);
                self.players.track(child);
            }
            Err(e) => log::error!("Failed to start playback: {:#}", e),
        }
    }

    fn play_processed(&mut self) {
        // Prefer the downloaded copy; fall back to the URL.
        let target = match (&self.retrieval_status, self.view.result()) {
            (RetrievalStatus::Ready(path), _) => path.to_string_lossy().into_owned(),
            (_, Some(result)) => self.config.service.video_url(&result.resource_id),
            _ => return,
        };
        self.play(&target);
    }

    fn pick_video(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Videos", VIDEO_EXTENSIONS)
            .pick_file()
        {
            self.open_video(path);
        }
    }

    fn controls(&self) -> Controls {
        Controls::gather(
            &self.view,
            &self.source,
            self.overlay_size,
            self.submission.is_some(),
        )
    }

    fn is_busy(&self) -> bool {
        self.media_loader.is_some() || self.submission.is_some() || self.retrieval.is_some()
    }
}

fn frame_texture(ctx: &egui::Context, name: &str, frame: &LoadedFrame) -> egui::TextureHandle {
    let size = [frame.width as usize, frame.height as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
    ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
}

fn show_welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("People Counting")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Open a video, outline the regions to analyze, then apply the analytic")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Video...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}

impl eframe::App for RoiScanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_media(ctx);
        self.poll_submission();
        self.poll_retrieval(ctx);
        let players = self.players.reap();

        if self.is_busy() {
            ctx.request_repaint();
        } else if players > 0 {
            // Keep reaping while playback windows are open.
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        // Top menu bar
        let mut open_requested = false;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Video...").clicked() {
                        open_requested = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let controls = self.controls();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &controls))
            .inner;

        match toolbar_action {
            ToolbarAction::OpenVideo => open_requested = true,
            ToolbarAction::StartDrawing => {
                if let Err(e) = self.view.start_drawing() {
                    log::debug!("{}", e);
                }
            }
            ToolbarAction::Submit => self.start_submission(),
            ToolbarAction::PlayOriginal => {
                if let Some(target) = self.source.file().map(|f| f.path.to_string_lossy().into_owned()) {
                    self.play(&target);
                }
            }
            ToolbarAction::None => {}
        }

        if open_requested {
            self.pick_video();
        }

        // User-facing notice
        let mut dismiss = false;
        if let Some(notice) = self.view.notice() {
            egui::TopBottomPanel::bottom("notice").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(notice).color(egui::Color32::from_rgb(230, 90, 80)));
                    if ui.small_button("Dismiss").clicked() {
                        dismiss = true;
                    }
                });
            });
        }
        if dismiss {
            self.view.dismiss_notice();
        }

        // Main area: exactly one panel
        let panel = self.view.active_panel();
        let output = egui::CentralPanel::default()
            .show(ctx, |ui| match panel {
                Panel::Upload => {
                    show_welcome(ui);
                    PanelOutput::None
                }
                Panel::RawVideo | Panel::DrawingOverlay => {
                    let overlay = panel == Panel::DrawingOverlay;
                    let view = CanvasView {
                        texture: self.preview.as_ref(),
                        placeholder: if self.media_loader.is_some() {
                            "Loading video..."
                        } else {
                            "This video could not be read"
                        },
                        video_size: self.source.dimensions(),
                        polygons: overlay.then(|| self.view.polygons()),
                        open_polygon: self.view.has_open_polygon(),
                        interactive: self.view.accepts_pointer(),
                    };
                    PanelOutput::Canvas(canvas::show(ui, &view))
                }
                Panel::ProcessedVideo => match self.view.result() {
                    Some(analysis) => {
                        let url = self.config.service.video_url(&analysis.resource_id);
                        PanelOutput::Result(result::show(
                            ui,
                            &url,
                            &self.retrieval_status,
                            self.processed_preview.as_ref(),
                        ))
                    }
                    None => PanelOutput::None,
                },
            })
            .inner;

        self.overlay_size = None;
        match output {
            PanelOutput::Canvas(out) => {
                self.overlay_size = out.overlay_size;
                match out.action {
                    CanvasAction::Press(point) => self.view.pointer_pressed(point),
                    CanvasAction::Move(point) => self.view.pointer_moved(point),
                    CanvasAction::Release => self.view.pointer_released(),
                    CanvasAction::None => {}
                }
            }
            PanelOutput::Result(ResultAction::Play) => self.play_processed(),
            PanelOutput::Result(ResultAction::None) | PanelOutput::None => {}
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.source.release();
        self.players.stop_all();
        if let Err(e) = retrieval::clear(&self.storage_dir) {
            log::warn!("Failed to remove {}: {}", self.storage_dir.display(), e);
        }
        log::info!("Released video source on exit");
    }
}
