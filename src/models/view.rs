// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! View state machine.
//!
//! The controller decides which panel is rendered, which controls are
//! available, and owns the authoring session so pointer input is only
//! accepted while drawing.

use super::analysis::AnalysisResult;
use super::annotation::{CanvasSpace, Point, PolygonSet};
use super::session::AnnotationSession;
use crate::error::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No video loaded.
    Idle,
    ReadyToDraw,
    Drawing,
    Submitting,
    Result,
}

/// The single panel rendered for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Upload,
    RawVideo,
    /// Raw video with the polygon overlay on top.
    DrawingOverlay,
    ProcessedVideo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: ViewState,
        action: &'static str,
    },
}

/// Why a submission could not start.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeginSubmitError {
    #[error(transparent)]
    Transition(#[from] ViewError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Identifies one submission. Results for an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

pub struct ViewController {
    state: ViewState,
    session: AnnotationSession,
    result: Option<AnalysisResult>,
    notice: Option<String>,
    submissions: u64,
}

impl Default for ViewController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self {
            state: ViewState::Idle,
            session: AnnotationSession::new(),
            result: None,
            notice: None,
            submissions: 0,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn polygons(&self) -> &PolygonSet<CanvasSpace> {
        self.session.polygons()
    }

    pub fn has_open_polygon(&self) -> bool {
        self.session.has_open_polygon()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Last user-facing message, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn active_panel(&self) -> Panel {
        match self.state {
            ViewState::Idle => Panel::Upload,
            ViewState::ReadyToDraw => Panel::RawVideo,
            ViewState::Drawing | ViewState::Submitting => Panel::DrawingOverlay,
            ViewState::Result => Panel::ProcessedVideo,
        }
    }

    pub fn can_start_drawing(&self) -> bool {
        self.state == ViewState::ReadyToDraw
    }

    /// The submit control is shown while drawing or submitting.
    pub fn shows_submit(&self) -> bool {
        matches!(self.state, ViewState::Drawing | ViewState::Submitting)
    }

    /// The submit control is enabled only in `Drawing` with something to send.
    pub fn can_submit(&self) -> bool {
        self.state == ViewState::Drawing && !self.session.polygons().is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.state == ViewState::Submitting
    }

    /// Pointer input reaches the session only while drawing.
    pub fn accepts_pointer(&self) -> bool {
        self.state == ViewState::Drawing
    }

    /// A new video was selected. Valid from any state; discards polygons,
    /// the previous result and any in-flight submission's outcome.
    pub fn video_selected(&mut self) {
        log::info!("Video selected while {:?}, resetting to ReadyToDraw", self.state);
        self.session.clear();
        self.result = None;
        self.notice = None;
        self.submissions += 1;
        self.state = ViewState::ReadyToDraw;
    }

    pub fn start_drawing(&mut self) -> Result<(), ViewError> {
        if self.state != ViewState::ReadyToDraw {
            return Err(self.invalid("start drawing"));
        }
        self.state = ViewState::Drawing;
        Ok(())
    }

    pub fn pointer_pressed(&mut self, point: Point<CanvasSpace>) {
        if self.accepts_pointer() {
            self.session.begin_polygon(point);
        }
    }

    pub fn pointer_moved(&mut self, point: Point<CanvasSpace>) {
        if self.accepts_pointer() {
            self.session.extend_polygon(point);
        }
    }

    pub fn pointer_released(&mut self) {
        if self.accepts_pointer() {
            self.session.end_polygon();
        }
    }

    /// Enter `Submitting`. Only valid from `Drawing`; an empty polygon set
    /// is rejected with a validation error. Either way the state is left
    /// untouched.
    pub fn begin_submit(&mut self) -> Result<SubmissionTicket, BeginSubmitError> {
        if self.state != ViewState::Drawing {
            return Err(self.invalid("submit").into());
        }
        if self.session.polygons().is_empty() {
            let err = SubmitError::Validation("no polygon drawn");
            self.surface(&err);
            return Err(err.into());
        }
        // A polygon still under the pointer is closed as it is.
        self.session.end_polygon();
        self.submissions += 1;
        self.notice = None;
        self.state = ViewState::Submitting;
        Ok(SubmissionTicket(self.submissions))
    }

    /// Deliver the outcome of a submission. Returns false if the ticket is
    /// stale and the outcome was dropped.
    pub fn finish_submit(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, SubmitError>,
    ) -> bool {
        if self.state != ViewState::Submitting || ticket.0 != self.submissions {
            log::info!("Dropping outcome of stale submission {}", ticket.0);
            return false;
        }
        match outcome {
            Ok(result) => {
                log::info!("Analysis finished: {}", result.resource_id);
                self.result = Some(result);
                self.state = ViewState::Result;
            }
            Err(err) => {
                log::error!("Submission failed: {}", err);
                self.surface(&err);
                self.state = ViewState::Drawing;
            }
        }
        true
    }

    fn surface(&mut self, err: &SubmitError) {
        if let Some(message) = err.user_message() {
            self.notice = Some(message.to_string());
        }
    }

    fn invalid(&self, action: &'static str) -> ViewError {
        ViewError::InvalidTransition {
            from: self.state,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point<CanvasSpace> {
        Point::new(x, y)
    }

    fn drawing_with_polygon() -> ViewController {
        let mut view = ViewController::new();
        view.video_selected();
        view.start_drawing().unwrap();
        view.pointer_pressed(p(0.0, 0.0));
        view.pointer_moved(p(10.0, 0.0));
        view.pointer_moved(p(10.0, 10.0));
        view.pointer_released();
        view
    }

    fn result() -> AnalysisResult {
        AnalysisResult {
            resource_id: "out.mp4".to_string(),
        }
    }

    #[test]
    fn test_happy_path_ends_in_result() {
        let mut view = drawing_with_polygon();
        let ticket = view.begin_submit().unwrap();
        assert_eq!(view.state(), ViewState::Submitting);
        assert!(!view.can_submit());

        assert!(view.finish_submit(ticket, Ok(result())));
        assert_eq!(view.state(), ViewState::Result);
        assert_eq!(view.active_panel(), Panel::ProcessedVideo);
        assert!(!view.can_start_drawing());
        assert!(!view.accepts_pointer());
        assert_eq!(view.result(), Some(&result()));
    }

    #[test]
    fn test_start_drawing_requires_ready() {
        let mut view = ViewController::new();
        assert_eq!(view.active_panel(), Panel::Upload);
        assert_eq!(
            view.start_drawing(),
            Err(ViewError::InvalidTransition {
                from: ViewState::Idle,
                action: "start drawing",
            })
        );

        view.video_selected();
        assert_eq!(view.active_panel(), Panel::RawVideo);
        view.start_drawing().unwrap();
        assert_eq!(view.active_panel(), Panel::DrawingOverlay);
        assert!(view.start_drawing().is_err());
    }

    #[test]
    fn test_pointer_ignored_outside_drawing() {
        let mut view = ViewController::new();
        view.video_selected();
        view.pointer_pressed(p(1.0, 1.0));
        assert!(view.polygons().is_empty());
    }

    #[test]
    fn test_empty_submit_rejected_without_transition() {
        let mut view = ViewController::new();
        view.video_selected();
        view.start_drawing().unwrap();

        let err = view.begin_submit().unwrap_err();
        assert!(matches!(err, BeginSubmitError::Submit(SubmitError::Validation(_))));
        assert_eq!(view.state(), ViewState::Drawing);
        assert_eq!(view.notice(), Some("Please upload a video and define a polygon."));
    }

    #[test]
    fn test_submit_outside_drawing_is_invalid_transition() {
        let mut view = ViewController::new();
        view.video_selected();

        assert_eq!(
            view.begin_submit(),
            Err(BeginSubmitError::Transition(ViewError::InvalidTransition {
                from: ViewState::ReadyToDraw,
                action: "submit",
            }))
        );
        assert_eq!(view.state(), ViewState::ReadyToDraw);
        assert_eq!(view.notice(), None);

        let mut view = drawing_with_polygon();
        view.begin_submit().unwrap();
        let err = view.begin_submit().unwrap_err();
        assert_eq!(err.to_string(), "cannot submit while Submitting");
        assert_eq!(view.state(), ViewState::Submitting);
    }

    #[test]
    fn test_failure_returns_to_drawing_with_polygons() {
        let mut view = drawing_with_polygon();
        let ticket = view.begin_submit().unwrap();

        view.finish_submit(ticket, Err(SubmitError::ServiceRejected { status: 502 }));
        assert_eq!(view.state(), ViewState::Drawing);
        assert_eq!(view.polygons().len(), 1);
        assert_eq!(view.notice(), Some("Failed to process video."));

        // Retry without redrawing.
        assert!(view.begin_submit().is_ok());
    }

    #[test]
    fn test_replacing_video_resets_everything() {
        let mut view = drawing_with_polygon();
        let ticket = view.begin_submit().unwrap();
        view.finish_submit(ticket, Ok(result()));

        view.video_selected();
        assert_eq!(view.state(), ViewState::ReadyToDraw);
        assert!(view.polygons().is_empty());
        assert!(view.result().is_none());
    }

    #[test]
    fn test_outcome_after_replace_is_dropped() {
        let mut view = drawing_with_polygon();
        let ticket = view.begin_submit().unwrap();

        view.video_selected();
        assert!(!view.finish_submit(ticket, Ok(result())));
        assert_eq!(view.state(), ViewState::ReadyToDraw);
        assert!(view.result().is_none());
    }

    #[test]
    fn test_open_polygon_closed_on_submit() {
        let mut view = ViewController::new();
        view.video_selected();
        view.start_drawing().unwrap();
        view.pointer_pressed(p(1.0, 1.0));

        let ticket = view.begin_submit().unwrap();
        view.finish_submit(ticket, Err(SubmitError::Transport("reset".into())));
        view.pointer_pressed(p(2.0, 2.0));
        assert_eq!(view.polygons().len(), 2);
    }
}
