// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Submission of a video and its regions to the analysis service.
//!
//! Validation and the canvas-to-video conversion run synchronously on the
//! caller's thread, so the request is built from values captured at call
//! time. Only the network exchange runs in the background.

use super::transport::{AnalysisForm, AnalysisTransport};
use crate::error::SubmitError;
use crate::io::serialization;
use crate::io::source::{VideoFile, VideoSource};
use crate::models::analysis::AnalysisResult;
use crate::models::annotation::{CanvasSpace, PolygonSet, VideoSpace};
use crate::util::geometry::{self, MapError, Size};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// A validated request, already converted to video pixels.
#[derive(Debug, Clone)]
pub struct Submission {
    video: VideoFile,
    polygons: PolygonSet<VideoSpace>,
}

impl Submission {
    pub fn polygons(&self) -> &PolygonSet<VideoSpace> {
        &self.polygons
    }

    fn form(&self) -> Result<AnalysisForm, SubmitError> {
        let polygon = serialization::polygon_payload(&self.polygons)
            .map_err(|e| SubmitError::Transport(format!("failed to encode polygons: {e}")))?;
        Ok(AnalysisForm {
            video_path: self.video.path.clone(),
            video_name: self.video.name.clone(),
            polygon,
        })
    }
}

pub struct SubmissionPipeline {
    transport: Arc<dyn AnalysisTransport>,
}

impl SubmissionPipeline {
    pub fn new(transport: Arc<dyn AnalysisTransport>) -> Self {
        Self { transport }
    }

    /// Check preconditions and convert the polygons. Never touches the
    /// network.
    pub fn prepare(
        source: &VideoSource,
        polygons: &PolygonSet<CanvasSpace>,
        canvas: Option<Size>,
        video: Option<Size>,
    ) -> Result<Submission, SubmitError> {
        let file = source
            .file()
            .ok_or(SubmitError::Validation("no video selected"))?;
        if polygons.is_empty() {
            return Err(SubmitError::Validation("no polygon drawn"));
        }
        if polygons.iter().any(|polygon| polygon.is_empty()) {
            return Err(SubmitError::Validation("polygon without vertices"));
        }

        let canvas = canvas.ok_or(MapError::DimensionUnavailable("canvas"))?;
        let video = video.ok_or(MapError::DimensionUnavailable("video"))?;
        let polygons = geometry::set_to_video_space(polygons, canvas, video)?;

        Ok(Submission {
            video: file.clone(),
            polygons,
        })
    }

    /// Validate, convert and send in one blocking call.
    pub fn submit(
        &self,
        source: &VideoSource,
        polygons: &PolygonSet<CanvasSpace>,
        canvas: Option<Size>,
        video: Option<Size>,
    ) -> Result<AnalysisResult, SubmitError> {
        let submission = Self::prepare(source, polygons, canvas, video)?;
        send(self.transport.as_ref(), &submission)
    }

    /// Validate and convert now, send on a background thread.
    pub fn spawn(
        &self,
        source: &VideoSource,
        polygons: &PolygonSet<CanvasSpace>,
        canvas: Option<Size>,
        video: Option<Size>,
    ) -> Result<SubmissionTask, SubmitError> {
        let submission = Self::prepare(source, polygons, canvas, video)?;
        let transport = Arc::clone(&self.transport);
        let (sender, receiver) = channel();

        std::thread::spawn(move || {
            let result = send(transport.as_ref(), &submission);
            let _ = sender.send(result);
        });

        Ok(SubmissionTask {
            receiver,
            delivered: false,
        })
    }

    pub fn transport(&self) -> Arc<dyn AnalysisTransport> {
        Arc::clone(&self.transport)
    }
}

/// Single attempt, no retry.
fn send(
    transport: &dyn AnalysisTransport,
    submission: &Submission,
) -> Result<AnalysisResult, SubmitError> {
    let form = submission.form()?;
    log::info!(
        "Submitting {} with {} polygon(s)",
        form.video_name,
        submission.polygons.len()
    );

    let response = transport
        .post_analysis(&form)
        .map_err(|e| SubmitError::Transport(e.to_string()))?;

    if !response.is_success() {
        return Err(SubmitError::ServiceRejected {
            status: response.status,
        });
    }

    serialization::parse_analysis_response(&response.body)
        .map_err(|e| SubmitError::Transport(format!("malformed response: {e}")))
}

/// An in-flight submission. Its outcome is yielded exactly once.
pub struct SubmissionTask {
    receiver: Receiver<Result<AnalysisResult, SubmitError>>,
    delivered: bool,
}

impl SubmissionTask {
    /// Non-blocking check for the outcome.
    pub fn poll(&mut self) -> Option<Result<AnalysisResult, SubmitError>> {
        if self.delivered {
            return None;
        }
        let outcome = match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(SubmitError::Transport(
                "submission worker stopped without a result".to_string(),
            )),
        };
        self.delivered = true;
        Some(outcome)
    }

    /// Block until the outcome arrives.
    pub fn wait(mut self) -> Result<AnalysisResult, SubmitError> {
        if self.delivered {
            return Err(SubmitError::Transport("outcome already delivered".to_string()));
        }
        self.delivered = true;
        self.receiver.recv().unwrap_or_else(|_| {
            Err(SubmitError::Transport(
                "submission worker stopped without a result".to_string(),
            ))
        })
    }
}
