// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Failure taxonomy of the submission pipeline.

use crate::util::geometry::MapError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// No video selected or no polygon drawn. Raised before any network call.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// Canvas or video size not known yet. Submission is not ready.
    #[error(transparent)]
    DimensionUnavailable(#[from] MapError),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("the service declined the request (status {status})")]
    ServiceRejected { status: u16 },
}

impl SubmitError {
    /// Message shown to the user, or `None` for the not-ready condition.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            SubmitError::Validation(_) => Some("Please upload a video and define a polygon."),
            SubmitError::DimensionUnavailable(_) => None,
            SubmitError::Transport(_) => Some("Error processing video."),
            SubmitError::ServiceRejected { .. } => Some("Failed to process video."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_has_no_user_message() {
        let err = SubmitError::from(MapError::DimensionUnavailable("canvas"));
        assert_eq!(err.user_message(), None);
        assert_eq!(err.to_string(), "canvas dimensions are not available yet");
    }

    #[test]
    fn test_failures_map_to_messages() {
        assert_eq!(
            SubmitError::ServiceRejected { status: 500 }.user_message(),
            Some("Failed to process video.")
        );
        assert_eq!(
            SubmitError::Transport("connection refused".into()).user_message(),
            Some("Error processing video.")
        );
    }
}
