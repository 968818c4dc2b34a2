// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Selected video file and its playable handle.
//!
//! `VideoSource` is the only owner of playable handles. Selecting a new
//! file releases the previous handle before the new one is issued, and
//! `release` must be called on teardown.

use crate::util::geometry::Size;
use std::path::{Path, PathBuf};

/// A video file chosen by the user. Contents are not validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub name: String,
}

impl VideoFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Self { path, name }
    }
}

/// Revocable reference used by playback surfaces. Not cloneable, so the
/// source stays its only holder.
#[derive(Debug, PartialEq, Eq)]
pub struct PlayableHandle {
    id: u64,
    url: String,
}

impl PlayableHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Default)]
pub struct VideoSource {
    file: Option<VideoFile>,
    handle: Option<PlayableHandle>,
    dimensions: Option<Size>,
    next_handle: u64,
}

impl VideoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selected file and issue a fresh handle for it.
    pub fn select(&mut self, file: VideoFile) -> &PlayableHandle {
        self.release();

        self.next_handle += 1;
        let handle = PlayableHandle {
            id: self.next_handle,
            url: file_url(&file.path),
        };
        log::info!("Selected {} as handle {}", file.name, handle.id);

        self.file = Some(file);
        self.handle.insert(handle)
    }

    /// Revoke the live handle, if any. The file itself is forgotten too.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::info!("Revoked handle {}", handle.id);
        }
        self.file = None;
        self.dimensions = None;
    }

    /// Record intrinsic dimensions reported for `handle_id`. Reports for a
    /// revoked handle or with empty dimensions are ignored.
    pub fn set_dimensions(&mut self, handle_id: u64, size: Size) -> bool {
        if !self.is_current(handle_id) {
            log::debug!("Ignoring dimensions for stale handle {}", handle_id);
            return false;
        }
        if !size.is_laid_out() {
            log::warn!("Video reported unusable dimensions {:?}", size);
            return false;
        }
        self.dimensions = Some(size);
        true
    }

    pub fn file(&self) -> Option<&VideoFile> {
        self.file.as_ref()
    }

    pub fn handle(&self) -> Option<&PlayableHandle> {
        self.handle.as_ref()
    }

    /// Intrinsic size, once metadata has loaded.
    pub fn dimensions(&self) -> Option<Size> {
        self.dimensions
    }

    pub fn is_current(&self, handle_id: u64) -> bool {
        self.handle.as_ref().is_some_and(|h| h.id == handle_id)
    }

    /// At most one handle is ever live.
    pub fn live_handles(&self) -> usize {
        usize::from(self.handle.is_some())
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::warn!("VideoSource dropped with a live handle");
            self.release();
        }
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
