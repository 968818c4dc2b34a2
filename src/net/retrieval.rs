// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Retrieval of a processed video.
//!
//! A failed retrieval is not fatal: the caller logs it and still offers
//! the URL for playback. Downloads live in a directory private to this
//! process and are removed when the video is replaced or the app exits.

use super::transport::{AnalysisTransport, TransportError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("service answered {status} for {url}")]
    NotAvailable { url: String, status: u16 },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to store processed video: {0}")]
    Io(#[from] std::io::Error),
}

/// Download `url` into `dir`, naming the file after `resource_id`.
pub fn retrieve(
    transport: &dyn AnalysisTransport,
    url: &str,
    resource_id: &str,
    dir: &Path,
) -> Result<PathBuf, RetrievalError> {
    let response = transport.fetch(url)?;
    if !response.is_success() {
        return Err(RetrievalError::NotAvailable {
            url: url.to_string(),
            status: response.status,
        });
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(local_name(resource_id));
    std::fs::write(&path, &response.body)?;
    log::info!(
        "Stored processed video at {} ({} bytes)",
        path.display(),
        response.body.len()
    );
    Ok(path)
}

/// Storage directory for downloads of this process.
pub fn storage_dir() -> PathBuf {
    std::env::temp_dir().join(format!("roiscan-{}", std::process::id()))
}

/// Remove a stored download. A file that is already gone is not an error.
pub fn discard(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => {
            log::debug!("Discarded {}", path.display());
            Ok(())
        }
    }
}

/// Remove the storage directory and everything in it.
pub fn clear(dir: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// File name safe to join onto a local directory.
fn local_name(resource_id: &str) -> String {
    Path::new(resource_id)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "processed.mp4".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::transport::fake::FakeTransport;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("roiscan-test-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_retrieve_stores_body() {
        let fake = FakeTransport::ok("video-bytes");
        let dir = scratch_dir("store");

        let path = retrieve(&fake, "http://svc/videos/out.mp4", "out.mp4", &dir).unwrap();

        assert_eq!(path, dir.join("out.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"video-bytes");
        assert_eq!(*fake.fetched.lock().unwrap(), vec!["http://svc/videos/out.mp4".to_string()]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_not_found_is_not_available() {
        let fake = FakeTransport::status(404);
        let dir = scratch_dir("missing");

        let err = retrieve(&fake, "http://svc/videos/a.mp4", "a.mp4", &dir).unwrap_err();
        assert!(matches!(err, RetrievalError::NotAvailable { status: 404, .. }));
        assert!(!dir.join("a.mp4").exists());
    }

    #[test]
    fn test_transport_error_passes_through() {
        let fake = FakeTransport::replying(Err(TransportError("timed out".into())));
        let err = retrieve(&fake, "http://svc/videos/a.mp4", "a.mp4", &scratch_dir("t")).unwrap_err();
        assert_eq!(err.to_string(), "timed out");
    }

    #[test]
    fn test_discard_removes_stored_video() {
        let fake = FakeTransport::ok("video-bytes");
        let dir = scratch_dir("discard");
        let path = retrieve(&fake, "http://svc/videos/out.mp4", "out.mp4", &dir).unwrap();

        discard(&path).unwrap();
        assert!(!path.exists());
        // Discarding twice is harmless.
        discard(&path).unwrap();

        clear(&dir).unwrap();
        assert!(!dir.exists());
        clear(&dir).unwrap();
    }

    #[test]
    fn test_storage_dir_is_per_process() {
        let dir = storage_dir();
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, format!("roiscan-{}", std::process::id()));
        assert!(dir.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn test_local_name_strips_directories() {
        assert_eq!(local_name("../../etc/passwd"), "passwd");
        assert_eq!(local_name("out.mp4"), "out.mp4");
        assert_eq!(local_name(""), "processed.mp4");
    }
}
