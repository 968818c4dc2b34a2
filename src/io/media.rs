// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file probing, preview frames and playback.
//!
//! Decoding is delegated to the ffmpeg tools: ffprobe reports intrinsic
//! dimensions, ffmpeg renders a single preview frame as PNG which is
//! decoded with `image`, and ffplay plays files or URLs.

use crate::config::ToolsConfig;
use crate::util::geometry::Size;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Displayed properties of a video stream, after any rotation metadata
/// has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

/// A decoded RGBA frame.
pub struct LoadedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Probe result plus preview frame for one video.
pub struct LoadedMedia {
    pub info: VideoInfo,
    pub frame: LoadedFrame,
}

#[derive(Debug, Clone)]
pub struct MediaTools {
    ffprobe: String,
    ffmpeg: String,
    ffplay: String,
}

impl MediaTools {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            ffprobe: tools.ffprobe.clone(),
            ffmpeg: tools.ffmpeg.clone(),
            ffplay: tools.ffplay.clone(),
        }
    }

    /// Read the width and height of the first video stream.
    pub fn probe(&self, input: &Path) -> Result<VideoInfo> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "v:0",
            ])
            .arg(input)
            .output()
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        parse_probe(&output.stdout)
    }

    /// Render the first frame of `input` to RGBA.
    pub fn extract_preview(&self, input: &Path) -> Result<LoadedFrame> {
        let output = Command::new(&self.ffmpeg)
            .args(["-v", "error", "-i"])
            .arg(input)
            .args([
                "-frames:v", "1",
                "-f", "image2pipe",
                "-vcodec", "png",
                "-",
            ])
            .output()
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() || output.stdout.is_empty() {
            return Err(anyhow!(
                "ffmpeg preview failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        decode_frame(&output.stdout)
    }

    /// Probe and render a preview in one go.
    pub fn load(&self, input: &Path) -> Result<LoadedMedia> {
        let info = self.probe(input)?;
        let frame = self.extract_preview(input)?;
        log::info!(
            "Loaded {} ({}x{})",
            input.display(),
            info.width,
            info.height
        );
        Ok(LoadedMedia { info, frame })
    }

    /// Start playback of a local path or URL without blocking.
    pub fn play(&self, target: &str) -> Result<Child> {
        Command::new(&self.ffplay)
            .args(["-autoexit", "-loglevel", "error"])
            .arg(target)
            .stdin(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {} for {}", self.ffplay, target))
    }
}

/// Playback processes started by the app. Finished players are reaped each
/// frame; the rest are stopped on exit.
#[derive(Debug, Default)]
pub struct Players {
    children: Vec<Child>,
}

impl Players {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, child: Child) {
        self.children.push(child);
    }

    /// Collect players that have exited. Returns how many are still running.
    pub fn reap(&mut self) -> usize {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("Player {} exited with {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("Lost track of player {}: {}", child.id(), e);
                false
            }
        });
        self.children.len()
    }

    /// Kill and wait for every running player.
    pub fn stop_all(&mut self) {
        for mut child in self.children.drain(..) {
            if let Err(e) = child.kill() {
                log::debug!("Player {} already gone: {}", child.id(), e);
            }
            if let Err(e) = child.wait() {
                log::warn!("Failed to wait for player {}: {}", child.id(), e);
            }
        }
    }

    pub fn running(&self) -> usize {
        self.children.len()
    }
}

fn parse_probe(stdout: &[u8]) -> Result<VideoInfo> {
    let json: serde_json::Value = serde_json::from_slice(stdout)?;

    let stream = json["streams"]
        .as_array()
        .and_then(|s| s.first())
        .ok_or_else(|| anyhow!("No video stream found"))?;

    let width = stream["width"].as_u64().unwrap_or(0) as u32;
    let height = stream["height"].as_u64().unwrap_or(0) as u32;
    if width == 0 || height == 0 {
        return Err(anyhow!("Video stream has no dimensions"));
    }

    // Portrait clips are stored landscape with a display rotation.
    let rotation = stream_rotation(stream).rem_euclid(360);
    if rotation == 90 || rotation == 270 {
        log::debug!("Stream rotated by {} degrees, swapping dimensions", rotation);
        return Ok(VideoInfo {
            width: height,
            height: width,
        });
    }

    Ok(VideoInfo { width, height })
}

/// Display rotation in degrees from the display matrix side data, falling
/// back to the legacy `rotate` tag.
fn stream_rotation(stream: &serde_json::Value) -> i64 {
    let side_data = stream["side_data_list"]
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|entry| {
            let rotation = &entry["rotation"];
            rotation
                .as_i64()
                .or_else(|| rotation.as_f64().map(|r| r.round() as i64))
        });

    side_data
        .or_else(|| stream["tags"]["rotate"].as_str().and_then(|r| r.trim().parse().ok()))
        .unwrap_or(0)
}

fn decode_frame(bytes: &[u8]) -> Result<LoadedFrame> {
    let img = image::load_from_memory(bytes).context("Failed to decode preview frame")?;
    let rgba = img.to_rgba8();
    Ok(LoadedFrame {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_dimensions() {
        let json = br#"{"streams":[{"codec_name":"h264","width":1920,"height":1080}]}"#;
        let info = parse_probe(json).unwrap();
        assert_eq!(info, VideoInfo { width: 1920, height: 1080 });
        assert_eq!(info.size(), Size::new(1920.0, 1080.0));
    }

    #[test]
    fn test_parse_probe_portrait_side_data() {
        let json = br#"{"streams":[{"width":1920,"height":1080,
            "side_data_list":[{"side_data_type":"Display Matrix","rotation":-90}]}]}"#;
        let info = parse_probe(json).unwrap();
        assert_eq!(info, VideoInfo { width: 1080, height: 1920 });
    }

    #[test]
    fn test_parse_probe_legacy_rotate_tag() {
        let json = br#"{"streams":[{"width":1280,"height":720,"tags":{"rotate":"270"}}]}"#;
        assert_eq!(parse_probe(json).unwrap(), VideoInfo { width: 720, height: 1280 });
    }

    #[test]
    fn test_parse_probe_upside_down_keeps_dimensions() {
        let json = br#"{"streams":[{"width":1920,"height":1080,
            "side_data_list":[{"rotation":180}]}]}"#;
        assert_eq!(parse_probe(json).unwrap(), VideoInfo { width: 1920, height: 1080 });
    }

    #[test]
    fn test_parse_probe_without_stream() {
        assert!(parse_probe(br#"{"streams":[]}"#).is_err());
        assert!(parse_probe(br#"{"streams":[{"codec_name":"aac"}]}"#).is_err());
        assert!(parse_probe(b"not json").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_players_reaped_after_exit() {
        let mut players = Players::new();
        players.track(Command::new("true").spawn().unwrap());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while players.reap() > 0 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(players.running(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_all_kills_running_players() {
        let mut players = Players::new();
        players.track(Command::new("sleep").arg("30").spawn().unwrap());
        assert_eq!(players.reap(), 1);

        players.stop_all();
        assert_eq!(players.running(), 0);
        assert_eq!(players.reap(), 0);
    }

    #[test]
    fn test_decode_png_frame() {
        let img = image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let frame = decode_frame(png.get_ref()).unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.pixels.len(), 4 * 2 * 4);
        assert_eq!(&frame.pixels[..4], &[10, 20, 30, 255]);
    }
}
