// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Loaded from the YAML file named by `ROISCAN_CONFIG`, else `roiscan.yaml`
//! in the working directory, else defaults. `ROISCAN_BASE_URL` overrides
//! the service address.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "ROISCAN_CONFIG";
const BASE_URL_ENV: &str = "ROISCAN_BASE_URL";
const DEFAULT_CONFIG_FILE: &str = "roiscan.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub analyze_path: String,
    pub videos_path: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Program names (or paths) of the ffmpeg tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffprobe: String,
    pub ffmpeg: String,
    pub ffplay: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            analyze_path: "analyze".to_string(),
            videos_path: "videos".to_string(),
            request_timeout_secs: 600,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffprobe: "ffprobe".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffplay: "ffplay".to_string(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the environment and the optional file.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.service.base_url = base_url;
        }

        log::info!("Analysis service at {}", config.service.base_url);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl ServiceConfig {
    pub fn analyze_url(&self) -> String {
        join_url(&self.base_url, &[self.analyze_path.as_str()])
    }

    /// Retrieval address of a processed video.
    pub fn video_url(&self, resource_id: &str) -> String {
        join_url(&self.base_url, &[self.videos_path.as_str(), resource_id])
    }
}

fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}
