// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP access to the analysis service.
//!
//! The pipeline talks to the service through `AnalysisTransport` so the
//! request can be inspected without a network.

use crate::config::ServiceConfig;
use reqwest::blocking::multipart::{Form, Part};
use std::path::PathBuf;
use std::time::Duration;

/// Everything one analysis request carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisForm {
    pub video_path: PathBuf,
    pub video_name: String,
    /// JSON array of polygons in video pixels.
    pub polygon: String,
}

/// Status and raw body of a service response.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Connection, timeout or local read failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait AnalysisTransport: Send + Sync {
    /// Send the multipart analysis request.
    fn post_analysis(&self, form: &AnalysisForm) -> Result<ServiceResponse, TransportError>;

    /// GET a processed video.
    fn fetch(&self, url: &str) -> Result<ServiceResponse, TransportError>;
}

pub struct HttpTransport {
    http: reqwest::blocking::Client,
    analyze_url: String,
}

impl HttpTransport {
    pub fn new(service: &ServiceConfig) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(service.request_timeout_secs))
            .connect_timeout(Duration::from_secs(service.connect_timeout_secs))
            .build()
            .map_err(|e| TransportError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            analyze_url: service.analyze_url(),
        })
    }
}

impl AnalysisTransport for HttpTransport {
    fn post_analysis(&self, form: &AnalysisForm) -> Result<ServiceResponse, TransportError> {
        let bytes = std::fs::read(&form.video_path).map_err(|e| {
            TransportError(format!("failed to read {}: {e}", form.video_path.display()))
        })?;
        log::info!(
            "POST {} ({} bytes of video, {} bytes of polygons)",
            self.analyze_url,
            bytes.len(),
            form.polygon.len()
        );

        let body = Form::new()
            .part("video", Part::bytes(bytes).file_name(form.video_name.clone()))
            .text("polygon", form.polygon.clone());

        let response = self
            .http
            .post(&self.analyze_url)
            .multipart(body)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        read_response(response)
    }

    fn fetch(&self, url: &str) -> Result<ServiceResponse, TransportError> {
        log::info!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;
        read_response(response)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<ServiceResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| TransportError(e.to_string()))?
        .to_vec();
    Ok(ServiceResponse { status, body })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        let response = |status| ServiceResponse {
            status,
            body: Vec::new(),
        };
        assert!(response(200).is_success());
        assert!(response(201).is_success());
        assert!(!response(404).is_success());
        assert!(!response(500).is_success());
    }

    #[test]
    fn test_client_builds_from_defaults() {
        assert!(HttpTransport::new(&ServiceConfig::default()).is_ok());
    }
}
