// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Result returned by the analysis service.

/// Identifier of the processed video produced by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub resource_id: String,
}
