// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wire formats of the analysis service.
//!
//! The `polygon` form field is a JSON array of polygons, each an array of
//! `[x, y]` pairs in video pixels.

use crate::models::analysis::AnalysisResult;
use crate::models::annotation::{PolygonSet, VideoSpace};
use anyhow::Result;
use serde::Deserialize;

/// Success body of the analysis request.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    video_filename: String,
}

/// Serialize polygons for the `polygon` form field.
pub fn polygon_payload(polygons: &PolygonSet<VideoSpace>) -> Result<String> {
    let data: Vec<Vec<[f64; 2]>> = polygons
        .iter()
        .map(|polygon| polygon.points().iter().map(|p| [p.x, p.y]).collect())
        .collect();
    Ok(serde_json::to_string(&data)?)
}

/// Parse the success body of an analysis request.
pub fn parse_analysis_response(body: &[u8]) -> Result<AnalysisResult> {
    let response: AnalyzeResponse = serde_json::from_slice(body)?;
    Ok(AnalysisResult {
        resource_id: response.video_filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Point, Polygon};

    #[test]
    fn test_payload_shape() {
        let mut set = PolygonSet::new();
        set.push(Polygon::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.5, 0.0),
        ]));
        set.push(Polygon::starting_at(Point::new(5.0, 6.0)));

        let json = polygon_payload(&set).unwrap();
        assert_eq!(json, "[[[0.0,0.0],[10.5,0.0]],[[5.0,6.0]]]");
    }

    #[test]
    fn test_empty_set_is_empty_array() {
        let set = PolygonSet::<VideoSpace>::new();
        assert_eq!(polygon_payload(&set).unwrap(), "[]");
    }

    #[test]
    fn test_parse_response() {
        let result = parse_analysis_response(br#"{"video_filename":"out_123.mp4"}"#).unwrap();
        assert_eq!(result.resource_id, "out_123.mp4");
    }

    #[test]
    fn test_parse_response_missing_field() {
        assert!(parse_analysis_response(br#"{"status":"ok"}"#).is_err());
        assert!(parse_analysis_response(b"<html>").is_err());
    }
}
