// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts geometry captured on the drawing overlay
//! (canvas pixels) into the video's native pixel space.

use crate::models::annotation::{CanvasSpace, Point, Polygon, PolygonSet, VideoSpace};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides are strictly positive and finite.
    pub fn is_laid_out(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("{0} dimensions are not available yet")]
    DimensionUnavailable(&'static str),
}

/// Per-axis scale factors from canvas pixels to video pixels.
#[derive(Debug, Clone, Copy)]
struct Scale {
    canvas: Size,
    video: Size,
}

impl Scale {
    fn new(canvas: Size, video: Size) -> Result<Self, MapError> {
        if !canvas.is_laid_out() {
            return Err(MapError::DimensionUnavailable("canvas"));
        }
        if !video.is_laid_out() {
            return Err(MapError::DimensionUnavailable("video"));
        }
        Ok(Self { canvas, video })
    }

    // Multiply before dividing so corners land exactly on the video edges.
    fn apply(&self, point: &Point<CanvasSpace>) -> Point<VideoSpace> {
        Point::new(
            point.x * self.video.width / self.canvas.width,
            point.y * self.video.height / self.canvas.height,
        )
    }
}

/// Convert a canvas point to video pixel coordinates.
pub fn point_to_video_space(
    point: &Point<CanvasSpace>,
    canvas: Size,
    video: Size,
) -> Result<Point<VideoSpace>, MapError> {
    Ok(Scale::new(canvas, video)?.apply(point))
}

/// Convert a polygon from canvas pixels to video pixels, keeping vertex order.
pub fn to_video_space(
    polygon: &Polygon<CanvasSpace>,
    canvas: Size,
    video: Size,
) -> Result<Polygon<VideoSpace>, MapError> {
    let scale = Scale::new(canvas, video)?;
    Ok(Polygon::from_points(
        polygon.points().iter().map(|p| scale.apply(p)).collect(),
    ))
}

/// Convert every polygon of a set, keeping set order.
pub fn set_to_video_space(
    polygons: &PolygonSet<CanvasSpace>,
    canvas: Size,
    video: Size,
) -> Result<PolygonSet<VideoSpace>, MapError> {
    polygons
        .iter()
        .map(|polygon| to_video_space(polygon, canvas, video))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_point(x: f64, y: f64) -> Point<CanvasSpace> {
        Point::new(x, y)
    }

    #[test]
    fn test_corners_map_exactly() {
        let canvas = Size::new(800.0, 600.0);
        let video = Size::new(1920.0, 1080.0);

        let br = point_to_video_space(&canvas_point(800.0, 600.0), canvas, video).unwrap();
        assert_eq!((br.x, br.y), (1920.0, 1080.0));

        let tl = point_to_video_space(&canvas_point(0.0, 0.0), canvas, video).unwrap();
        assert_eq!((tl.x, tl.y), (0.0, 0.0));

        let mid = point_to_video_space(&canvas_point(400.0, 300.0), canvas, video).unwrap();
        assert_eq!((mid.x, mid.y), (960.0, 540.0));
    }

    #[test]
    fn test_scale_independence() {
        let video = Size::new(1920.0, 1080.0);

        let small = point_to_video_space(&canvas_point(123.0, 45.0), Size::new(640.0, 360.0), video)
            .unwrap();
        let large =
            point_to_video_space(&canvas_point(246.0, 90.0), Size::new(1280.0, 720.0), video)
                .unwrap();

        assert_eq!(small, large);
        assert_eq!((small.x, small.y), (369.0, 135.0));
    }

    #[test]
    fn test_axes_scale_independently() {
        // Overlay squashed vertically relative to the video.
        let p = point_to_video_space(
            &canvas_point(100.0, 100.0),
            Size::new(200.0, 100.0),
            Size::new(400.0, 400.0),
        )
        .unwrap();
        assert_eq!((p.x, p.y), (200.0, 400.0));
    }

    #[test]
    fn test_zero_canvas_is_dimension_unavailable() {
        let polygon = Polygon::starting_at(canvas_point(1.0, 1.0));

        let err = to_video_space(&polygon, Size::new(0.0, 600.0), Size::new(1920.0, 1080.0))
            .unwrap_err();
        assert_eq!(err, MapError::DimensionUnavailable("canvas"));

        let err = to_video_space(&polygon, Size::new(800.0, 600.0), Size::new(1920.0, 0.0))
            .unwrap_err();
        assert_eq!(err, MapError::DimensionUnavailable("video"));
    }

    #[test]
    fn test_mapping_is_idempotent() {
        let polygon = Polygon::from_points(vec![canvas_point(10.0, 20.0), canvas_point(30.5, 7.25)]);
        let canvas = Size::new(333.0, 217.0);
        let video = Size::new(1280.0, 720.0);

        let first = to_video_space(&polygon, canvas, video).unwrap();
        let second = to_video_space(&polygon, canvas, video).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_order_preserved() {
        let mut set = PolygonSet::new();
        set.push(Polygon::from_points(vec![canvas_point(0.0, 0.0), canvas_point(10.0, 0.0)]));
        set.push(Polygon::starting_at(canvas_point(5.0, 5.0)));

        let mapped = set_to_video_space(&set, Size::new(10.0, 10.0), Size::new(20.0, 20.0)).unwrap();
        let lens: Vec<usize> = mapped.iter().map(Polygon::len).collect();
        assert_eq!(lens, vec![2, 1]);
        assert_eq!(mapped.iter().next().unwrap().points()[1].x, 20.0);
    }
}
