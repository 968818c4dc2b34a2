// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Polygon authoring session.
//!
//! The session accumulates polygons in canvas pixels. At most one polygon
//! is open at a time and it is always the last one in the set.

use super::annotation::{CanvasSpace, Point, Polygon, PolygonSet};

#[derive(Debug, Default)]
pub struct AnnotationSession {
    polygons: PolygonSet<CanvasSpace>,
    /// The last polygon is still being extended.
    open: bool,
}

impl AnnotationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new polygon seeded with `point`. Ignored while one is open.
    pub fn begin_polygon(&mut self, point: Point<CanvasSpace>) -> bool {
        if self.open {
            log::debug!("begin_polygon ignored, a polygon is already open");
            return false;
        }
        self.polygons.push(Polygon::starting_at(point));
        self.open = true;
        true
    }

    /// Append `point` to the open polygon. No-op when nothing is open.
    pub fn extend_polygon(&mut self, point: Point<CanvasSpace>) -> bool {
        if !self.open {
            return false;
        }
        match self.polygons.last_mut() {
            Some(polygon) => {
                polygon.push(point);
                true
            }
            None => false,
        }
    }

    /// Close the open polygon. Degenerate polygons are kept.
    pub fn end_polygon(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        if let Some(polygon) = self.polygons.iter().last() {
            log::info!(
                "Closed polygon with {} vertices, total polygons: {}",
                polygon.len(),
                self.polygons.len()
            );
        }
        true
    }

    pub fn polygons(&self) -> &PolygonSet<CanvasSpace> {
        &self.polygons
    }

    pub fn has_open_polygon(&self) -> bool {
        self.open
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
        self.open = false;
    }
}
