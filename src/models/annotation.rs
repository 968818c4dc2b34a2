// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! Points, polygons and polygon sets are tagged with the coordinate space
//! they are expressed in, so canvas pixels and video pixels can never be
//! mixed inside one structure.

use std::fmt;
use std::marker::PhantomData;

/// Pixels of the currently rendered drawing overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanvasSpace;

/// Pixels of the video's intrinsic resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoSpace;

/// A 2D point in the coordinate space `S`.
#[derive(Clone, Copy, PartialEq)]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    space: PhantomData<S>,
}

impl<S> Point<S> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

impl<S> fmt::Debug for Point<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// An ordered list of vertices. The last vertex implicitly connects back to
/// the first once the polygon is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<S> {
    points: Vec<Point<S>>,
}

impl<S> Polygon<S> {
    /// Create a polygon seeded with its first vertex.
    pub fn starting_at(point: Point<S>) -> Self {
        Self {
            points: vec![point],
        }
    }

    pub fn from_points(points: Vec<Point<S>>) -> Self {
        Self { points }
    }

    /// Add a vertex to the polygon.
    pub fn push(&mut self, point: Point<S>) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point<S>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Ordered collection of polygons. Order is preserved end to end.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonSet<S> {
    polygons: Vec<Polygon<S>>,
}

impl<S> Default for PolygonSet<S> {
    fn default() -> Self {
        Self {
            polygons: Vec::new(),
        }
    }
}

impl<S> PolygonSet<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, polygon: Polygon<S>) {
        self.polygons.push(polygon);
    }

    pub fn last_mut(&mut self) -> Option<&mut Polygon<S>> {
        self.polygons.last_mut()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon<S>> {
        self.polygons.iter()
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn clear(&mut self) {
        self.polygons.clear();
    }
}

impl<S> FromIterator<Polygon<S>> for PolygonSet<S> {
    fn from_iter<I: IntoIterator<Item = Polygon<S>>>(iter: I) -> Self {
        Self {
            polygons: iter.into_iter().collect(),
        }
    }
}

impl<'a, S> IntoIterator for &'a PolygonSet<S> {
    type Item = &'a Polygon<S>;
    type IntoIter = std::slice::Iter<'a, Polygon<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.polygons.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_keeps_insertion_order() {
        let mut polygon = Polygon::<CanvasSpace>::starting_at(Point::new(3.0, 4.0));
        polygon.push(Point::new(1.0, 1.0));
        polygon.push(Point::new(2.0, 0.0));

        let xs: Vec<f64> = polygon.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_set_collects_in_order() {
        let set: PolygonSet<VideoSpace> = (0..3)
            .map(|i| Polygon::starting_at(Point::new(i as f64, 0.0)))
            .collect();

        assert_eq!(set.len(), 3);
        let firsts: Vec<f64> = set.iter().map(|p| p.points()[0].x).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0]);
    }
}
