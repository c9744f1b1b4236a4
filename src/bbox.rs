//! Oriented bounding boxes.
//!
//! A rotated shape's raw extent says nothing about its footprint in its own
//! frame. The box is rebuilt from scratch each time: undo the stored rotation
//! around the extent center, take the axis-aligned extent of that, and rotate
//! the resulting rectangle back. Never cache the result across frames; every
//! geometry mutation invalidates it.

#[cfg(test)]
#[path = "bbox_test.rs"]
mod bbox_test;

use kurbo::Point;

use crate::doc::Shape;
use crate::geom::{Geometry, distance, rearrange, rect_corners, rotate_point};
use crate::handles::HandleIndex;

/// A shape's bounding rectangle in its own rotated frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// `[top_left, bottom_left, bottom_right, top_right]` in world space.
    pub corners: [Point; 4],
    /// Pivot used to undo and reapply the rotation (the raw extent center).
    pub center: Point,
    /// Rotation of the box away from axis alignment, in radians.
    pub angle: f64,
}

impl OrientedBox {
    /// Build the box of `geometry` rotated by `angle`. `None` if it has no vertices.
    #[must_use]
    pub fn of_geometry(geometry: &Geometry, angle: f64) -> Option<Self> {
        let center = geometry.center()?;
        let mut upright = geometry.clone();
        upright.rotate(-angle, center);
        let ring = rearrange(&rect_corners(upright.extent()?))?;
        let mut corners = [ring[0], ring[1], ring[2], ring[3]];
        for corner in &mut corners {
            *corner = rotate_point(*corner, center, angle);
        }
        Some(Self { corners, center, angle })
    }

    /// Build the box of a shape using its stored orientation angle.
    #[must_use]
    pub fn of_shape(shape: &Shape) -> Option<Self> {
        Self::of_geometry(shape.geometry.as_ref()?, shape.angle())
    }

    /// World position of a ring handle.
    #[must_use]
    pub fn handle_point(&self, index: HandleIndex) -> Point {
        let i = usize::from(index.get());
        if i % 2 == 0 {
            self.corners[i / 2]
        } else {
            self.corners[i / 2].midpoint(self.corners[(i / 2 + 1) % 4])
        }
    }

    /// Length of the bottom side.
    #[must_use]
    pub fn width(&self) -> f64 {
        distance(self.corners[1], self.corners[2])
    }

    /// Length of the left side.
    #[must_use]
    pub fn height(&self) -> f64 {
        distance(self.corners[0], self.corners[1])
    }
}
