//! Planar geometry for manipulable shapes.
//!
//! `Geometry` is the raw coordinate payload of a shape. The transform math only
//! ever needs a handful of primitives on it (extent, translate, rotate, scale),
//! all expressed as affine maps over every vertex. The free functions at the
//! bottom are the small Euclidean helpers used by the box builder and the
//! handle generator.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::f64::consts::TAU;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;

/// Coordinates of a shape in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates", rename_all = "snake_case")]
pub enum Geometry {
    /// A single dimensionless position.
    Point(Point),
    /// An open polyline.
    LineString(Vec<Point>),
    /// An area bounded by an outer ring and optional holes. Rings are implicitly closed.
    Polygon(Vec<Vec<Point>>),
}

impl Geometry {
    /// Whether this is a dimensionless point. Points cannot be rotated or scaled.
    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self, Self::Point(_))
    }

    /// Axis-aligned extent of all vertices, or `None` when there are none.
    #[must_use]
    pub fn extent(&self) -> Option<Rect> {
        let mut extent: Option<Rect> = None;
        self.visit(|p| {
            extent = Some(extent.map_or_else(|| Rect::from_points(p, p), |r| r.union_pt(p)));
        });
        extent
    }

    /// Center of the axis-aligned extent.
    #[must_use]
    pub fn center(&self) -> Option<Point> {
        self.extent().map(|r| r.center())
    }

    /// Apply an affine map to every vertex in place.
    pub fn apply(&mut self, affine: Affine) {
        match self {
            Self::Point(p) => *p = affine * *p,
            Self::LineString(line) => {
                for p in line.iter_mut() {
                    *p = affine * *p;
                }
            }
            Self::Polygon(rings) => {
                for p in rings.iter_mut().flatten() {
                    *p = affine * *p;
                }
            }
        }
    }

    /// Shift every vertex by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.apply(Affine::translate(delta));
    }

    /// Rotate counter-clockwise by `angle` radians around `center`.
    pub fn rotate(&mut self, angle: f64, center: Point) {
        self.apply(Affine::rotate_about(angle, center));
    }

    /// Scale independently along x and y, holding `center` fixed.
    pub fn scale(&mut self, sx: f64, sy: f64, center: Point) {
        let origin = center.to_vec2();
        self.apply(Affine::translate(origin) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-origin));
    }

    /// Whether `p` lies inside the area (even-odd rule over all rings).
    ///
    /// Points and line strings enclose nothing and always return `false`.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let Self::Polygon(rings) = self else {
            return false;
        };
        let mut inside = false;
        for ring in rings {
            for (a, b) in ring_segments(ring) {
                if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Shortest distance from `p` to any vertex or edge.
    #[must_use]
    pub fn distance_to(&self, p: Point) -> Option<f64> {
        match self {
            Self::Point(q) => Some(distance(*q, p)),
            Self::LineString(line) => line
                .windows(2)
                .map(|w| segment_distance(p, w[0], w[1]))
                .chain(line.first().map(|q| distance(*q, p)))
                .reduce(f64::min),
            Self::Polygon(rings) => rings
                .iter()
                .flat_map(|ring| ring_segments(ring))
                .map(|(a, b)| segment_distance(p, a, b))
                .reduce(f64::min),
        }
    }

    fn visit(&self, mut f: impl FnMut(Point)) {
        match self {
            Self::Point(p) => f(*p),
            Self::LineString(line) => line.iter().copied().for_each(f),
            Self::Polygon(rings) => rings.iter().flatten().copied().for_each(f),
        }
    }
}

fn ring_segments(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Width and height of an axis-aligned extent.
#[must_use]
pub fn size(extent: Rect) -> Size {
    extent.size()
}

/// Distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 <= EPSILON * EPSILON {
        return distance(p, a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    distance(p, a + ab * t)
}

/// Rotate a single point counter-clockwise by `angle` around `center`.
#[must_use]
pub fn rotate_point(p: Point, center: Point, angle: f64) -> Point {
    Affine::rotate_about(angle, center) * p
}

/// Normalize an angle in radians to `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// The four corners of an axis-aligned extent, in no particular order.
#[must_use]
pub fn rect_corners(extent: Rect) -> [Point; 4] {
    [
        Point::new(extent.x0, extent.y0),
        Point::new(extent.x1, extent.y0),
        Point::new(extent.x1, extent.y1),
        Point::new(extent.x0, extent.y1),
    ]
}

/// Reorder rectangle corners into the canonical closed ring
/// `[minX,maxY], [minX,minY], [maxX,minY], [maxX,maxY], [minX,maxY]`.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn rearrange(corners: &[Point]) -> Option<[Point; 5]> {
    let first = corners.first()?;
    let mut extent = Rect::from_points(*first, *first);
    for p in &corners[1..] {
        extent = extent.union_pt(*p);
    }
    let top_left = Point::new(extent.x0, extent.y1);
    Some([
        top_left,
        Point::new(extent.x0, extent.y0),
        Point::new(extent.x1, extent.y0),
        Point::new(extent.x1, extent.y1),
        top_left,
    ])
}
