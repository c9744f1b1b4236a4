//! Hit-testing against the overlay and body shapes.
//!
//! Picking goes top-down: overlay handles first (last drawn wins), then body
//! shapes from the highest z-index down. Bodies must sit on an eligible layer,
//! have geometry, and pass the host filter. Handles are always eligible since
//! they only exist for shapes that were accepted when selected.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use kurbo::Point;

use crate::config::TransformOptions;
use crate::doc::{ShapeId, ShapeStore};
use crate::geom::Geometry;
use crate::handles::{HandleShape, Overlay};

/// What the pointer landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum Pick {
    /// A body shape.
    Body(ShapeId),
    /// An overlay handle.
    Handle(HandleShape),
}

/// Find the topmost pickable entity under `at`.
///
/// `resolution` is world units per screen pixel; it converts the configured
/// pixel tolerance into world units.
#[must_use]
pub fn hit_test(at: Point, doc: &ShapeStore, overlay: &Overlay, options: &TransformOptions, resolution: f64) -> Option<Pick> {
    let tolerance = options.config.hit_tolerance_px * resolution;

    for handle in overlay.handles().iter().rev() {
        if handle_hit(&handle.pick_geometry(resolution), at, tolerance) {
            return Some(Pick::Handle(handle.clone()));
        }
    }

    doc.sorted_shapes()
        .into_iter()
        .rev()
        .filter(|shape| options.config.accepts_layer(shape.layer))
        .find(|shape| {
            shape
                .geometry
                .as_ref()
                .is_some_and(|g| body_hit(g, at, tolerance))
                && (options.filter)(*shape)
        })
        .map(|shape| Pick::Body(shape.id))
}

/// Handles are stroke-only: outlines are hit on their edge, not their interior.
fn handle_hit(geometry: &Geometry, at: Point, tolerance: f64) -> bool {
    geometry.distance_to(at).is_some_and(|d| d <= tolerance)
}

fn body_hit(geometry: &Geometry, at: Point, tolerance: f64) -> bool {
    geometry.contains(at) || geometry.distance_to(at).is_some_and(|d| d <= tolerance)
}
