//! Transform math: turning pointer movement into geometry mutations.
//!
//! Translation is incremental: each frame moves the live shapes by the pointer
//! delta since the previous frame. Rotation and scale are absolute: each frame
//! recomputes the live geometry from the gesture snapshot, so the result only
//! depends on where the pointer is now, never on the path it took.
//!
//! Every shape rotates about its own extent center and scales about its own
//! anchor corner in its own rotated frame, so a multi-selection with mixed
//! orientations stays consistent.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::f64::consts::PI;

use kurbo::{Point, Vec2};
use tracing::trace;

use crate::bbox::OrientedBox;
use crate::consts::EPSILON;
use crate::doc::{Shape, ShapeId, ShapeStore};
use crate::events::TransformDelta;
use crate::geom::{normalize_angle, rotate_point};
use crate::handles::HandleIndex;
use crate::input::{DragState, GestureContext, RotationDragState, ScaleDragState};
use crate::selection::Snapshot;

// =============================================================
// Gesture setup
// =============================================================

/// Rotation state for a press at `at` on `shape`. `None` if the shape has no vertices.
#[must_use]
pub fn begin_rotate(shape: &Shape, at: Point) -> Option<RotationDragState> {
    let pivot = OrientedBox::of_shape(shape)?.center;
    Some(RotationDragState { initial_angle: (at - pivot).atan2(), pivot })
}

/// Scale state for grabbing ring handle `index` on `shape`.
#[must_use]
pub fn begin_scale(shape: &Shape, index: HandleIndex) -> Option<ScaleDragState> {
    let bbox = OrientedBox::of_shape(shape)?;
    let opposite_index = index.opposite();
    let opposite_coord = bbox.handle_point(opposite_index);
    let start_coord = rotate_point(bbox.handle_point(index), opposite_coord, -bbox.angle);
    Some(ScaleDragState {
        angle: bbox.angle,
        width: bbox.width(),
        height: bbox.height(),
        handle_index: index,
        opposite_index,
        opposite_coord,
        start_coord,
        head_inverted: false,
    })
}

// =============================================================
// Per-frame update
// =============================================================

/// Advance a gesture to pointer position `current`, mutating live shapes in `doc`.
///
/// Returns `None` when the pointer has not moved since the previous frame.
pub fn apply_frame(ctx: &mut GestureContext, doc: &mut ShapeStore, current: Point) -> Option<TransformDelta> {
    if current == ctx.last {
        return None;
    }
    let delta = match &mut ctx.drag {
        DragState::Translate => {
            let delta = current - ctx.last;
            let ids: Vec<ShapeId> = ctx.snapshot.ids();
            translate_shapes(doc, &ids, delta);
            TransformDelta::Translate(delta)
        }
        DragState::Rotate(state) => TransformDelta::Rotate(rotate_shapes(doc, &ctx.snapshot, state, current)),
        DragState::Scale(state) => {
            let (x, y) = scale_shapes(doc, &ctx.snapshot, state, current);
            TransformDelta::Scale { x, y }
        }
    };
    trace!(?delta, x = current.x, y = current.y, "transform frame");
    ctx.last = current;
    ctx.moved = true;
    Some(delta)
}

/// Move every shape in `ids` by `delta`.
pub fn translate_shapes(doc: &mut ShapeStore, ids: &[ShapeId], delta: Vec2) {
    for id in ids {
        if let Some(geometry) = doc.get_mut(id).and_then(|s| s.geometry.as_mut()) {
            geometry.translate(delta);
        }
    }
}

/// Rotate every snapshot shape by the angle swept around the pivot and write
/// the result to its live counterpart. Returns the swept angle.
pub fn rotate_shapes(doc: &mut ShapeStore, snapshot: &Snapshot, state: &RotationDragState, current: Point) -> f64 {
    let delta = (current - state.pivot).atan2() - state.initial_angle;
    for original in snapshot.shapes() {
        let Some(mut geometry) = original.geometry.clone() else {
            continue;
        };
        let Some(center) = geometry.center() else {
            continue;
        };
        geometry.rotate(delta, center);
        if let Some(live) = doc.get_mut(&original.id) {
            live.geometry = Some(geometry);
            if let Some(angle) = original.orientation_angle {
                live.orientation_angle = Some(normalize_angle(angle + delta));
            }
        }
    }
    delta
}

/// Scale factors for the pointer at `current`, measured in the grabbed box's frame.
#[must_use]
pub fn scale_factors(state: &ScaleDragState, current: Point) -> (f64, f64) {
    let local = rotate_point(current, state.opposite_coord, -state.angle);
    let (dx, dy) = state.handle_index.axis_deltas(state.start_coord, local);
    (axis_factor(dx, state.width), axis_factor(dy, state.height))
}

/// A zero-length side cannot be stretched by a ratio, so it keeps its size.
fn axis_factor(delta: f64, length: f64) -> f64 {
    if length <= EPSILON { 1.0 } else { delta / length + 1.0 }
}

/// Scale every snapshot shape about its own anchor corner and write the
/// result to its live counterpart. Returns `(scale_x, scale_y)`.
pub fn scale_shapes(doc: &mut ShapeStore, snapshot: &Snapshot, state: &mut ScaleDragState, current: Point) -> (f64, f64) {
    let (sx, sy) = scale_factors(state, current);
    state.head_inverted = sy < 0.0;
    for original in snapshot.shapes() {
        let Some(geometry) = original.geometry.as_ref() else {
            continue;
        };
        let angle = original.angle();
        let Some(bbox) = OrientedBox::of_geometry(geometry, angle) else {
            continue;
        };
        let anchor = bbox.handle_point(state.opposite_index);
        let mut scaled = geometry.clone();
        scaled.rotate(-angle, anchor);
        scaled.scale(sx, sy, anchor);
        scaled.rotate(angle, anchor);
        if let Some(live) = doc.get_mut(&original.id) {
            live.geometry = Some(scaled);
        }
    }
    (sx, sy)
}

// =============================================================
// Gesture end
// =============================================================

/// Turn every shape in `ids` half a turn about its own extent center and
/// advance its stored angle by π.
///
/// Applied after a scale drag pulled the top edge below the bottom one, so a
/// directional shape keeps its head next to the rotate handle instead of
/// ending up mirrored.
pub fn flip_heads(doc: &mut ShapeStore, ids: &[ShapeId]) {
    for id in ids {
        let Some(shape) = doc.get_mut(id) else {
            continue;
        };
        let Some(geometry) = shape.geometry.as_mut() else {
            continue;
        };
        if let Some(center) = geometry.center() {
            geometry.rotate(PI, center);
        }
        shape.orientation_angle = Some(normalize_angle(shape.angle() + PI));
    }
}
