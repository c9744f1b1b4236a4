//! Handle overlay: the grips drawn around the selection.
//!
//! Scale handles sit on an eight-position ring around the oriented box,
//! numbered counter-clockwise from the top-left corner:
//!
//! ```text
//!   0 ---- 7 ---- 6
//!   |             |
//!   1             5
//!   |             |
//!   2 ---- 3 ---- 4
//! ```
//!
//! Even indices are corners and scale both axes; odd indices are edge midpoints
//! and lock the axis along their side. The handle opposite index `i` is always
//! `(i + 4) % 8` and acts as the fixed anchor while `i` is dragged.
//!
//! The overlay is never diffed. Every selection change and every drag frame
//! throws the previous handles away and generates a fresh set.

#[cfg(test)]
#[path = "handles_test.rs"]
mod handles_test;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bbox::OrientedBox;
use crate::config::TransformConfig;
use crate::consts::{DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, POINT_GLYPH_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{LayerId, ShapeId, ShapeStore, Stroke};
use crate::geom::{Geometry, rearrange, rect_corners};
use crate::input::Mode;

/// Position of a scale handle on the box perimeter, in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HandleIndex(u8);

impl HandleIndex {
    /// All ring positions in index order.
    pub const ALL: [Self; 8] = [Self(0), Self(1), Self(2), Self(3), Self(4), Self(5), Self(6), Self(7)];

    /// Midpoint of the top side, where the rotate handle is placed.
    pub const TOP: Self = Self(7);

    /// Ring position `index`, or `None` past the last handle.
    #[must_use]
    pub fn new(index: u8) -> Option<Self> {
        (index < 8).then_some(Self(index))
    }

    /// Raw ring position, 0 through 7.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The diametrically opposite handle, used as the scale anchor.
    #[must_use]
    pub fn opposite(self) -> Self {
        Self((self.0 + 4) % 8)
    }

    /// Corners scale both axes; edges only one.
    #[must_use]
    pub fn is_corner(self) -> bool {
        self.0 % 2 == 0
    }

    /// Signed growth along each box axis when the pointer moves from `start`
    /// to `local`, both expressed in the box's un-rotated frame.
    ///
    /// Positive values always mean "the box gets bigger on this axis".
    #[must_use]
    pub fn axis_deltas(self, start: Point, local: Point) -> (f64, f64) {
        let left = start.x - local.x;
        let right = local.x - start.x;
        let up = local.y - start.y;
        let down = start.y - local.y;
        match self.0 {
            0 => (left, up),
            1 => (left, 0.0),
            2 => (left, down),
            3 => (0.0, down),
            4 => (right, down),
            5 => (right, 0.0),
            6 => (right, up),
            _ => (0.0, up),
        }
    }
}

impl TryFrom<u8> for HandleIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("handle index out of range: {value}"))
    }
}

impl From<HandleIndex> for u8 {
    fn from(index: HandleIndex) -> Self {
        index.0
    }
}

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "index", rename_all = "snake_case")]
pub enum HandleKind {
    Translate,
    Rotate,
    Scale(HandleIndex),
}

impl HandleKind {
    /// The transform mode a press on this handle enters.
    #[must_use]
    pub fn mode(self) -> Mode {
        match self {
            Self::Translate => Mode::Translate,
            Self::Rotate => Mode::Rotate,
            Self::Scale(_) => Mode::Scale,
        }
    }
}

/// Drawing parameters handed to the styling subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "glyph", rename_all = "snake_case")]
pub enum HandleGlyph {
    /// Stroke-only outline following the handle geometry.
    Outline,
    /// Small circle marking a point shape.
    Dot { radius_px: f64 },
    /// Square grip, counter-rotated so it stays screen-aligned.
    Grip { rotation: f64 },
    /// Arrow drawn `offset_px` screen pixels away from the handle point along `direction`.
    Arrow { rotation: f64, direction: Vec2, offset_px: f64 },
}

/// A transient overlay entity bound to a selected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandleShape {
    /// The shape this handle manipulates.
    pub body: ShapeId,
    pub kind: HandleKind,
    pub geometry: Geometry,
    pub glyph: HandleGlyph,
}

impl HandleShape {
    /// Where the handle is drawn, in world units. Arrow glyphs are displaced
    /// from their geometry, so picking has to follow the displacement.
    #[must_use]
    pub fn pick_geometry(&self, resolution: f64) -> Geometry {
        match (&self.geometry, self.glyph) {
            (Geometry::Point(p), HandleGlyph::Arrow { direction, offset_px, .. }) => {
                Geometry::Point(*p + direction * (offset_px * resolution))
            }
            (geometry, _) => geometry.clone(),
        }
    }
}

/// The overlay layer holding the current handles.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Layer id registered with the host surface.
    pub layer: LayerId,
    handles: Vec<HandleShape>,
    stroke: Stroke,
    options: serde_json::Value,
}

impl Overlay {
    /// Create an empty overlay carrying pass-through layer `options`.
    #[must_use]
    pub fn new(options: serde_json::Value) -> Self {
        Self {
            layer: Uuid::new_v4(),
            handles: Vec::new(),
            stroke: Stroke { color: DEFAULT_STROKE_COLOR.to_owned(), width: DEFAULT_STROKE_WIDTH },
            options,
        }
    }

    /// Handles in draw order; the last one is on top.
    #[must_use]
    pub fn handles(&self) -> &[HandleShape] {
        &self.handles
    }

    /// Stroke resolved for the most recent redraw.
    #[must_use]
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    /// Pass-through styling options for the host layer.
    #[must_use]
    pub fn options(&self) -> &serde_json::Value {
        &self.options
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }

    /// Throw away all handles and regenerate them for `selection`.
    pub fn redraw(&mut self, doc: &ShapeStore, selection: &[ShapeId], config: &TransformConfig, resolution: f64) {
        self.handles = generate(doc, selection, config);
        self.stroke = resolve_stroke(doc, selection, config, resolution);
    }
}

/// Build the full handle set for `selection`.
///
/// Every selected shape gets a translate handle. Only the first selected
/// shape gets rotate and scale handles, and only if it is not a point.
#[must_use]
pub fn generate(doc: &ShapeStore, selection: &[ShapeId], config: &TransformConfig) -> Vec<HandleShape> {
    let mut handles = Vec::new();
    for id in selection {
        let Some(geometry) = doc.get(id).and_then(|s| s.geometry.as_ref()) else {
            continue;
        };
        if let Some(handle) = translate_handle(*id, geometry) {
            handles.push(handle);
        }
    }

    let Some(first) = selection.first().and_then(|id| doc.get(id)) else {
        return handles;
    };
    if first.geometry.as_ref().is_none_or(Geometry::is_point) {
        return handles;
    }
    let Some(bbox) = OrientedBox::of_shape(first) else {
        return handles;
    };

    for index in HandleIndex::ALL {
        let enabled = if index.is_corner() { config.scale } else { config.stretch };
        if enabled {
            handles.push(HandleShape {
                body: first.id,
                kind: HandleKind::Scale(index),
                geometry: Geometry::Point(bbox.handle_point(index)),
                glyph: HandleGlyph::Grip { rotation: -bbox.angle },
            });
        }
    }

    if config.rotate {
        let (sin, cos) = bbox.angle.sin_cos();
        handles.push(HandleShape {
            body: first.id,
            kind: HandleKind::Rotate,
            geometry: Geometry::Point(bbox.handle_point(HandleIndex::TOP)),
            glyph: HandleGlyph::Arrow {
                rotation: -bbox.angle,
                direction: Vec2::new(-sin, cos),
                offset_px: ROTATE_HANDLE_OFFSET_PX,
            },
        });
    }

    handles
}

fn translate_handle(body: ShapeId, geometry: &Geometry) -> Option<HandleShape> {
    if let Geometry::Point(p) = geometry {
        return Some(HandleShape {
            body,
            kind: HandleKind::Translate,
            geometry: Geometry::Point(*p),
            glyph: HandleGlyph::Dot { radius_px: POINT_GLYPH_RADIUS_PX },
        });
    }
    let ring = rearrange(&rect_corners(geometry.extent()?))?;
    Some(HandleShape {
        body,
        kind: HandleKind::Translate,
        geometry: Geometry::Polygon(vec![ring.to_vec()]),
        glyph: HandleGlyph::Outline,
    })
}

/// Configured stroke color, else the first selected shape's own stroke color,
/// else the default gray.
fn resolve_stroke(doc: &ShapeStore, selection: &[ShapeId], config: &TransformConfig, resolution: f64) -> Stroke {
    let color = config.stroke_color.clone().or_else(|| {
        let shape = selection.first().and_then(|id| doc.get(id))?;
        shape.style.as_ref()?.stroke_color(shape, resolution)
    });
    Stroke {
        color: color.unwrap_or_else(|| DEFAULT_STROKE_COLOR.to_owned()),
        width: config.stroke_width,
    }
}
