//! Document model: shapes, their styling, and the in-memory store.
//!
//! This module defines what the engine manipulates (`Shape`), how a shape's
//! look is described (`Style`), and the runtime store that owns all live shapes
//! (`ShapeStore`). The engine never creates or destroys shapes during a
//! gesture; it only rewrites a selected shape's geometry and orientation angle
//! in place, so mutations are visible to any reader of the store immediately.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geom::Geometry;

/// Unique identifier for a shape.
pub type ShapeId = Uuid;

/// Identifier of a layer on the host surface.
pub type LayerId = Uuid;

/// A user-manipulable shape as stored in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Unique identifier for this shape.
    pub id: ShapeId,
    /// The layer this shape is drawn on.
    pub layer: LayerId,
    /// World coordinates. Shapes without geometry cannot be picked.
    pub geometry: Option<Geometry>,
    /// Counter-clockwise rotation in radians away from the axis-aligned form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_angle: Option<f64>,
    /// Stacking order; higher values are picked first.
    #[serde(default)]
    pub z_index: i64,
    /// How the host draws this shape. Only the stroke color is read here.
    #[serde(skip)]
    pub style: Option<Style>,
}

impl Shape {
    /// Create an unrotated shape on `layer`.
    #[must_use]
    pub fn new(layer: LayerId, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            layer,
            geometry: Some(geometry),
            orientation_angle: None,
            z_index: 0,
            style: None,
        }
    }

    /// Builder-style setter for the stored orientation angle.
    #[must_use]
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.orientation_angle = Some(angle);
        self
    }

    /// Builder-style setter for the style.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Stored orientation angle, `0.0` when absent.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.orientation_angle.unwrap_or(0.0)
    }
}

/// Stroke paint for an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// CSS color string.
    pub color: String,
    /// Width in screen pixels.
    pub width: f64,
}

/// One resolved style entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Computes style entries for a shape at a given view resolution.
pub type StyleFn = Arc<dyn Fn(&Shape, f64) -> Vec<StyleDef>>;

/// A shape's style, in one of the three forms a host may provide.
#[derive(Clone)]
pub enum Style {
    Single(StyleDef),
    Many(Vec<StyleDef>),
    /// Computed on demand; needs the current view resolution.
    Dynamic(StyleFn),
}

impl Style {
    /// Resolve to concrete entries for `shape` at `resolution` (world units per pixel).
    #[must_use]
    pub fn resolve(&self, shape: &Shape, resolution: f64) -> Vec<StyleDef> {
        match self {
            Self::Single(def) => vec![def.clone()],
            Self::Many(defs) => defs.clone(),
            Self::Dynamic(f) => f(shape, resolution),
        }
    }

    /// Stroke color of the first resolved entry that has a stroke.
    #[must_use]
    pub fn stroke_color(&self, shape: &Shape, resolution: f64) -> Option<String> {
        self.resolve(shape, resolution)
            .into_iter()
            .find_map(|def| def.stroke.map(|s| s.color))
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(def) => f.debug_tuple("Single").field(def).finish(),
            Self::Many(defs) => f.debug_tuple("Many").field(defs).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// In-memory store of shapes.
pub struct ShapeStore {
    shapes: HashMap<ShapeId, Shape>,
}

impl ShapeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { shapes: HashMap::new() }
    }

    /// Insert or replace a shape. Returns its id.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id;
        self.shapes.insert(id, shape);
        id
    }

    /// Remove a shape by id, returning it if it was present.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.shapes.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn get_mut(&mut self, id: &ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Replace all shapes.
    pub fn load(&mut self, shapes: Vec<Shape>) {
        self.shapes.clear();
        for shape in shapes {
            self.shapes.insert(shape.id, shape);
        }
    }

    /// Return all shapes sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn sorted_shapes(&self) -> Vec<&Shape> {
        let mut shapes: Vec<&Shape> = self.shapes.values().collect();
        shapes.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        shapes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}
