//! Selection and gesture snapshots.
//!
//! The selection is an ordered, duplicate-free list of shape ids. Order
//! matters: the first member is the primary shape that gets rotate and scale
//! handles, and the rest follow it.
//!
//! A snapshot is a deep copy of the selected shapes taken at pointer-down.
//! Rotate and scale frames are computed against it rather than against the
//! live shapes, so per-frame error never accumulates.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::doc::{Shape, ShapeId, ShapeStore};

/// Error returned by programmatic selection calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("shape not found: {0}")]
    NotFound(ShapeId),
    #[error("shape has no geometry: {0}")]
    NoGeometry(ShapeId),
    #[error("shape rejected by filter: {0}")]
    Rejected(ShapeId),
    #[error("transform engine is inactive")]
    Inactive,
}

/// Ordered set of selected shape ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ShapeId>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ids(&self) -> &[ShapeId] {
        &self.ids
    }

    /// The primary shape.
    #[must_use]
    pub fn first(&self) -> Option<ShapeId> {
        self.ids.first().copied()
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, id: ShapeId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`. Returns whether it was present.
    pub fn remove(&mut self, id: &ShapeId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| x != id);
        self.ids.len() != before
    }

    /// Replace the selection with exactly `ids`, dropping duplicates. Returns whether anything changed.
    pub fn set(&mut self, ids: impl IntoIterator<Item = ShapeId>) -> bool {
        let mut next = Self::new();
        for id in ids {
            next.insert(id);
        }
        let changed = next != *self;
        *self = next;
        changed
    }

    /// Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }

    /// Apply the press policy for a body hit. Returns whether the selection changed.
    ///
    /// Additive presses toggle membership. Plain presses on an unselected
    /// shape select only that shape; plain presses on a selected shape keep
    /// the whole selection so it can be dragged together.
    pub fn press(&mut self, id: ShapeId, additive: bool) -> bool {
        if additive {
            if !self.remove(&id) {
                self.ids.push(id);
            }
            return true;
        }
        if self.contains(&id) {
            return false;
        }
        self.ids.clear();
        self.ids.push(id);
        true
    }
}

/// Deep copies of the selected shapes, in selection order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    shapes: Vec<Shape>,
}

impl Snapshot {
    /// Clone every selected shape out of `doc`.
    ///
    /// Returns `None` if any selected id is missing from the store, since a
    /// partial snapshot would lose its alignment with the selection.
    #[must_use]
    pub fn capture(selection: &Selection, doc: &ShapeStore) -> Option<Self> {
        let shapes = selection
            .ids()
            .iter()
            .map(|id| doc.get(id).cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(Self { shapes })
    }

    #[must_use]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id).collect()
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
