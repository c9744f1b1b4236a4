//! Input model: pointer events, modifier keys, cursors, and the gesture state.
//!
//! `PointerEvent` is what the host hands the engine for every pointer callback.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. An active gesture owns a `GestureContext` carrying everything
//! the per-frame update needs: the mode-specific drag state and the snapshot
//! taken at pointer-down. The context is created on pointer-down and dropped on
//! pointer-up; nothing about a gesture outlives it.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::f64::consts::FRAC_PI_4;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::doc::ShapeId;
use crate::handles::{HandleIndex, HandleKind};
use crate::selection::Snapshot;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// A pointer event as delivered by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Screen position in pixels.
    pub pixel: Point,
    /// Projected world position.
    pub coordinate: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// An event with no modifiers whose pixel and world positions coincide.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        let p = Point::new(x, y);
        Self { pixel: p, coordinate: p, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// The active transform mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Idle,
    Translate,
    Rotate,
    Scale,
}

/// Rotation gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationDragState {
    /// Angle from `pivot` to the pointer-down position.
    pub initial_angle: f64,
    /// Extent center of the grabbed shape at gesture start.
    pub pivot: Point,
}

/// Scale gesture state, all measured on the grabbed shape's oriented box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleDragState {
    /// Rotation of the box away from axis alignment.
    pub angle: f64,
    /// Un-rotated box width.
    pub width: f64,
    /// Un-rotated box height.
    pub height: f64,
    pub handle_index: HandleIndex,
    /// `(handle_index + 4) % 8`; the fixed corner.
    pub opposite_index: HandleIndex,
    /// World position of the fixed corner.
    pub opposite_coord: Point,
    /// Grabbed handle position rotated into the box's local frame around `opposite_coord`.
    pub start_coord: Point,
    /// Set when the latest frame produced a negative vertical factor.
    pub head_inverted: bool,
}

/// Mode-specific drag state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    /// Uses [`GestureContext::last`] as the previous reference point.
    Translate,
    Rotate(RotationDragState),
    Scale(ScaleDragState),
}

/// Everything a gesture needs between pointer-down and pointer-up.
#[derive(Debug, Clone)]
pub struct GestureContext {
    /// The shape whose body or handle was pressed.
    pub body: ShapeId,
    /// World position of the pointer-down.
    pub start: Point,
    /// World position of the previous frame.
    pub last: Point,
    pub drag: DragState,
    /// Selection clone taken at pointer-down, index-aligned with the selection.
    pub snapshot: Snapshot,
    /// Whether any frame has changed geometry yet.
    pub moved: bool,
}

impl GestureContext {
    #[must_use]
    pub fn new(body: ShapeId, start: Point, drag: DragState, snapshot: Snapshot) -> Self {
        Self { body, start, last: start, drag, snapshot, moved: false }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.drag {
            DragState::Translate => Mode::Translate,
            DragState::Rotate(_) => Mode::Rotate,
            DragState::Scale(_) => Mode::Scale,
        }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A transform gesture is in progress.
    Transforming(GestureContext),
}

impl InputState {
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Idle => Mode::Idle,
            Self::Transforming(ctx) => ctx.mode(),
        }
    }
}

/// Resize cursor axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeDirection {
    /// Top-left to bottom-right diagonal.
    NwSe,
    Ew,
    /// Bottom-left to top-right diagonal.
    NeSw,
    Ns,
}

/// Cursor hint for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    /// Over a selectable body that is not selected yet.
    Pointer,
    Move,
    Grab,
    Grabbing,
    Resize(ResizeDirection),
}

impl Cursor {
    /// Cursor for hovering a handle on a box rotated by `angle`.
    ///
    /// Resize arrows turn with the box in 45° steps.
    #[must_use]
    pub fn for_handle(kind: HandleKind, angle: f64) -> Self {
        const RING: [ResizeDirection; 8] = [
            ResizeDirection::NwSe,
            ResizeDirection::Ew,
            ResizeDirection::NeSw,
            ResizeDirection::Ns,
            ResizeDirection::NwSe,
            ResizeDirection::Ew,
            ResizeDirection::NeSw,
            ResizeDirection::Ns,
        ];
        match kind {
            HandleKind::Translate => Self::Move,
            HandleKind::Rotate => Self::Grab,
            HandleKind::Scale(index) => {
                #[allow(clippy::cast_possible_truncation)]
                let steps = (angle / FRAC_PI_4).round() as i64;
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let slot = (i64::from(index.get()) + steps).rem_euclid(8) as usize;
                Self::Resize(RING[slot])
            }
        }
    }

    /// CSS `cursor` value.
    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Move => "move",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Resize(ResizeDirection::NwSe) => "nwse-resize",
            Self::Resize(ResizeDirection::Ew) => "ew-resize",
            Self::Resize(ResizeDirection::NeSw) => "nesw-resize",
            Self::Resize(ResizeDirection::Ns) => "ns-resize",
        }
    }
}
