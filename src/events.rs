//! Lifecycle notifications.
//!
//! Every notification is one `TransformEvent` value tagged with an
//! `EventKind`. Listeners are plain callbacks registered on a `Notifier` and
//! are called synchronously, in registration order, from inside the pointer
//! handler that produced the event.
//!
//! Mode-specific kinds always travel with their generic counterpart:
//! `rotating` is immediately followed by `transforming`, `scaleend` by
//! `transformend`, and so on.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use crate::doc::ShapeId;
use crate::input::{Mode, PointerEvent};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    /// The selection changed.
    Select,
    TransformStart,
    Transforming,
    TransformEnd,
    TranslateStart,
    Translating,
    TranslateEnd,
    RotateStart,
    Rotating,
    RotateEnd,
    ScaleStart,
    Scaling,
    ScaleEnd,
}

/// Position of an event within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Frame,
    End,
}

impl EventKind {
    /// The mode-specific kind for `phase` of a `mode` gesture. `None` for idle.
    #[must_use]
    pub fn for_mode(mode: Mode, phase: Phase) -> Option<Self> {
        let kind = match (mode, phase) {
            (Mode::Idle, _) => return None,
            (Mode::Translate, Phase::Start) => Self::TranslateStart,
            (Mode::Translate, Phase::Frame) => Self::Translating,
            (Mode::Translate, Phase::End) => Self::TranslateEnd,
            (Mode::Rotate, Phase::Start) => Self::RotateStart,
            (Mode::Rotate, Phase::Frame) => Self::Rotating,
            (Mode::Rotate, Phase::End) => Self::RotateEnd,
            (Mode::Scale, Phase::Start) => Self::ScaleStart,
            (Mode::Scale, Phase::Frame) => Self::Scaling,
            (Mode::Scale, Phase::End) => Self::ScaleEnd,
        };
        Some(kind)
    }

    /// The generic `transform*` kind for `phase`.
    #[must_use]
    pub fn generic(phase: Phase) -> Self {
        match phase {
            Phase::Start => Self::TransformStart,
            Phase::Frame => Self::Transforming,
            Phase::End => Self::TransformEnd,
        }
    }

    /// Event name as exposed to hosts, e.g. `"rotating"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::Select => "select",
            Self::TransformStart => "transformstart",
            Self::Transforming => "transforming",
            Self::TransformEnd => "transformend",
            Self::TranslateStart => "translatestart",
            Self::Translating => "translating",
            Self::TranslateEnd => "translateend",
            Self::RotateStart => "rotatestart",
            Self::Rotating => "rotating",
            Self::RotateEnd => "rotateend",
            Self::ScaleStart => "scalestart",
            Self::Scaling => "scaling",
            Self::ScaleEnd => "scaleend",
        }
    }
}

/// Geometry change applied by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TransformDelta {
    /// Displacement since the previous frame.
    Translate(Vec2),
    /// Angle swept since pointer-down, in radians.
    Rotate(f64),
    /// Factors relative to the pointer-down geometry.
    Scale { x: f64, y: f64 },
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformEvent {
    pub kind: EventKind,
    /// The raw pointer event that triggered this notification. `None` for
    /// programmatic selection changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerEvent>,
    /// Pointer-down position of the current gesture.
    pub start_coordinate: Point,
    /// Current pointer position. Both coordinates are the origin when there is no pointer.
    pub coordinate: Point,
    /// Shapes affected, in selection order.
    pub shapes: Vec<ShapeId>,
    /// Frame delta, for `*ing` kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<TransformDelta>,
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TransformEvent)>;

/// Callback registry.
#[derive(Default)]
pub struct Notifier {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for every event.
    pub fn subscribe(&mut self, listener: impl FnMut(&TransformEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener.
    pub fn emit(&mut self, event: &TransformEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
