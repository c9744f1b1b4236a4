//! Interactive transform engine for planar shapes.
//!
//! Hosts feed pointer events into [`engine::TransformCore`], which hit-tests
//! its overlay and shape store, maintains the selection, and turns drags into
//! translate, rotate, and scale operations on the live geometry. Rotated
//! shapes keep a stored orientation angle so their handles and scale axes
//! follow the shape rather than the screen. Every step is reported through a
//! synchronous callback registry.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | `TransformCore`, the `Surface` host trait, and the gesture state machine |
//! | [`doc`] | Shape model, styles, and the in-memory shape store |
//! | [`geom`] | Geometry enum and Euclidean helpers built on `kurbo` |
//! | [`bbox`] | Oriented bounding boxes in a shape's own rotated frame |
//! | [`handles`] | Handle ring indices and overlay generation |
//! | [`hit`] | Picking against handles and bodies |
//! | [`transform`] | Per-frame translate / rotate / scale math and the head flip |
//! | [`selection`] | Ordered selection and pointer-down snapshots |
//! | [`input`] | Pointer events, modifiers, gesture state, and cursors |
//! | [`events`] | Notification kinds, payloads, and the listener registry |
//! | [`config`] | Serializable settings plus host callbacks |
//! | [`consts`] | Shared numeric and style defaults |

pub mod bbox;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod events;
pub mod geom;
pub mod handles;
pub mod hit;
pub mod input;
pub mod selection;
pub mod transform;

pub use config::{ConfigError, TransformConfig, TransformOptions};
pub use doc::{LayerId, Shape, ShapeId, ShapeStore};
pub use engine::{Surface, TransformCore};
pub use events::{EventKind, TransformEvent};
pub use geom::Geometry;
pub use input::{Cursor, Mode, PointerEvent};
pub use selection::SelectionError;
