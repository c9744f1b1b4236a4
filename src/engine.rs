//! The transform engine: selection, gesture state machine, and notifications.
//!
//! `TransformCore` is driven entirely by the host. The host forwards pointer
//! callbacks (`on_pointer_down`, `on_pointer_drag`, `on_pointer_up`,
//! `on_pointer_move`) and the core mutates the live shapes in its store,
//! regenerates the handle overlay, and notifies subscribers synchronously.
//!
//! Gestures run `idle → translate | rotate | scale → idle`. Start events are
//! held back until the first frame that actually moves geometry, and end
//! events only fire for gestures that did, so a click never produces a
//! `transformstart` / `transformend` pair.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use kurbo::Point;
use tracing::{debug, info};

use crate::config::TransformOptions;
use crate::doc::{LayerId, Shape, ShapeId, ShapeStore};
use crate::events::{EventKind, ListenerId, Notifier, Phase, TransformDelta, TransformEvent};
use crate::handles::{HandleKind, Overlay};
use crate::hit::{Pick, hit_test};
use crate::input::{Cursor, DragState, GestureContext, InputState, Mode, PointerEvent};
use crate::selection::{Selection, SelectionError, Snapshot};
use crate::transform;

/// Host rendering surface.
///
/// The engine only needs the current view resolution (world units per screen
/// pixel) and a way to show or hide its overlay layer.
pub trait Surface {
    fn resolution(&self) -> f64;
    fn add_layer(&mut self, layer: LayerId);
    fn remove_layer(&mut self, layer: LayerId);
}

/// Core engine state.
pub struct TransformCore {
    pub doc: ShapeStore,
    selection: Selection,
    overlay: Overlay,
    input: InputState,
    options: TransformOptions,
    notifier: Notifier,
    surface: Option<Box<dyn Surface>>,
    active: bool,
}

impl TransformCore {
    #[must_use]
    pub fn new(options: TransformOptions) -> Self {
        let overlay = Overlay::new(options.config.overlay_options.clone());
        Self {
            doc: ShapeStore::new(),
            selection: Selection::new(),
            overlay,
            input: InputState::Idle,
            options,
            notifier: Notifier::new(),
            surface: None,
            active: true,
        }
    }

    // --- Surface / activation ---

    /// Bind to a surface, detaching from the previous one first.
    pub fn attach(&mut self, mut surface: Box<dyn Surface>) {
        self.detach();
        if self.active {
            surface.add_layer(self.overlay.layer);
        }
        info!(layer = %self.overlay.layer, active = self.active, "transform attached");
        self.surface = Some(surface);
        self.redraw();
    }

    /// Remove the overlay layer and release the surface.
    pub fn detach(&mut self) -> Option<Box<dyn Surface>> {
        let mut surface = self.surface.take()?;
        self.abort_gesture();
        surface.remove_layer(self.overlay.layer);
        info!(layer = %self.overlay.layer, "transform detached");
        Some(surface)
    }

    /// Turn the engine on or off. Deactivating drops any gesture, clears the
    /// selection, and hides the overlay.
    pub fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        self.active = active;
        let layer = self.overlay.layer;
        if active {
            if let Some(surface) = self.surface.as_mut() {
                surface.add_layer(layer);
            }
        } else {
            self.abort_gesture();
            if self.selection.clear() {
                self.emit_select(None);
            }
            self.overlay.clear();
            if let Some(surface) = self.surface.as_mut() {
                surface.remove_layer(layer);
            }
        }
        info!(active, "transform activation changed");
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    // --- Subscriptions ---

    pub fn subscribe(&mut self, listener: impl FnMut(&TransformEvent) + 'static) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    // --- Programmatic selection ---

    /// Select a shape. With `additive` the shape's membership is toggled,
    /// otherwise it becomes the only selected shape.
    ///
    /// # Errors
    ///
    /// Fails when the engine is inactive or the shape is unknown, has no
    /// geometry, or is not pickable under the current options.
    pub fn select(&mut self, id: ShapeId, additive: bool) -> Result<(), SelectionError> {
        self.check_selectable(&id)?;
        let changed = if additive { self.selection.press(id, true) } else { self.selection.set([id]) };
        if changed {
            self.emit_select(None);
            self.redraw();
        }
        Ok(())
    }

    /// Replace the whole selection. Nothing changes if any id is rejected.
    ///
    /// # Errors
    ///
    /// Returns the first rejection, as for [`TransformCore::select`].
    pub fn set_selection(&mut self, ids: &[ShapeId]) -> Result<(), SelectionError> {
        for id in ids {
            self.check_selectable(id)?;
        }
        if self.selection.set(ids.iter().copied()) {
            self.emit_select(None);
            self.redraw();
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            self.emit_select(None);
            self.redraw();
        }
    }

    /// Drop a shape from the store and the selection.
    pub fn remove_shape(&mut self, id: &ShapeId) -> Option<Shape> {
        let shape = self.doc.remove(id)?;
        if self.selection.remove(id) {
            self.emit_select(None);
        }
        self.redraw();
        Some(shape)
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[ShapeId] {
        self.selection.ids()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.input.mode()
    }

    #[must_use]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    // --- Pointer input ---

    /// Handle a pointer press. Returns `true` when a gesture started and the
    /// host should route the following moves to [`TransformCore::on_pointer_drag`].
    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> bool {
        if !self.active {
            return false;
        }
        if matches!(self.input, InputState::Transforming(_)) {
            debug!("pointer down during gesture; dropping previous gesture");
            self.abort_gesture();
        }
        let at = event.coordinate;
        self.emit(EventKind::MouseDown, Some(event), at, self.selection.ids().to_vec(), None);

        let pick = hit_test(at, &self.doc, &self.overlay, &self.options, self.resolution());
        let (body, kind) = match pick {
            None => {
                if self.selection.clear() {
                    debug!("empty press cleared selection");
                }
                self.redraw();
                return false;
            }
            Some(Pick::Handle(handle)) => (handle.body, handle.kind),
            Some(Pick::Body(id)) => {
                let additive = (self.options.additive)(event);
                if self.selection.press(id, additive) {
                    self.emit_select(Some(event));
                    self.redraw();
                }
                if !self.selection.contains(&id) {
                    return false;
                }
                (id, HandleKind::Translate)
            }
        };
        self.begin_gesture(body, kind, at)
    }

    /// Handle a pointer move while a gesture is active.
    pub fn on_pointer_drag(&mut self, event: &PointerEvent) {
        let InputState::Transforming(ctx) = &self.input else {
            return;
        };
        if event.coordinate == ctx.last {
            return;
        }
        let mode = ctx.mode();
        let start = ctx.start;
        let shapes = ctx.snapshot.ids();
        if !ctx.moved {
            self.emit_phase(mode, Phase::Start, event, start, &shapes, None);
        }

        let InputState::Transforming(ctx) = &mut self.input else {
            return;
        };
        let Some(delta) = transform::apply_frame(ctx, &mut self.doc, event.coordinate) else {
            return;
        };
        self.emit_phase(mode, Phase::Frame, event, start, &shapes, Some(delta));
        self.redraw();
    }

    /// Handle a pointer release. Returns `true` when it ended a gesture.
    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> bool {
        if !self.active {
            return false;
        }
        let shapes = self.selection.ids().to_vec();
        let InputState::Transforming(ctx) = std::mem::take(&mut self.input) else {
            self.emit(EventKind::MouseUp, Some(event), event.coordinate, shapes, None);
            return false;
        };
        self.emit(EventKind::MouseUp, Some(event), ctx.start, shapes, None);

        let ids = ctx.snapshot.ids();
        if matches!(ctx.drag, DragState::Scale(state) if state.head_inverted) {
            transform::flip_heads(&mut self.doc, &ids);
            info!(count = ids.len(), "flipped inverted shapes upright");
        }
        if ctx.moved {
            self.emit_phase(ctx.mode(), Phase::End, event, ctx.start, &ids, None);
        }
        debug!(body = %ctx.body, mode = ?ctx.mode(), moved = ctx.moved, "gesture ended");
        self.redraw();
        true
    }

    /// Handle a hover move with no button held. Returns the cursor to show.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> Cursor {
        if !self.active {
            return Cursor::Default;
        }
        let (start, cursor) = match &self.input {
            InputState::Transforming(ctx) => (ctx.start, gesture_cursor(&ctx.drag)),
            InputState::Idle => (event.coordinate, self.hover_cursor(event.coordinate)),
        };
        self.emit(EventKind::MouseMove, Some(event), start, self.selection.ids().to_vec(), None);
        cursor
    }

    // --- Internals ---

    fn resolution(&self) -> f64 {
        self.surface.as_ref().map_or(1.0, |s| s.resolution())
    }

    fn redraw(&mut self) {
        let resolution = self.resolution();
        self.overlay
            .redraw(&self.doc, self.selection.ids(), &self.options.config, resolution);
    }

    fn abort_gesture(&mut self) {
        if let InputState::Transforming(ctx) = std::mem::take(&mut self.input) {
            debug!(body = %ctx.body, mode = ?ctx.mode(), "gesture aborted");
        }
    }

    fn check_selectable(&self, id: &ShapeId) -> Result<(), SelectionError> {
        if !self.active {
            return Err(SelectionError::Inactive);
        }
        let shape = self.doc.get(id).ok_or(SelectionError::NotFound(*id))?;
        if shape.geometry.is_none() {
            return Err(SelectionError::NoGeometry(*id));
        }
        if !self.options.config.accepts_layer(shape.layer) || !(self.options.filter)(shape) {
            return Err(SelectionError::Rejected(*id));
        }
        Ok(())
    }

    fn begin_gesture(&mut self, body: ShapeId, kind: HandleKind, at: Point) -> bool {
        if kind == HandleKind::Translate && !self.options.config.translate {
            return false;
        }
        let Some(shape) = self.doc.get(&body) else {
            return false;
        };
        let drag = match kind {
            HandleKind::Translate => Some(DragState::Translate),
            HandleKind::Rotate => transform::begin_rotate(shape, at).map(DragState::Rotate),
            HandleKind::Scale(index) => transform::begin_scale(shape, index).map(DragState::Scale),
        };
        let Some(drag) = drag else {
            return false;
        };
        let Some(snapshot) = Snapshot::capture(&self.selection, &self.doc) else {
            return false;
        };
        let ctx = GestureContext::new(body, at, drag, snapshot);
        debug!(%body, mode = ?ctx.mode(), selected = self.selection.len(), "gesture started");
        self.input = InputState::Transforming(ctx);
        true
    }

    fn hover_cursor(&self, at: Point) -> Cursor {
        match hit_test(at, &self.doc, &self.overlay, &self.options, self.resolution()) {
            None => Cursor::Default,
            Some(Pick::Handle(handle)) => {
                let angle = self.doc.get(&handle.body).map_or(0.0, Shape::angle);
                Cursor::for_handle(handle.kind, angle)
            }
            Some(Pick::Body(id)) if self.selection.contains(&id) && self.options.config.translate => Cursor::Move,
            Some(Pick::Body(_)) => Cursor::Pointer,
        }
    }

    fn emit_select(&mut self, pointer: Option<&PointerEvent>) {
        let at = pointer.map_or(Point::ZERO, |p| p.coordinate);
        debug!(count = self.selection.len(), "selection changed");
        self.emit(EventKind::Select, pointer, at, self.selection.ids().to_vec(), None);
    }

    /// Emit the mode-specific event for `phase`, then its generic counterpart.
    fn emit_phase(
        &mut self,
        mode: Mode,
        phase: Phase,
        pointer: &PointerEvent,
        start: Point,
        shapes: &[ShapeId],
        delta: Option<TransformDelta>,
    ) {
        if let Some(kind) = EventKind::for_mode(mode, phase) {
            self.emit(kind, Some(pointer), start, shapes.to_vec(), delta);
        }
        self.emit(EventKind::generic(phase), Some(pointer), start, shapes.to_vec(), delta);
    }

    fn emit(
        &mut self,
        kind: EventKind,
        pointer: Option<&PointerEvent>,
        start: Point,
        shapes: Vec<ShapeId>,
        delta: Option<TransformDelta>,
    ) {
        let event = TransformEvent {
            kind,
            pointer: pointer.copied(),
            start_coordinate: start,
            coordinate: pointer.map_or(start, |p| p.coordinate),
            shapes,
            delta,
        };
        self.notifier.emit(&event);
    }
}

fn gesture_cursor(drag: &DragState) -> Cursor {
    match drag {
        DragState::Translate => Cursor::Move,
        DragState::Rotate(_) => Cursor::Grabbing,
        DragState::Scale(state) => Cursor::for_handle(HandleKind::Scale(state.handle_index), state.angle),
    }
}
