#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::f64::consts::{FRAC_PI_2, PI};
use std::rc::Rc;

use uuid::Uuid;

use super::*;
use crate::config::TransformConfig;
use crate::geom::Geometry;
use crate::input::{Modifiers, ResizeDirection};

// =============================================================
// Helpers
// =============================================================

type Log = Rc<RefCell<Vec<TransformEvent>>>;

struct TestSurface {
    resolution: f64,
    layers: Rc<RefCell<Vec<LayerId>>>,
}

impl Surface for TestSurface {
    fn resolution(&self) -> f64 {
        self.resolution
    }

    fn add_layer(&mut self, layer: LayerId) {
        self.layers.borrow_mut().push(layer);
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.borrow_mut().retain(|l| *l != layer);
    }
}

fn surface(resolution: f64) -> (Box<TestSurface>, Rc<RefCell<Vec<LayerId>>>) {
    let layers = Rc::new(RefCell::new(Vec::new()));
    (Box::new(TestSurface { resolution, layers: Rc::clone(&layers) }), layers)
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
    Shape::new(
        Uuid::nil(),
        Geometry::Polygon(vec![vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]]),
    )
}

/// Core attached to a fine-grained surface so small shapes keep their grips apart.
fn core_with(options: TransformOptions) -> TransformCore {
    let mut core = TransformCore::new(options);
    core.attach(surface(0.1).0);
    core
}

fn core() -> TransformCore {
    core_with(TransformOptions::default())
}

fn record(core: &mut TransformCore) -> Log {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    core.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    log
}

fn kinds(log: &Log) -> Vec<EventKind> {
    log.borrow().iter().map(|e| e.kind).collect()
}

fn at(x: f64, y: f64) -> PointerEvent {
    PointerEvent::at(x, y)
}

fn shift_at(x: f64, y: f64) -> PointerEvent {
    at(x, y).with_modifiers(Modifiers { shift: true, ..Default::default() })
}

fn extent(core: &TransformCore, id: ShapeId) -> kurbo::Rect {
    core.doc.get(&id).unwrap().geometry.as_ref().unwrap().extent().unwrap()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

fn assert_extent(core: &TransformCore, id: ShapeId, x0: f64, y0: f64, x1: f64, y1: f64) {
    let e = extent(core, id);
    assert_close(e.x0, x0);
    assert_close(e.y0, y0);
    assert_close(e.x1, x1);
    assert_close(e.y1, y1);
}

fn drag(core: &mut TransformCore, from: (f64, f64), path: &[(f64, f64)]) {
    assert!(core.on_pointer_down(&at(from.0, from.1)), "press at {from:?} started no gesture");
    for &(x, y) in path {
        core.on_pointer_drag(&at(x, y));
    }
    let last = path.last().copied().unwrap_or(from);
    assert!(core.on_pointer_up(&at(last.0, last.1)));
}

// =============================================================
// Translate
// =============================================================

#[test]
fn body_drag_accumulates_frames() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    drag(&mut core, (5.0, 5.0), &[(6.0, 4.0), (8.0, 3.0)]);
    assert_extent(&core, id, 3.0, -2.0, 13.0, 8.0);
    assert_eq!(core.selection(), &[id]);
    assert_eq!(core.mode(), Mode::Idle);
}

#[test]
fn translate_event_sequence() {
    let mut core = core();
    core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let log = record(&mut core);
    drag(&mut core, (5.0, 5.0), &[(6.0, 5.0), (7.0, 5.0)]);
    assert_eq!(
        kinds(&log),
        vec![
            EventKind::MouseDown,
            EventKind::Select,
            EventKind::TranslateStart,
            EventKind::TransformStart,
            EventKind::Translating,
            EventKind::Transforming,
            EventKind::Translating,
            EventKind::Transforming,
            EventKind::MouseUp,
            EventKind::TranslateEnd,
            EventKind::TransformEnd,
        ]
    );
}

#[test]
fn events_carry_gesture_details() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let log = record(&mut core);
    drag(&mut core, (5.0, 5.0), &[(7.0, 6.0)]);
    let log = log.borrow();
    let frame = log.iter().find(|e| e.kind == EventKind::Translating).unwrap();
    assert_eq!(frame.start_coordinate, Point::new(5.0, 5.0));
    assert_eq!(frame.coordinate, Point::new(7.0, 6.0));
    assert_eq!(frame.shapes, vec![id]);
    assert_eq!(frame.delta, Some(TransformDelta::Translate(kurbo::Vec2::new(2.0, 1.0))));
    assert_eq!(frame.pointer, Some(at(7.0, 6.0)));
}

#[test]
fn click_without_motion_emits_no_transform_events() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let log = record(&mut core);
    assert!(core.on_pointer_down(&at(5.0, 5.0)));
    core.on_pointer_drag(&at(5.0, 5.0));
    assert!(core.on_pointer_up(&at(5.0, 5.0)));
    assert_eq!(kinds(&log), vec![EventKind::MouseDown, EventKind::Select, EventKind::MouseUp]);
    assert_extent(&core, id, 0.0, 0.0, 10.0, 10.0);
}

#[test]
fn dragging_selected_shape_moves_whole_selection() {
    let mut core = core();
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let b = core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    core.set_selection(&[a, b]).unwrap();
    drag(&mut core, (55.0, 55.0), &[(56.0, 57.0)]);
    assert_eq!(core.selection(), &[a, b]);
    assert_extent(&core, a, 1.0, 2.0, 11.0, 12.0);
    assert_extent(&core, b, 51.0, 52.0, 61.0, 62.0);
}

#[test]
fn overlay_follows_translated_shape() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    assert!(core.on_pointer_down(&at(5.0, 5.0)));
    core.on_pointer_drag(&at(15.0, 5.0));
    let outline = &core.overlay().handles()[0];
    assert_eq!(outline.kind, HandleKind::Translate);
    assert_eq!(outline.geometry.extent(), Some(extent(&core, id)));
}

#[test]
fn press_during_gesture_drops_it_without_end_events() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let log = record(&mut core);
    assert!(core.on_pointer_down(&at(5.0, 5.0)));
    core.on_pointer_drag(&at(6.0, 6.0));
    // Second press lands on the same, already selected, body.
    assert!(core.on_pointer_down(&at(6.0, 6.0)));
    core.on_pointer_drag(&at(7.0, 7.0));
    assert!(core.on_pointer_up(&at(7.0, 7.0)));
    assert_eq!(
        kinds(&log),
        vec![
            EventKind::MouseDown,
            EventKind::Select,
            EventKind::TranslateStart,
            EventKind::TransformStart,
            EventKind::Translating,
            EventKind::Transforming,
            EventKind::MouseDown,
            EventKind::TranslateStart,
            EventKind::TransformStart,
            EventKind::Translating,
            EventKind::Transforming,
            EventKind::MouseUp,
            EventKind::TranslateEnd,
            EventKind::TransformEnd,
        ]
    );
    assert_extent(&core, id, 2.0, 2.0, 12.0, 12.0);
    assert_eq!(core.mode(), Mode::Idle);
}

// =============================================================
// Rotate
// =============================================================

#[test]
fn rotate_handle_drag_turns_shape() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0).with_angle(0.0));
    core.select(id, false).unwrap();
    let log = record(&mut core);
    // The rotate grip is drawn 20px above the top edge: 2 world units at this resolution.
    drag(&mut core, (5.0, 12.0), &[(10.0, 5.0)]);
    let shape = core.doc.get(&id).unwrap();
    assert_close(shape.angle(), 3.0 * FRAC_PI_2);
    let rotating = log.borrow().iter().find(|e| e.kind == EventKind::Rotating).cloned().unwrap();
    let Some(TransformDelta::Rotate(delta)) = rotating.delta else {
        panic!("expected rotate delta, got {:?}", rotating.delta);
    };
    assert_close(delta, -FRAC_PI_2);
    assert!(kinds(&log).contains(&EventKind::RotateEnd));
}

// =============================================================
// Scale
// =============================================================

#[test]
fn corner_handle_doubles_square() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    let log = record(&mut core);
    drag(&mut core, (10.0, 10.0), &[(20.0, 20.0)]);
    assert_extent(&core, id, 0.0, 0.0, 20.0, 20.0);
    let scaling = log.borrow().iter().find(|e| e.kind == EventKind::Scaling).cloned().unwrap();
    assert_eq!(scaling.delta, Some(TransformDelta::Scale { x: 2.0, y: 2.0 }));
    assert!(kinds(&log).ends_with(&[EventKind::MouseUp, EventKind::ScaleEnd, EventKind::TransformEnd]));
}

#[test]
fn inverted_scale_flips_head_on_release() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    assert!(core.on_pointer_down(&at(5.0, 10.0)));
    assert_eq!(core.mode(), Mode::Scale);
    core.on_pointer_drag(&at(5.0, -10.0));
    assert!(core.doc.get(&id).unwrap().orientation_angle.is_none());
    assert!(core.on_pointer_up(&at(5.0, -10.0)));

    let shape = core.doc.get(&id).unwrap();
    assert_close(shape.angle(), PI);
    let Some(Geometry::Polygon(rings)) = &shape.geometry else {
        panic!("expected polygon");
    };
    // Scaled ring (0,0),(10,0),(10,-10),(0,-10) turned half about (5,-5).
    let expected = [(10.0, -10.0), (0.0, -10.0), (0.0, 0.0), (10.0, 0.0)];
    for (p, (x, y)) in rings[0].iter().zip(expected) {
        assert!(p.distance(Point::new(x, y)) < 1e-9, "{p:?} != ({x}, {y})");
    }
}

#[test]
fn uninverted_scale_keeps_angle() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    drag(&mut core, (5.0, 10.0), &[(5.0, 15.0)]);
    assert!(core.doc.get(&id).unwrap().orientation_angle.is_none());
    assert_extent(&core, id, 0.0, 0.0, 10.0, 15.0);
}

// =============================================================
// Selection policy
// =============================================================

#[test]
fn empty_press_clears_selection_silently() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    let log = record(&mut core);
    assert!(!core.on_pointer_down(&at(100.0, 100.0)));
    assert!(core.selection().is_empty());
    assert!(core.overlay().handles().is_empty());
    assert_eq!(kinds(&log), vec![EventKind::MouseDown]);
}

#[test]
fn additive_press_toggles() {
    let mut core = core();
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let b = core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    core.select(a, false).unwrap();
    assert!(core.on_pointer_down(&shift_at(55.0, 55.0)));
    core.on_pointer_up(&shift_at(55.0, 55.0));
    assert_eq!(core.selection(), &[a, b]);

    // Toggling a shape off starts no gesture.
    assert!(!core.on_pointer_down(&shift_at(5.0, 5.0)));
    assert_eq!(core.selection(), &[b]);
    assert_eq!(core.mode(), Mode::Idle);
}

#[test]
fn custom_additive_condition() {
    let options = TransformOptions::default().with_additive(|e| e.modifiers.ctrl);
    let mut core = core_with(options);
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let b = core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    core.select(a, false).unwrap();
    core.on_pointer_down(&shift_at(55.0, 55.0));
    core.on_pointer_up(&shift_at(55.0, 55.0));
    assert_eq!(core.selection(), &[b]);
}

#[test]
fn handle_press_keeps_selection() {
    let mut core = core();
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let b = core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    core.set_selection(&[a, b]).unwrap();
    assert!(core.on_pointer_down(&at(10.0, 10.0)));
    assert_eq!(core.mode(), Mode::Scale);
    assert_eq!(core.selection(), &[a, b]);
}

#[test]
fn disabled_translate_selects_without_gesture() {
    let config = TransformConfig { translate: false, ..Default::default() };
    let mut core = core_with(TransformOptions::new(config));
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    assert!(!core.on_pointer_down(&at(5.0, 5.0)));
    assert_eq!(core.selection(), &[id]);
    assert_eq!(core.mode(), Mode::Idle);
}

#[test]
fn filtered_shapes_are_not_picked() {
    let mut core = core_with(TransformOptions::default().with_filter(|s| s.z_index > 0));
    core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    assert!(!core.on_pointer_down(&at(5.0, 5.0)));
    assert!(core.selection().is_empty());
}

// =============================================================
// Programmatic selection
// =============================================================

#[test]
fn select_emits_and_draws_handles() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let log = record(&mut core);
    core.select(id, false).unwrap();
    assert_eq!(kinds(&log), vec![EventKind::Select]);
    assert!(log.borrow()[0].pointer.is_none());
    assert_eq!(core.overlay().handles().len(), 10);

    core.select(id, false).unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn select_rejects_bad_ids() {
    let mut core = core_with(TransformOptions::default().with_filter(|s| s.z_index == 0));
    let missing = Uuid::new_v4();
    assert_eq!(core.select(missing, false), Err(SelectionError::NotFound(missing)));

    let mut empty = rect(0.0, 0.0, 1.0, 1.0);
    empty.geometry = None;
    let empty = core.doc.insert(empty);
    assert_eq!(core.select(empty, false), Err(SelectionError::NoGeometry(empty)));

    let mut high = rect(0.0, 0.0, 1.0, 1.0);
    high.z_index = 3;
    let high = core.doc.insert(high);
    assert_eq!(core.set_selection(&[high]), Err(SelectionError::Rejected(high)));
    assert!(core.selection().is_empty());
}

#[test]
fn clear_selection_empties_overlay() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    core.clear_selection();
    assert!(core.selection().is_empty());
    assert!(core.overlay().handles().is_empty());
}

#[test]
fn remove_shape_prunes_selection() {
    let mut core = core();
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let b = core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    core.set_selection(&[a, b]).unwrap();
    assert!(core.remove_shape(&a).is_some());
    assert_eq!(core.selection(), &[b]);
    assert!(core.overlay().handles().iter().all(|h| h.body == b));
    assert!(core.remove_shape(&a).is_none());
}

// =============================================================
// Surface and activation
// =============================================================

#[test]
fn attach_adds_overlay_layer_and_reattach_moves_it() {
    let mut core = TransformCore::new(TransformOptions::default());
    let (first, first_layers) = surface(1.0);
    core.attach(first);
    assert_eq!(*first_layers.borrow(), vec![core.overlay().layer]);

    let (second, second_layers) = surface(1.0);
    core.attach(second);
    assert!(first_layers.borrow().is_empty());
    assert_eq!(second_layers.borrow().len(), 1);

    assert!(core.detach().is_some());
    assert!(second_layers.borrow().is_empty());
    assert!(core.detach().is_none());
}

#[test]
fn deactivate_resets_everything() {
    let mut core = TransformCore::new(TransformOptions::default());
    let (s, layers) = surface(0.1);
    core.attach(s);
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    assert!(core.on_pointer_down(&at(5.0, 5.0)));

    core.set_active(false);
    assert!(!core.is_active());
    assert_eq!(core.mode(), Mode::Idle);
    assert!(core.selection().is_empty());
    assert!(core.overlay().handles().is_empty());
    assert!(layers.borrow().is_empty());
    assert!(!core.on_pointer_down(&at(5.0, 5.0)));
    assert_eq!(core.select(id, false), Err(SelectionError::Inactive));

    core.set_active(true);
    assert_eq!(layers.borrow().len(), 1);
    assert!(core.on_pointer_down(&at(5.0, 5.0)));
}

#[test]
fn unsubscribed_listener_is_silent() {
    let mut core = core();
    core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    let count = Rc::new(RefCell::new(0));
    let id = {
        let count = Rc::clone(&count);
        core.subscribe(move |_| *count.borrow_mut() += 1)
    };
    assert!(core.unsubscribe(id));
    core.on_pointer_down(&at(5.0, 5.0));
    assert_eq!(*count.borrow(), 0);
}

// =============================================================
// Hover
// =============================================================

#[test]
fn hover_cursors() {
    let mut core = core();
    let a = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.doc.insert(rect(50.0, 50.0, 60.0, 60.0));
    assert_eq!(core.on_pointer_move(&at(55.0, 55.0)), Cursor::Pointer);
    assert_eq!(core.on_pointer_move(&at(100.0, 0.0)), Cursor::Default);

    core.select(a, false).unwrap();
    assert_eq!(core.on_pointer_move(&at(5.0, 5.0)), Cursor::Move);
    assert_eq!(core.on_pointer_move(&at(10.0, 10.0)), Cursor::Resize(ResizeDirection::NeSw));
    assert_eq!(core.on_pointer_move(&at(5.0, 12.0)), Cursor::Grab);
}

#[test]
fn hover_emits_mousemove() {
    let mut core = core();
    let log = record(&mut core);
    core.on_pointer_move(&at(1.0, 1.0));
    assert_eq!(kinds(&log), vec![EventKind::MouseMove]);
}

#[test]
fn rotate_gesture_reports_grabbing() {
    let mut core = core();
    let id = core.doc.insert(rect(0.0, 0.0, 10.0, 10.0));
    core.select(id, false).unwrap();
    assert!(core.on_pointer_down(&at(5.0, 12.0)));
    assert_eq!(core.on_pointer_move(&at(6.0, 12.0)), Cursor::Grabbing);
}
