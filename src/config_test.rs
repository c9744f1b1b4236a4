#![allow(clippy::float_cmp)]

use kurbo::Point;
use uuid::Uuid;

use super::*;
use crate::geom::Geometry;
use crate::input::Modifiers;

fn event(shift: bool, ctrl: bool) -> PointerEvent {
    PointerEvent {
        pixel: Point::ZERO,
        coordinate: Point::ZERO,
        modifiers: Modifiers { shift, ctrl, ..Default::default() },
    }
}

// =============================================================
// TransformConfig
// =============================================================

#[test]
fn default_enables_everything() {
    let config = TransformConfig::default();
    assert!(config.translate && config.rotate && config.scale && config.stretch);
    assert!(config.layers.is_empty());
    assert!(config.stroke_color.is_none());
    assert_eq!(config.hit_tolerance_px, HIT_TOLERANCE_PX);
    assert!(config.overlay_options.is_object());
}

#[test]
fn empty_json_is_default() {
    let config = TransformConfig::from_json("{}").unwrap();
    assert_eq!(config, TransformConfig::default());
}

#[test]
fn json_overrides_selected_fields() {
    let config = TransformConfig::from_json(
        r##"{ "rotate": false, "stroke_color": "#ff0000", "overlay_options": { "z_index": 10 } }"##,
    )
    .unwrap();
    assert!(!config.rotate);
    assert!(config.scale);
    assert_eq!(config.stroke_color.as_deref(), Some("#ff0000"));
    assert_eq!(config.overlay_options["z_index"], 10);
}

#[test]
fn malformed_json_is_rejected() {
    let err = TransformConfig::from_json("{ nope").unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn zero_tolerance_is_rejected() {
    let err = TransformConfig::from_json(r#"{ "hit_tolerance_px": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTolerance(t) if t == 0.0));
}

#[test]
fn negative_stroke_width_is_rejected() {
    let config = TransformConfig { stroke_width: -1.0, ..Default::default() };
    assert!(matches!(config.validate(), Err(ConfigError::InvalidStrokeWidth(_))));
}

#[test]
fn zero_stroke_width_is_rejected() {
    let err = TransformConfig::from_json(r#"{ "stroke_width": 0 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidStrokeWidth(w) if w == 0.0));
}

#[test]
fn nan_tolerance_is_rejected() {
    let config = TransformConfig { hit_tolerance_px: f64::NAN, ..Default::default() };
    assert!(config.validate().is_err());
}

#[test]
fn empty_layer_list_accepts_all() {
    let config = TransformConfig::default();
    assert!(config.accepts_layer(Uuid::new_v4()));
}

#[test]
fn layer_list_restricts_picking() {
    let allowed = Uuid::new_v4();
    let config = TransformConfig { layers: vec![allowed], ..Default::default() };
    assert!(config.accepts_layer(allowed));
    assert!(!config.accepts_layer(Uuid::new_v4()));
}

#[test]
fn error_messages_name_the_value() {
    let err = ConfigError::InvalidTolerance(-2.0);
    assert!(err.to_string().contains("-2"));
}

// =============================================================
// TransformOptions
// =============================================================

#[test]
fn default_additive_is_shift() {
    let options = TransformOptions::default();
    assert!((options.additive)(&event(true, false)));
    assert!(!(options.additive)(&event(false, true)));
}

#[test]
fn custom_additive_condition() {
    let options = TransformOptions::default().with_additive(|e| e.modifiers.ctrl);
    assert!((options.additive)(&event(false, true)));
    assert!(!(options.additive)(&event(true, false)));
}

#[test]
fn default_filter_accepts_everything() {
    let options = TransformOptions::default();
    let shape = Shape::new(Uuid::new_v4(), Geometry::Point(Point::ZERO));
    assert!((options.filter)(&shape));
}

#[test]
fn custom_filter_applies() {
    let options = TransformOptions::default().with_filter(|s| s.z_index > 0);
    let shape = Shape::new(Uuid::new_v4(), Geometry::Point(Point::ZERO));
    assert!(!(options.filter)(&shape));
}

#[test]
fn options_debug_shows_config() {
    let s = format!("{:?}", TransformOptions::new(TransformConfig::default()));
    assert!(s.contains("TransformOptions"));
    assert!(s.contains("config"));
}
