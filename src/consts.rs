//! Shared numeric constants for the transform engine.

// ── Math ────────────────────────────────────────────────────────

/// Lengths at or below this are treated as zero when dividing by a box side.
pub const EPSILON: f64 = 1e-9;

// ── Hit-testing ─────────────────────────────────────────────────

/// Default screen-space hit slop in pixels for handles and thin edges.
pub const HIT_TOLERANCE_PX: f64 = 6.0;

// ── Handle styling ──────────────────────────────────────────────

/// Distance from the box edge to the rotate arrow glyph, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 20.0;

/// Stroke color used when neither the config nor the grabbed shape provides one.
pub const DEFAULT_STROKE_COLOR: &str = "rgba(102, 102, 102, 1)";

/// Stroke width for handle glyphs and outlines, in screen pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.25;

/// Radius of the translate glyph drawn on point shapes, in screen pixels.
pub const POINT_GLYPH_RADIUS_PX: f64 = 6.0;
