//! Engine configuration.
//!
//! `TransformConfig` is the plain-data part: it can be loaded from JSON and
//! every field has a default, so an empty object is a valid config.
//! `TransformOptions` adds the two host callbacks that cannot be expressed as
//! data: which shapes may be picked, and which pointer events count as
//! additive selection.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_STROKE_WIDTH, HIT_TOLERANCE_PX};
use crate::doc::{LayerId, Shape};
use crate::input::PointerEvent;

/// Error returned by [`TransformConfig::from_json`] and [`TransformConfig::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("hit tolerance must be a positive number of pixels, got {0}")]
    InvalidTolerance(f64),
    #[error("stroke width must be a positive number of pixels, got {0}")]
    InvalidStrokeWidth(f64),
}

/// Serializable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Body layers eligible for picking. Empty means every layer.
    pub layers: Vec<LayerId>,
    /// Allow dragging bodies and translate handles.
    pub translate: bool,
    /// Show the rotate handle.
    pub rotate: bool,
    /// Show corner scale handles.
    pub scale: bool,
    /// Show edge (single-axis) scale handles.
    pub stretch: bool,
    /// Handle stroke color. Falls back to the grabbed shape's stroke, then gray.
    pub stroke_color: Option<String>,
    /// Handle stroke width in screen pixels.
    pub stroke_width: f64,
    /// Pick radius in screen pixels.
    pub hit_tolerance_px: f64,
    /// Opaque options forwarded to the host overlay layer.
    pub overlay_options: serde_json::Value,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            translate: true,
            rotate: true,
            scale: true,
            stretch: true,
            stroke_color: None,
            stroke_width: DEFAULT_STROKE_WIDTH,
            hit_tolerance_px: HIT_TOLERANCE_PX,
            overlay_options: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl TransformConfig {
    /// Parse and validate a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and the other variants
    /// for out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check numeric fields.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hit_tolerance_px.is_finite() && self.hit_tolerance_px > 0.0) {
            return Err(ConfigError::InvalidTolerance(self.hit_tolerance_px));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ConfigError::InvalidStrokeWidth(self.stroke_width));
        }
        Ok(())
    }

    /// Whether bodies on `layer` may be picked.
    #[must_use]
    pub fn accepts_layer(&self, layer: LayerId) -> bool {
        self.layers.is_empty() || self.layers.contains(&layer)
    }
}

/// Host predicate deciding whether a shape may be picked.
pub type ShapeFilter = Box<dyn Fn(&Shape) -> bool>;

/// Host predicate deciding whether a press toggles instead of replacing the selection.
pub type AdditiveCondition = Box<dyn Fn(&PointerEvent) -> bool>;

/// Full engine options: data config plus host callbacks.
pub struct TransformOptions {
    pub config: TransformConfig,
    pub filter: ShapeFilter,
    pub additive: AdditiveCondition,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            config: TransformConfig::default(),
            filter: Box::new(|_| true),
            additive: Box::new(|event| event.modifiers.shift),
        }
    }
}

impl TransformOptions {
    #[must_use]
    pub fn new(config: TransformConfig) -> Self {
        Self { config, ..Self::default() }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Fn(&Shape) -> bool + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    #[must_use]
    pub fn with_additive(mut self, additive: impl Fn(&PointerEvent) -> bool + 'static) -> Self {
        self.additive = Box::new(additive);
        self
    }
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOptions")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
