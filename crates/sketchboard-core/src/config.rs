//! Board configuration.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::selection::SelectionStyle;
use crate::shapes::SerializableColor;
use crate::storage::DEFAULT_AUTOSAVE_INTERVAL_SECS;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables of the sketch board. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardConfig {
    pub surface_width: f64,
    pub surface_height: f64,
    pub background: SerializableColor,
    /// Maximum number of snapshots kept in the undo stack.
    pub history_limit: usize,
    /// Padding added around the content when computing export bounds.
    pub bounds_padding: f64,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub shape_stroke_width: f64,
    pub text_font_size: f64,
    pub text_box_width: f64,
    pub text_entry_width: f64,
    pub text_entry_height: f64,
    pub autosave_interval_secs: u64,
    pub stroke_color: SerializableColor,
    /// Decoration given to selected drawables.
    pub selection: SelectionStyle,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            surface_width: 768.0,
            surface_height: 520.0,
            background: SerializableColor::white(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            bounds_padding: 20.0,
            pen_width: 2.0,
            eraser_width: 20.0,
            shape_stroke_width: 2.0,
            text_font_size: 16.0,
            text_box_width: 200.0,
            text_entry_width: 220.0,
            text_entry_height: 160.0,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            stroke_color: SerializableColor::black(),
            selection: SelectionStyle::default(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn surface_size(&self) -> Size {
        Size::new(self.surface_width, self.surface_height)
    }

    pub fn text_entry_size(&self) -> Size {
        Size::new(self.text_entry_width, self.text_entry_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("surfaceWidth", self.surface_width),
            ("surfaceHeight", self.surface_height),
            ("penWidth", self.pen_width),
            ("eraserWidth", self.eraser_width),
            ("textFontSize", self.text_font_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "historyLimit",
                reason: "must keep at least the baseline".to_string(),
            });
        }
        if !self.bounds_padding.is_finite() || self.bounds_padding < 0.0 {
            return Err(ConfigError::Invalid {
                field: "boundsPadding",
                reason: format!("must be non-negative, got {}", self.bounds_padding),
            });
        }
        Ok(())
    }
}
