//! Session-scoped view state.

use serde::{Deserialize, Serialize};

use super::ids::EntityId;
use super::mode::AnalysisMode;
use crate::error::ValidationError;

/// Lowest opacity scale the user can select.
pub const MIN_OPACITY_SCALE: f32 = 0.1;
/// Highest opacity scale the user can select.
pub const MAX_OPACITY_SCALE: f32 = 1.0;

/// Mutable UI state of one visualization session.
///
/// Written only by UI event handlers; read by composition, animation and
/// the camera each frame. `clock_seconds` is advanced by the frame clock
/// alone and never moves backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    opacity_scale: f32,
    pub show_labels: bool,
    pub auto_rotate: bool,
    pub selected: Option<EntityId>,
    pub active_mode: AnalysisMode,
    clock_seconds: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            opacity_scale: 0.8,
            show_labels: true,
            auto_rotate: true,
            selected: None,
            active_mode: AnalysisMode::default(),
            clock_seconds: 0.0,
        }
    }
}

impl ViewState {
    pub fn new(active_mode: AnalysisMode) -> Self {
        Self {
            active_mode,
            ..Default::default()
        }
    }

    pub fn opacity_scale(&self) -> f32 {
        self.opacity_scale
    }

    /// Set the opacity scale; values outside `[0.1, 1]` are rejected.
    pub fn set_opacity_scale(&mut self, value: f32) -> Result<(), ValidationError> {
        ValidationError::check_range(
            "view",
            "opacity_scale",
            value,
            MIN_OPACITY_SCALE,
            MAX_OPACITY_SCALE,
            "[0.1, 1]",
        )?;
        self.opacity_scale = value;
        Ok(())
    }

    pub fn clock_seconds(&self) -> f64 {
        self.clock_seconds
    }

    /// Record the frame clock. Earlier or non-finite values are ignored.
    pub fn record_clock(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > self.clock_seconds {
            self.clock_seconds = seconds;
        }
    }
}
