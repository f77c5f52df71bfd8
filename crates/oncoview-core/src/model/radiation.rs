//! Radiation dose samples.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ids::EntityId;
use super::region::check_vec_finite;
use crate::error::ValidationError;

/// One discrete dose-field sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadiationSample {
    pub id: EntityId,
    pub position: Vec3,
    /// Normalised field intensity, `[0, 1]`
    pub intensity: f32,
    /// Dose in Gy
    pub dose: f32,
    pub target_area: String,
}

impl RadiationSample {
    pub fn new(
        id: impl Into<String>,
        position: Vec3,
        intensity: f32,
        dose: f32,
        target_area: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            position,
            intensity,
            dose,
            target_area: target_area.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let id = self.id.as_str();
        if id.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: "radiation sample",
            });
        }
        check_vec_finite(id, "position", self.position)?;
        ValidationError::check_range(id, "intensity", self.intensity, 0.0, 1.0, "[0, 1]")?;
        ValidationError::check_range(id, "dose", self.dose, 0.0, f32::MAX, "[0, inf)")?;
        Ok(())
    }
}
