//! Tumors.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::ids::EntityId;
use super::region::check_vec_finite;
use crate::error::ValidationError;

/// A tumor, rendered as a sphere of radius `size` inside its region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tumor {
    pub id: EntityId,
    /// Region containing the tumor
    pub region_id: EntityId,
    pub position: Vec3,
    pub size: f32,
    pub tumor_type: String,
    pub stage: String,
    /// `[0, 1]`
    pub growth_rate: f32,
    /// `[0, 1]`
    pub malignancy: f32,
}

impl Tumor {
    pub fn new(
        id: impl Into<String>,
        region_id: impl Into<String>,
        position: Vec3,
        size: f32,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            region_id: EntityId::new(region_id),
            position,
            size,
            tumor_type: String::new(),
            stage: String::new(),
            growth_rate: 0.0,
            malignancy: 0.0,
        }
    }

    pub fn with_classification(
        mut self,
        tumor_type: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        self.tumor_type = tumor_type.into();
        self.stage = stage.into();
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f32) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    pub fn with_malignancy(mut self, malignancy: f32) -> Self {
        self.malignancy = malignancy;
        self
    }

    /// Check every documented range. Region existence is checked by the model.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let id = self.id.as_str();
        if id.is_empty() {
            return Err(ValidationError::EmptyId { kind: "tumor" });
        }
        check_vec_finite(id, "position", self.position)?;
        ValidationError::check_positive(id, "size", self.size)?;
        ValidationError::check_range(id, "growth_rate", self.growth_rate, 0.0, 1.0, "[0, 1]")?;
        ValidationError::check_range(id, "malignancy", self.malignancy, 0.0, 1.0, "[0, 1]")?;
        Ok(())
    }
}
