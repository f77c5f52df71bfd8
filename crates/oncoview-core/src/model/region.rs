//! Anatomical regions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::color::Rgb;
use super::ids::EntityId;
use crate::error::ValidationError;

/// A body region rendered as a box of `extent` centred on `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnatomicalRegion {
    pub id: EntityId,
    pub name: String,
    pub position: Vec3,
    /// Full box size along each axis
    pub extent: Vec3,
    pub color: Rgb,
    pub base_opacity: f32,
    pub is_affected: bool,
    /// Tissue damage, `[0, 1]`
    pub damage_level: f32,
    /// Absorbed dose in Gy, if any was recorded
    pub radiation_dose: Option<f32>,
    pub tumor_present: bool,
}

impl AnatomicalRegion {
    /// Create an unaffected region with no recorded dose.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Vec3,
        extent: Vec3,
        color: Rgb,
    ) -> Self {
        Self {
            id: EntityId::new(id),
            name: name.into(),
            position,
            extent,
            color,
            base_opacity: 0.8,
            is_affected: false,
            damage_level: 0.0,
            radiation_dose: None,
            tumor_present: false,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.base_opacity = opacity;
        self
    }

    pub fn with_damage(mut self, damage_level: f32) -> Self {
        self.is_affected = true;
        self.damage_level = damage_level;
        self
    }

    pub fn with_dose(mut self, dose_gy: f32) -> Self {
        self.radiation_dose = Some(dose_gy);
        self
    }

    pub fn with_tumor(mut self) -> Self {
        self.tumor_present = true;
        self
    }

    /// Half of the extent, used for bounds.
    pub fn half_extent(&self) -> Vec3 {
        self.extent * 0.5
    }

    /// True when `point` lies inside the region's box.
    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.position).abs();
        let h = self.half_extent();
        d.x <= h.x && d.y <= h.y && d.z <= h.z
    }

    /// Check every documented range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let id = self.id.as_str();
        if id.is_empty() {
            return Err(ValidationError::EmptyId { kind: "region" });
        }
        check_vec_finite(id, "position", self.position)?;
        ValidationError::check_positive(id, "extent.x", self.extent.x)?;
        ValidationError::check_positive(id, "extent.y", self.extent.y)?;
        ValidationError::check_positive(id, "extent.z", self.extent.z)?;
        if !self.color.is_valid() {
            return Err(ValidationError::InvalidColor {
                entity: id.to_string(),
                value: format!("{:?}", self.color),
            });
        }
        ValidationError::check_range(id, "base_opacity", self.base_opacity, 0.0, 1.0, "[0, 1]")?;
        ValidationError::check_range(id, "damage_level", self.damage_level, 0.0, 1.0, "[0, 1]")?;
        if let Some(dose) = self.radiation_dose {
            ValidationError::check_range(id, "radiation_dose", dose, 0.0, f32::MAX, "[0, inf)")?;
        }
        Ok(())
    }
}

pub(crate) fn check_vec_finite(
    entity: &str,
    field: &'static str,
    v: Vec3,
) -> Result<(), ValidationError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite {
            entity: entity.to_string(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn liver() -> AnatomicalRegion {
        AnatomicalRegion::new(
            "liver",
            "Liver",
            Vec3::new(0.3, 0.2, 0.1),
            Vec3::new(0.6, 0.3, 0.4),
            Rgb::from_u32(0x8b4513),
        )
    }

    #[test]
    fn test_valid_region() {
        assert!(liver().with_damage(0.6).with_dose(45.0).validate().is_ok());
    }

    #[test]
    fn test_negative_dose_rejected() {
        let err = liver().with_dose(-1.0).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: "radiation_dose",
                ..
            }
        ));
    }

    #[test]
    fn test_damage_above_one_rejected() {
        assert!(liver().with_damage(1.2).validate().is_err());
    }

    #[test]
    fn test_zero_extent_rejected() {
        let mut region = liver();
        region.extent.y = 0.0;
        assert!(region.validate().is_err());
    }

    #[test]
    fn test_contains() {
        let region = liver();
        assert!(region.contains(Vec3::new(0.3, 0.2, 0.1)));
        assert!(region.contains(Vec3::new(0.55, 0.3, 0.25)));
        assert!(!region.contains(Vec3::new(1.0, 0.2, 0.1)));
    }
}
